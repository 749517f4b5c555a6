//! Recording gateway fakes shared by the unit tests of this crate.

use std::sync::Mutex;

use async_trait::async_trait;

use heymoji_core::domain::leaderboard::{RankedMember, ReactionTally};
use heymoji_core::domain::member::{SlackUserId, UserAttributes};
use heymoji_core::domain::reaction::{Period, SpecialCredit};

use crate::blocks::MessageTemplate;
use crate::gateway::{GatewayError, PersistenceGateway};
use crate::notifier::{NotificationGateway, NotifyError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistenceCall {
    CreateUser(UserAttributes),
    UpdateUser(UserAttributes),
    SetVisibility(String, bool),
    Increment(String, String, String),
    Decrement(String, String, String),
    /// giver, item, period, limit
    Reserve(String, String, String, u32),
    /// giver, item
    Release(String, String),
    QueryTop(i32, u32, usize),
}

#[derive(Default)]
pub struct RecordingPersistence {
    pub calls: Mutex<Vec<PersistenceCall>>,
    pub fail_with: Mutex<Option<GatewayError>>,
    pub grants_available: Mutex<Option<u32>>,
    pub credits: Mutex<Vec<(SpecialCredit, Period)>>,
    pub top_users: Mutex<Vec<RankedMember>>,
}

impl RecordingPersistence {
    pub fn calls(&self) -> Vec<PersistenceCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn failing(error: GatewayError) -> Self {
        Self { fail_with: Mutex::new(Some(error)), ..Self::default() }
    }

    pub fn with_top_users(members: Vec<RankedMember>) -> Self {
        Self { top_users: Mutex::new(members), ..Self::default() }
    }

    pub fn with_grants(available: u32) -> Self {
        Self { grants_available: Mutex::new(Some(available)), ..Self::default() }
    }

    fn record(&self, call: PersistenceCall) -> Result<(), GatewayError> {
        self.calls.lock().expect("calls lock").push(call);
        match self.fail_with.lock().expect("fail lock").clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PersistenceGateway for RecordingPersistence {
    async fn create_user(&self, attributes: &UserAttributes) -> Result<(), GatewayError> {
        self.record(PersistenceCall::CreateUser(attributes.clone()))
    }

    async fn update_user(&self, attributes: &UserAttributes) -> Result<(), GatewayError> {
        self.record(PersistenceCall::UpdateUser(attributes.clone()))
    }

    async fn set_user_visibility(
        &self,
        attributes: &UserAttributes,
        hidden: bool,
    ) -> Result<(), GatewayError> {
        self.record(PersistenceCall::SetVisibility(attributes.slack_id.clone(), hidden))
    }

    async fn increment_reaction(
        &self,
        target: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, GatewayError> {
        self.record(PersistenceCall::Increment(
            target.to_string(),
            reaction_name.to_string(),
            period.to_string(),
        ))?;
        Ok(1)
    }

    async fn decrement_reaction(
        &self,
        target: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, GatewayError> {
        self.record(PersistenceCall::Decrement(
            target.to_string(),
            reaction_name.to_string(),
            period.to_string(),
        ))?;
        Ok(0)
    }

    async fn reserve_special_grant(
        &self,
        credit: &SpecialCredit,
        period: &Period,
        limit: u32,
    ) -> Result<bool, GatewayError> {
        self.record(PersistenceCall::Reserve(
            credit.giver_id.to_string(),
            credit.item_id.clone(),
            period.to_string(),
            limit,
        ))?;
        let mut credits = self.credits.lock().expect("credits lock");
        if credits.iter().any(|(existing, _)| existing == credit) {
            return Ok(false);
        }
        let mut available = self.grants_available.lock().expect("grants lock");
        match available.as_mut() {
            Some(0) => return Ok(false),
            Some(remaining) => *remaining -= 1,
            None => {}
        }
        credits.push((credit.clone(), *period));
        Ok(true)
    }

    async fn release_special_grant(
        &self,
        credit: &SpecialCredit,
    ) -> Result<Option<Period>, GatewayError> {
        self.record(PersistenceCall::Release(credit.giver_id.to_string(), credit.item_id.clone()))?;
        let mut credits = self.credits.lock().expect("credits lock");
        let Some(position) = credits.iter().position(|(existing, _)| existing == credit) else {
            return Ok(None);
        };
        let (_, period) = credits.remove(position);
        if let Some(remaining) = self.grants_available.lock().expect("grants lock").as_mut() {
            *remaining += 1;
        }
        Ok(Some(period))
    }

    async fn query_top_users(
        &self,
        year: i32,
        month: u32,
        limit: usize,
    ) -> Result<Vec<RankedMember>, GatewayError> {
        self.record(PersistenceCall::QueryTop(year, month, limit))?;
        Ok(self.top_users.lock().expect("top users lock").clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, MessageTemplate)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn sent(&self) -> Vec<(String, MessageTemplate)> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotifier {
    async fn send_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<(), NotifyError> {
        self.sent.lock().expect("sent lock").push((channel.to_string(), message.clone()));
        if self.fail {
            return Err(NotifyError::Api("channel_not_found".to_string()));
        }
        Ok(())
    }
}

pub fn ranked(id: &str, reactions: &[(&str, i64)]) -> RankedMember {
    let reactions: Vec<ReactionTally> = reactions
        .iter()
        .map(|(name, count)| ReactionTally { reaction_name: (*name).to_string(), count: *count })
        .collect();
    RankedMember {
        slack_id: SlackUserId(id.to_string()),
        username: format!("user-{id}"),
        avatar_url: None,
        score: reactions.iter().map(|tally| tally.count).sum(),
        reactions,
    }
}
