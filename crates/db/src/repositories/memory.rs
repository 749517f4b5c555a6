use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use heymoji_core::domain::leaderboard::LeaderboardRow;
use heymoji_core::domain::member::{Member, SlackUserId};
use heymoji_core::domain::reaction::{Period, SpecialCredit};

use super::{MemberRepository, ReactionRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryMemberRepository {
    members: RwLock<HashMap<String, Member>>,
}

#[async_trait::async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn find_by_id(&self, id: &SlackUserId) -> Result<Option<Member>, RepositoryError> {
        let members = self.members.read().await;
        Ok(members.get(id.as_str()).cloned())
    }

    async fn insert(&self, member: Member) -> Result<(), RepositoryError> {
        let mut members = self.members.write().await;
        if members.contains_key(member.slack_id.as_str()) {
            return Err(RepositoryError::Conflict(member.slack_id.to_string()));
        }
        members.insert(member.slack_id.0.clone(), member);
        Ok(())
    }

    async fn update(&self, member: Member) -> Result<(), RepositoryError> {
        let mut members = self.members.write().await;
        match members.get_mut(member.slack_id.as_str()) {
            Some(existing) => {
                *existing = member;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(member.slack_id.to_string())),
        }
    }

    async fn set_hidden(&self, id: &SlackUserId, hidden: bool) -> Result<(), RepositoryError> {
        let mut members = self.members.write().await;
        let member =
            members.get_mut(id.as_str()).ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        member.is_hidden = hidden;
        Ok(())
    }
}

type CounterKey = (String, String, String);

#[derive(Default)]
struct Grants {
    used: HashMap<(String, String), u32>,
    credits: HashMap<SpecialCredit, Period>,
}

/// Counter store for tests. Leaderboard rows are joined against `members`
/// when one is attached, mirroring the SQL join.
#[derive(Default)]
pub struct InMemoryReactionRepository {
    counts: RwLock<HashMap<CounterKey, i64>>,
    grants: RwLock<Grants>,
    members: Option<Arc<InMemoryMemberRepository>>,
}

impl InMemoryReactionRepository {
    pub fn with_members(members: Arc<InMemoryMemberRepository>) -> Self {
        Self { members: Some(members), ..Self::default() }
    }

    fn key(user_id: &SlackUserId, reaction_name: &str, period: &Period) -> CounterKey {
        (user_id.0.clone(), reaction_name.to_string(), period.to_string())
    }
}

#[async_trait::async_trait]
impl ReactionRepository for InMemoryReactionRepository {
    async fn increment(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError> {
        let mut counts = self.counts.write().await;
        let entry = counts.entry(Self::key(user_id, reaction_name, period)).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn decrement(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError> {
        let mut counts = self.counts.write().await;
        match counts.get_mut(&Self::key(user_id, reaction_name, period)) {
            Some(entry) => {
                *entry = (*entry - 1).max(0);
                Ok(*entry)
            }
            None => Ok(0),
        }
    }

    async fn count(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError> {
        let counts = self.counts.read().await;
        Ok(counts.get(&Self::key(user_id, reaction_name, period)).copied().unwrap_or(0))
    }

    async fn reserve_grant(
        &self,
        credit: &SpecialCredit,
        period: &Period,
        limit: u32,
    ) -> Result<bool, RepositoryError> {
        let mut grants = self.grants.write().await;
        if grants.credits.contains_key(credit) {
            return Ok(false);
        }
        let used = grants.used.entry((credit.giver_id.0.clone(), period.to_string())).or_insert(0);
        if *used >= limit {
            return Ok(false);
        }
        *used += 1;
        grants.credits.insert(credit.clone(), *period);
        Ok(true)
    }

    async fn release_grant(&self, credit: &SpecialCredit) -> Result<Option<Period>, RepositoryError> {
        let mut grants = self.grants.write().await;
        let Some(period) = grants.credits.remove(credit) else {
            return Ok(None);
        };
        if let Some(used) = grants.used.get_mut(&(credit.giver_id.0.clone(), period.to_string())) {
            *used = used.saturating_sub(1);
        }
        Ok(Some(period))
    }

    async fn leaderboard_rows(&self, period: &Period) -> Result<Vec<LeaderboardRow>, RepositoryError> {
        let Some(members) = &self.members else {
            return Ok(Vec::new());
        };
        let period = period.to_string();
        let counts = self.counts.read().await;

        let mut rows = Vec::new();
        for ((user_id, reaction_name, row_period), count) in counts.iter() {
            if *row_period != period || *count <= 0 {
                continue;
            }
            let Some(member) = members.find_by_id(&SlackUserId(user_id.clone())).await? else {
                continue;
            };
            if member.is_hidden {
                continue;
            }
            rows.push(LeaderboardRow {
                slack_id: member.slack_id,
                username: member.username,
                avatar_url: member.avatar_url,
                reaction_name: reaction_name.clone(),
                count: *count,
            });
        }
        rows.sort_by(|a, b| {
            a.slack_id.cmp(&b.slack_id).then_with(|| a.reaction_name.cmp(&b.reaction_name))
        });
        Ok(rows)
    }
}
