use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use heymoji_core::config::AppConfig;
use heymoji_core::domain::command::CommandKind;
use heymoji_core::errors::DispatchError;

use crate::blocks::{help_message, member_saved_message, LeaderboardStyle, MessageTemplate};
use crate::commands::{user_attributes, BestMemberQuery, CommandAttributes};
use crate::events::{EventContext, MentionEvent};
use crate::gateway::PersistenceGateway;
use crate::router::{CommandHandler, CommandRouter};

/// Builds the fixed command table for the running bot.
pub fn command_router(persistence: Arc<dyn PersistenceGateway>, config: &AppConfig) -> CommandRouter {
    let help: Arc<dyn CommandHandler> =
        Arc::new(HelpHandler::new(help_message(&config.commands, &config.slack.bot_name)));
    let leaderboard = LeaderboardStyle::from_config(&config.leaderboard, &config.reactions.emoji_display);
    let size = config.leaderboard.size;

    CommandRouter::build(|kind| -> Arc<dyn CommandHandler> {
        let persistence = Arc::clone(&persistence);
        match kind {
            CommandKind::Help => Arc::clone(&help),
            CommandKind::CreateUser => Arc::new(CreateUserHandler::new(persistence)),
            CommandKind::UpdateUser => Arc::new(UpdateUserHandler::new(persistence)),
            CommandKind::HideUser => Arc::new(VisibilityHandler::new(persistence, true)),
            CommandKind::ShowUser => Arc::new(VisibilityHandler::new(persistence, false)),
            CommandKind::ShowBestMembers => {
                Arc::new(ShowBestMembersHandler::new(persistence, leaderboard.clone(), size))
            }
        }
    })
}

pub struct HelpHandler {
    message: MessageTemplate,
}

impl HelpHandler {
    pub fn new(message: MessageTemplate) -> Self {
        Self { message }
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(
        &self,
        _attributes: &CommandAttributes,
        _event: &MentionEvent,
        _ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, DispatchError> {
        Ok(Some(self.message.clone()))
    }
}

pub struct CreateUserHandler {
    persistence: Arc<dyn PersistenceGateway>,
}

impl CreateUserHandler {
    pub fn new(persistence: Arc<dyn PersistenceGateway>) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl CommandHandler for CreateUserHandler {
    async fn handle(
        &self,
        attributes: &CommandAttributes,
        event: &MentionEvent,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, DispatchError> {
        let attributes = user_attributes(attributes)?;
        if attributes.username.is_none() {
            return Err(DispatchError::InvalidCommandArguments("missing `username`".to_string()));
        }

        self.persistence.create_user(&attributes).await?;
        info!(
            event_name = "member.created",
            correlation_id = %ctx.correlation_id,
            slack_id = %attributes.slack_id,
            requested_by = %event.user_id,
            "member registered"
        );
        Ok(Some(member_saved_message(CommandKind::CreateUser, &attributes.slack_id)))
    }
}

pub struct UpdateUserHandler {
    persistence: Arc<dyn PersistenceGateway>,
}

impl UpdateUserHandler {
    pub fn new(persistence: Arc<dyn PersistenceGateway>) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl CommandHandler for UpdateUserHandler {
    async fn handle(
        &self,
        attributes: &CommandAttributes,
        event: &MentionEvent,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, DispatchError> {
        let attributes = user_attributes(attributes)?;
        if !attributes.has_changes() {
            return Err(DispatchError::InvalidCommandArguments(
                "nothing to update; pass username=, avatar_url= or department=".to_string(),
            ));
        }

        self.persistence.update_user(&attributes).await?;
        info!(
            event_name = "member.updated",
            correlation_id = %ctx.correlation_id,
            slack_id = %attributes.slack_id,
            requested_by = %event.user_id,
            "member updated"
        );
        Ok(Some(member_saved_message(CommandKind::UpdateUser, &attributes.slack_id)))
    }
}

/// Hides or re-shows a member on the leaderboard.
pub struct VisibilityHandler {
    persistence: Arc<dyn PersistenceGateway>,
    hidden: bool,
}

impl VisibilityHandler {
    pub fn new(persistence: Arc<dyn PersistenceGateway>, hidden: bool) -> Self {
        Self { persistence, hidden }
    }
}

#[async_trait]
impl CommandHandler for VisibilityHandler {
    async fn handle(
        &self,
        attributes: &CommandAttributes,
        event: &MentionEvent,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, DispatchError> {
        let attributes = user_attributes(attributes)?;
        self.persistence.set_user_visibility(&attributes, self.hidden).await?;
        info!(
            event_name = "member.visibility_changed",
            correlation_id = %ctx.correlation_id,
            slack_id = %attributes.slack_id,
            hidden = self.hidden,
            requested_by = %event.user_id,
            "member visibility changed"
        );

        let kind = if self.hidden { CommandKind::HideUser } else { CommandKind::ShowUser };
        Ok(Some(member_saved_message(kind, &attributes.slack_id)))
    }
}

pub struct ShowBestMembersHandler {
    persistence: Arc<dyn PersistenceGateway>,
    style: LeaderboardStyle,
    size: usize,
}

impl ShowBestMembersHandler {
    pub fn new(persistence: Arc<dyn PersistenceGateway>, style: LeaderboardStyle, size: usize) -> Self {
        Self { persistence, style, size }
    }
}

#[async_trait]
impl CommandHandler for ShowBestMembersHandler {
    async fn handle(
        &self,
        attributes: &CommandAttributes,
        _event: &MentionEvent,
        _ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, DispatchError> {
        let query = BestMemberQuery::from_attributes(attributes)?;
        let period = query.period()?;
        let members = self.persistence.query_top_users(query.year, query.month, self.size).await?;
        Ok(Some(self.style.render(&period, &members)))
    }
}
