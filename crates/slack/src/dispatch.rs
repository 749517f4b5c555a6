use std::sync::Arc;

use tracing::{debug, info, warn};

use heymoji_core::config::AppConfig;
use heymoji_core::domain::command::CommandKind;
use heymoji_core::domain::reaction::{
    normalize_reaction_name, Period, ReactionChange, SpecialCredit,
};
use heymoji_core::errors::DispatchError;

use crate::blocks::{failure_message, unknown_command_message, MessageTemplate};
use crate::commands::{CommandKeyword, CommandParser};
use crate::events::{DropReason, EventContext, MentionEvent, ReactionEvent};
use crate::gateway::PersistenceGateway;
use crate::notifier::NotificationGateway;
use crate::router::CommandRouter;

/// Terminal state of one dispatched event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    FailedHandled,
    ErrorNotified,
    Dropped(DropReason),
}

impl DispatchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::FailedHandled => "failed_handled",
            Self::ErrorNotified => "error_notified",
            Self::Dropped(_) => "dropped",
        }
    }
}

/// What the user sees when a command handler fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    Silent,
    Notify,
}

impl FailurePolicy {
    pub fn for_kind(kind: CommandKind) -> Self {
        if kind.is_query() {
            Self::Silent
        } else {
            Self::Notify
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialEmoji {
    pub name: String,
    pub monthly_limit: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchSettings {
    pub bot_name: String,
    pub error_channel: Option<String>,
    pub special_emoji: Option<SpecialEmoji>,
}

impl DispatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            bot_name: config.slack.bot_name.clone(),
            error_channel: config.slack.error_channel.clone(),
            special_emoji: config
                .reactions
                .special_emoji
                .as_deref()
                .map(normalize_reaction_name)
                .filter(|name| !name.is_empty())
                .map(|name| SpecialEmoji {
                    name,
                    monthly_limit: config.reactions.special_emoji_monthly_limit,
                }),
        }
    }
}

/// Runs parsed mentions and admitted reactions against the gateways. Every
/// failure ends here as a log record and, at most, a chat message.
pub struct ActionDispatcher {
    parser: CommandParser,
    router: CommandRouter,
    persistence: Arc<dyn PersistenceGateway>,
    notifier: Arc<dyn NotificationGateway>,
    settings: DispatchSettings,
}

impl ActionDispatcher {
    pub fn new(
        parser: CommandParser,
        router: CommandRouter,
        persistence: Arc<dyn PersistenceGateway>,
        notifier: Arc<dyn NotificationGateway>,
        settings: DispatchSettings,
    ) -> Self {
        Self { parser, router, persistence, notifier, settings }
    }

    pub async fn dispatch_mention(&self, event: &MentionEvent, ctx: &EventContext) -> DispatchOutcome {
        let parsed = self.parser.parse(&event.raw_text);

        let Some(binding) = self.router.resolve(&parsed.keyword) else {
            let token = match &parsed.keyword {
                CommandKeyword::Unrecognized(token) => token.as_str(),
                CommandKeyword::Known(_) => "",
            };
            let error = DispatchError::UnrecognizedCommand(token.to_string());
            info!(
                event_name = "dispatch.command.unrouted",
                correlation_id = %ctx.correlation_id,
                channel = %event.channel,
                error_class = error.error_class(),
                token,
                "unrecognized command"
            );
            let message = unknown_command_message(
                token,
                self.parser.keywords().keyword(CommandKind::Help),
                &self.settings.bot_name,
            );
            self.notify(&event.channel, &message, ctx).await;
            return DispatchOutcome::ErrorNotified;
        };

        let command = binding.kind.label();
        debug!(
            event_name = "dispatch.command.invoked",
            correlation_id = %ctx.correlation_id,
            channel = %event.channel,
            command,
            "invoking command handler"
        );

        match binding.handler.handle(&parsed.attributes, event, ctx).await {
            Ok(reply) => {
                if let Some(message) = reply {
                    self.notify(&event.channel, &message, ctx).await;
                }
                info!(
                    event_name = "dispatch.command.completed",
                    correlation_id = %ctx.correlation_id,
                    channel = %event.channel,
                    command,
                    "command completed"
                );
                DispatchOutcome::Completed
            }
            Err(error) => {
                warn!(
                    event_name = "dispatch.command.failed",
                    correlation_id = %ctx.correlation_id,
                    channel = %event.channel,
                    command,
                    error_class = error.error_class(),
                    error = %error,
                    "command handler failed"
                );
                if FailurePolicy::for_kind(binding.kind) == FailurePolicy::Notify {
                    let channel =
                        self.settings.error_channel.as_deref().unwrap_or(event.channel.as_str());
                    let summary = format!("`{command}` failed: {}", failure_summary(&error));
                    self.notify(channel, &failure_message(&summary, &ctx.correlation_id), ctx).await;
                }
                DispatchOutcome::FailedHandled
            }
        }
    }

    pub async fn dispatch_reaction(&self, event: &ReactionEvent, ctx: &EventContext) -> DispatchOutcome {
        let period = Period::from_slack_ts(event.event_ts.as_deref());
        let special = self
            .settings
            .special_emoji
            .as_ref()
            .filter(|special| special.name == event.reaction_name);

        let result = match event.kind {
            ReactionChange::Added => self.credit(event, &period, special).await,
            ReactionChange::Removed => self.withdraw(event, &period, special).await,
        };

        match result {
            Ok(outcome) => {
                info!(
                    event_name = "dispatch.reaction.applied",
                    correlation_id = %ctx.correlation_id,
                    channel = %event.channel,
                    reaction = %event.reaction_name,
                    period = %period,
                    outcome = outcome.label(),
                    "reaction processed"
                );
                outcome
            }
            Err(error) => {
                warn!(
                    event_name = "dispatch.reaction.failed",
                    correlation_id = %ctx.correlation_id,
                    channel = %event.channel,
                    reaction = %event.reaction_name,
                    period = %period,
                    error_class = error.error_class(),
                    error = %error,
                    "reaction update failed"
                );
                DispatchOutcome::FailedHandled
            }
        }
    }

    async fn credit(
        &self,
        event: &ReactionEvent,
        period: &Period,
        special: Option<&SpecialEmoji>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let credit = special.map(|special| (special_credit(event), special.monthly_limit));
        if let Some((credit, limit)) = &credit {
            let granted = self.persistence.reserve_special_grant(credit, period, *limit).await?;
            if !granted {
                return Ok(DispatchOutcome::Dropped(DropReason::SpecialGrantExhausted));
            }
        }

        if let Err(error) = self
            .persistence
            .increment_reaction(&event.target_user_id, &event.reaction_name, period)
            .await
        {
            if let Some((credit, _)) = &credit {
                if let Err(release_error) = self.persistence.release_special_grant(credit).await {
                    warn!(
                        event_name = "dispatch.reaction.grant_release_failed",
                        error = %release_error,
                        "could not return special grant"
                    );
                }
            }
            return Err(error.into());
        }

        Ok(DispatchOutcome::Completed)
    }

    async fn withdraw(
        &self,
        event: &ReactionEvent,
        period: &Period,
        special: Option<&SpecialEmoji>,
    ) -> Result<DispatchOutcome, DispatchError> {
        // Special reactions are debited in the month they were credited, and only if they were.
        let debit_period = match special {
            Some(_) => match self.persistence.release_special_grant(&special_credit(event)).await? {
                Some(credited) => credited,
                None => return Ok(DispatchOutcome::Dropped(DropReason::UncreditedSpecialReaction)),
            },
            None => *period,
        };

        self.persistence
            .decrement_reaction(&event.target_user_id, &event.reaction_name, &debit_period)
            .await?;
        Ok(DispatchOutcome::Completed)
    }

    async fn notify(&self, channel: &str, message: &MessageTemplate, ctx: &EventContext) {
        if let Err(error) = self.notifier.send_message(channel, message).await {
            warn!(
                event_name = "dispatch.notify.failed",
                correlation_id = %ctx.correlation_id,
                channel,
                error = %error,
                "could not deliver slack message"
            );
        }
    }
}

fn special_credit(event: &ReactionEvent) -> SpecialCredit {
    SpecialCredit {
        giver_id: event.actor_id.clone(),
        target_id: event.target_user_id.clone(),
        reaction_name: event.reaction_name.clone(),
        channel: event.channel.clone(),
        item_id: event.item_id.clone(),
    }
}

fn failure_summary(error: &DispatchError) -> String {
    match error {
        DispatchError::InvalidCommandArguments(detail) | DispatchError::DownstreamFailure(detail) => {
            detail.clone()
        }
        other => other.user_message().to_string(),
    }
}
