use std::sync::Arc;

use async_trait::async_trait;

use heymoji_core::domain::leaderboard::{rank_members, RankedMember};
use heymoji_core::domain::member::{SlackUserId, UserAttributes};
use heymoji_core::domain::reaction::{Period, SpecialCredit};
use heymoji_db::repositories::{
    MemberRepository, ReactionRepository, RepositoryError, SqlMemberRepository,
    SqlReactionRepository,
};
use heymoji_db::DbPool;
use heymoji_slack::gateway::{GatewayError, PersistenceGateway};

/// [`PersistenceGateway`] backed by the member and reaction repositories.
pub struct RepositoryGateway {
    members: Arc<dyn MemberRepository>,
    reactions: Arc<dyn ReactionRepository>,
}

impl RepositoryGateway {
    pub fn new(members: Arc<dyn MemberRepository>, reactions: Arc<dyn ReactionRepository>) -> Self {
        Self { members, reactions }
    }

    pub fn sqlite(pool: DbPool) -> Self {
        Self::new(
            Arc::new(SqlMemberRepository::new(pool.clone())),
            Arc::new(SqlReactionRepository::new(pool)),
        )
    }
}

fn storage_error(error: RepositoryError) -> GatewayError {
    match error {
        RepositoryError::NotFound(id) => GatewayError::NotFound(id),
        RepositoryError::Conflict(id) => GatewayError::Conflict(id),
        other => GatewayError::Storage(other.to_string()),
    }
}

#[async_trait]
impl PersistenceGateway for RepositoryGateway {
    async fn create_user(&self, attributes: &UserAttributes) -> Result<(), GatewayError> {
        let member = attributes
            .clone()
            .into_member()
            .ok_or_else(|| GatewayError::InvalidInput("missing `username`".to_string()))?;
        self.members.insert(member).await.map_err(storage_error)
    }

    async fn update_user(&self, attributes: &UserAttributes) -> Result<(), GatewayError> {
        let id = attributes.user_id();
        let mut member = self
            .members
            .find_by_id(&id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        member.apply(attributes);
        self.members.update(member).await.map_err(storage_error)
    }

    async fn set_user_visibility(
        &self,
        attributes: &UserAttributes,
        hidden: bool,
    ) -> Result<(), GatewayError> {
        self.members.set_hidden(&attributes.user_id(), hidden).await.map_err(storage_error)
    }

    async fn increment_reaction(
        &self,
        target: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, GatewayError> {
        self.reactions.increment(target, reaction_name, period).await.map_err(storage_error)
    }

    async fn decrement_reaction(
        &self,
        target: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, GatewayError> {
        self.reactions.decrement(target, reaction_name, period).await.map_err(storage_error)
    }

    async fn reserve_special_grant(
        &self,
        credit: &SpecialCredit,
        period: &Period,
        limit: u32,
    ) -> Result<bool, GatewayError> {
        self.reactions.reserve_grant(credit, period, limit).await.map_err(storage_error)
    }

    async fn release_special_grant(
        &self,
        credit: &SpecialCredit,
    ) -> Result<Option<Period>, GatewayError> {
        self.reactions.release_grant(credit).await.map_err(storage_error)
    }

    async fn query_top_users(
        &self,
        year: i32,
        month: u32,
        limit: usize,
    ) -> Result<Vec<RankedMember>, GatewayError> {
        let period =
            Period::new(year, month).map_err(|error| GatewayError::InvalidInput(error.to_string()))?;
        let rows = self.reactions.leaderboard_rows(&period).await.map_err(storage_error)?;
        Ok(rank_members(rows, limit))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use heymoji_core::config::AppConfig;
    use heymoji_core::domain::member::{SlackUserId, UserAttributes};
    use heymoji_core::domain::reaction::{Period, ReactionChange};
    use heymoji_db::repositories::{
        InMemoryMemberRepository, InMemoryReactionRepository, ReactionRepository,
    };
    use heymoji_db::{connect_with_settings, migrations};
    use heymoji_slack::commands::CommandParser;
    use heymoji_slack::dispatch::{ActionDispatcher, DispatchOutcome, DispatchSettings};
    use heymoji_slack::events::{DropReason, EventContext, ReactionEvent};
    use heymoji_slack::gateway::{GatewayError, PersistenceGateway};
    use heymoji_slack::handlers::command_router;
    use heymoji_slack::notifier::NoopNotifier;

    use super::RepositoryGateway;

    fn in_memory() -> RepositoryGateway {
        let members = Arc::new(InMemoryMemberRepository::default());
        let reactions = Arc::new(InMemoryReactionRepository::with_members(Arc::clone(&members)));
        RepositoryGateway::new(members, reactions)
    }

    fn attributes(id: &str, username: Option<&str>) -> UserAttributes {
        UserAttributes {
            slack_id: id.to_string(),
            username: username.map(str::to_string),
            ..UserAttributes::default()
        }
    }

    #[tokio::test]
    async fn update_of_unknown_member_is_not_found() {
        let gateway = in_memory();
        let error = gateway
            .update_user(&UserAttributes {
                department: Some("ops".to_string()),
                ..attributes("U404", None)
            })
            .await
            .expect_err("missing member");
        assert_eq!(error, GatewayError::NotFound("U404".to_string()));
    }

    #[tokio::test]
    async fn duplicate_create_is_a_conflict() {
        let gateway = in_memory();
        gateway.create_user(&attributes("U1", Some("kim"))).await.expect("create");
        assert_eq!(
            gateway.create_user(&attributes("U1", Some("kim"))).await,
            Err(GatewayError::Conflict("U1".to_string()))
        );
    }

    #[tokio::test]
    async fn top_users_rank_visible_members_on_sqlite() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrations");
        let gateway = RepositoryGateway::sqlite(pool);
        let period = Period::new(2024, 3).expect("period");

        for (id, name) in [("U1", "kim"), ("U2", "lee"), ("U3", "park")] {
            gateway.create_user(&attributes(id, Some(name))).await.expect("create");
        }
        for (id, reaction, times) in [("U1", "heart", 2), ("U2", "heart", 3), ("U3", "pray", 4)] {
            for _ in 0..times {
                gateway
                    .increment_reaction(&SlackUserId(id.to_string()), reaction, &period)
                    .await
                    .expect("increment");
            }
        }
        gateway.set_user_visibility(&attributes("U3", None), true).await.expect("hide");

        let top = gateway.query_top_users(2024, 3, 5).await.expect("top users");
        let ranked: Vec<(&str, i64)> =
            top.iter().map(|member| (member.slack_id.as_str(), member.score)).collect();
        assert_eq!(ranked, vec![("U2", 3), ("U1", 2)]);

        let again = gateway.query_top_users(2024, 3, 5).await.expect("top users");
        assert_eq!(top, again);
    }

    #[tokio::test]
    async fn invalid_month_is_invalid_input() {
        let gateway = in_memory();
        assert!(matches!(
            gateway.query_top_users(2024, 13, 5).await,
            Err(GatewayError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn removing_an_uncredited_trophy_keeps_the_credited_one() {
        let members = Arc::new(InMemoryMemberRepository::default());
        let reactions = Arc::new(InMemoryReactionRepository::with_members(Arc::clone(&members)));
        let reaction_store: Arc<dyn ReactionRepository> = reactions.clone();
        let gateway: Arc<dyn PersistenceGateway> =
            Arc::new(RepositoryGateway::new(members, reaction_store));

        let mut config = AppConfig::default();
        config.reactions.special_emoji_monthly_limit = 1;
        let dispatcher = ActionDispatcher::new(
            CommandParser::default(),
            command_router(Arc::clone(&gateway), &config),
            gateway,
            Arc::new(NoopNotifier),
            DispatchSettings::from_config(&config),
        );

        let trophy = |kind, item_id: &str| ReactionEvent {
            kind,
            actor_id: SlackUserId("UA".to_string()),
            target_user_id: SlackUserId("UT".to_string()),
            reaction_name: "trophy".to_string(),
            channel: "C1".to_string(),
            item_id: item_id.to_string(),
            event_ts: Some("1709251200.000200".to_string()),
        };
        let ctx = EventContext::default();

        let first = dispatcher.dispatch_reaction(&trophy(ReactionChange::Added, "1.1"), &ctx).await;
        let second = dispatcher.dispatch_reaction(&trophy(ReactionChange::Added, "1.2"), &ctx).await;
        let removed =
            dispatcher.dispatch_reaction(&trophy(ReactionChange::Removed, "1.2"), &ctx).await;

        assert_eq!(first, DispatchOutcome::Completed);
        assert_eq!(second, DispatchOutcome::Dropped(DropReason::SpecialGrantExhausted));
        assert_eq!(removed, DispatchOutcome::Dropped(DropReason::UncreditedSpecialReaction));

        let period = Period::new(2024, 3).expect("period");
        let count = reactions
            .count(&SlackUserId("UT".to_string()), "trophy", &period)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }
}
