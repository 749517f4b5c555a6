use async_trait::async_trait;
use thiserror::Error;

use heymoji_core::domain::leaderboard::RankedMember;
use heymoji_core::domain::member::{SlackUserId, UserAttributes};
use heymoji_core::domain::reaction::{Period, SpecialCredit};
use heymoji_core::errors::DispatchError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("member `{0}` not found")]
    NotFound(String),
    #[error("member `{0}` already exists")]
    Conflict(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<GatewayError> for DispatchError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::InvalidInput(message) => Self::InvalidCommandArguments(message),
            other => Self::DownstreamFailure(other.to_string()),
        }
    }
}

/// Member and reaction store consumed by the dispatcher and the command handlers.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn create_user(&self, attributes: &UserAttributes) -> Result<(), GatewayError>;

    /// Overwrites only the fields present in `attributes`.
    async fn update_user(&self, attributes: &UserAttributes) -> Result<(), GatewayError>;

    async fn set_user_visibility(
        &self,
        attributes: &UserAttributes,
        hidden: bool,
    ) -> Result<(), GatewayError>;

    async fn increment_reaction(
        &self,
        target: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, GatewayError>;

    async fn decrement_reaction(
        &self,
        target: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, GatewayError>;

    /// `false` when the giver already used `limit` special reactions in `period`
    /// or this credit is already recorded.
    async fn reserve_special_grant(
        &self,
        credit: &SpecialCredit,
        period: &Period,
        limit: u32,
    ) -> Result<bool, GatewayError>;

    /// Period the credit was counted in, `None` when it was never granted.
    async fn release_special_grant(
        &self,
        credit: &SpecialCredit,
    ) -> Result<Option<Period>, GatewayError>;

    async fn query_top_users(
        &self,
        year: i32,
        month: u32,
        limit: usize,
    ) -> Result<Vec<RankedMember>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use heymoji_core::errors::DispatchError;

    use super::GatewayError;

    #[test]
    fn gateway_errors_map_to_dispatch_classes() {
        let missing: DispatchError = GatewayError::NotFound("U1".to_string()).into();
        assert_eq!(missing.error_class(), "downstream_failure");
        assert!(missing.to_string().contains("not found"));

        let invalid: DispatchError = GatewayError::InvalidInput("username".to_string()).into();
        assert_eq!(invalid.error_class(), "invalid_command_arguments");
    }
}
