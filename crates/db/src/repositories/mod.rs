use async_trait::async_trait;
use thiserror::Error;

use heymoji_core::domain::leaderboard::LeaderboardRow;
use heymoji_core::domain::member::{Member, SlackUserId};
use heymoji_core::domain::reaction::{Period, SpecialCredit};

pub mod member;
pub mod memory;
pub mod reaction;

pub use member::SqlMemberRepository;
pub use memory::{InMemoryMemberRepository, InMemoryReactionRepository};
pub use reaction::SqlReactionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record already exists: {0}")]
    Conflict(String),
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, id: &SlackUserId) -> Result<Option<Member>, RepositoryError>;

    /// Inserts a new member; `Conflict` when the slack id is already registered.
    async fn insert(&self, member: Member) -> Result<(), RepositoryError>;

    /// Overwrites an existing member; `NotFound` when it was never registered.
    async fn update(&self, member: Member) -> Result<(), RepositoryError>;

    async fn set_hidden(&self, id: &SlackUserId, hidden: bool) -> Result<(), RepositoryError>;
}

/// Per-period reaction counters. Every mutation is a single atomic statement so
/// concurrent deliveries for the same key never lose updates.
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    async fn increment(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError>;

    /// Decrements the counter, never below zero. Returns the resulting count.
    async fn decrement(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError>;

    async fn count(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError>;

    /// Takes one of the giver's special-emoji grants for `period` and records the
    /// credit. `false` when `limit` grants are already used or the credit exists.
    async fn reserve_grant(
        &self,
        credit: &SpecialCredit,
        period: &Period,
        limit: u32,
    ) -> Result<bool, RepositoryError>;

    /// Deletes a recorded credit and returns its grant. Yields the period the
    /// credit was counted in, or `None` when the reaction was never credited.
    async fn release_grant(&self, credit: &SpecialCredit) -> Result<Option<Period>, RepositoryError>;

    /// Positive counters of visible members for the period.
    async fn leaderboard_rows(&self, period: &Period) -> Result<Vec<LeaderboardRow>, RepositoryError>;
}
