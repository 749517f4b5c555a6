pub mod config;
pub mod domain;
pub mod errors;

pub use domain::command::CommandKind;
pub use domain::leaderboard::{rank_members, LeaderboardRow, RankedMember, ReactionTally};
pub use domain::member::{Member, SlackUserId, UserAttributes};
pub use domain::reaction::{normalize_reaction_name, Period, ReactionChange, SpecialCredit};
pub use errors::{DispatchError, DomainError};
