pub mod command;
pub mod leaderboard;
pub mod member;
pub mod reaction;
