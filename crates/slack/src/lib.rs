//! Slack integration for heymoji
//!
//! Turns Events API callbacks into member and reaction updates:
//! - **Events** (`events`) - payload classification and the reaction policy
//! - **Commands** (`commands`) - mention text parsing into typed commands
//! - **Router** (`router`) - fixed command-to-handler table
//! - **Dispatch** (`dispatch`) - handler invocation behind a failure boundary
//! - **Block Kit** (`blocks`) - help, error and leaderboard cards
//! - **Gateways** (`gateway`, `notifier`) - storage and outbound message seams
//!
//! # Architecture
//!
//! ```text
//! webhook body → EventClassifier ─┬─ challenge → echoed by the transport
//!                                 ├─ reaction  → ActionDispatcher → PersistenceGateway
//!                                 └─ mention   → CommandParser → CommandRouter
//!                                                 → ActionDispatcher → NotificationGateway
//! ```

pub mod blocks;
pub mod commands;
pub mod dispatch;
pub mod events;
pub mod gateway;
pub mod handlers;
pub mod notifier;
pub mod router;

#[cfg(test)]
mod testing;
