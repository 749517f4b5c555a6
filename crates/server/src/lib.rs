pub mod bootstrap;
pub mod gateway;
pub mod health;
pub mod inflight;
pub mod signature;
pub mod webhook;

pub use bootstrap::{bootstrap, bootstrap_with_config, Application, BootstrapError};
