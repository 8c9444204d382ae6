//! Activity Relay - configuration bootstrap
//!
//! This crate validates the relay's startup settings into an immutable
//! [`RelayConfig`] and provisions the task queue that delivery workers
//! consume from.

pub mod config;
pub mod error;
pub mod keys;
pub mod queue;
pub mod store;
pub mod utils;

// Re-export commonly used types and traits
pub use config::{RelayConfig, Setting, SettingsSource};
pub use error::{ConfigError, Result};

// Re-export key components
pub use queue::{provision, BrokerFactory, TaskQueueFactory, TaskQueueSettings};
pub use store::{CacheStore, RedisConnector, StoreConnector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
