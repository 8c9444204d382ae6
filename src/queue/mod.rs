//! Task queue provisioning
//!
//! Relay deliveries run as jobs on a distributed task queue. This module
//! derives the queue topology from a [`RelayConfig`] and hands it to a
//! [`TaskQueueFactory`]; it performs no validation of its own.

pub mod broker;

use crate::config::RelayConfig;
use crate::utils::redact_url;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;
use url::Url;

pub use broker::{AmqpConfig, BrokerConnection, BrokerFactory, QueueError, TaskQueueClient};

/// Queue topology
pub const DEFAULT_QUEUE: &str = "relay";
pub const RELAY_EXCHANGE: &str = "relay_exchange";
pub const RELAY_EXCHANGE_KIND: &str = "direct";
pub const RELAY_BINDING_KEY: &str = "relay_task";

/// How long task results are kept in the result backend
pub const RESULTS_EXPIRE_IN: Duration = Duration::from_secs(1);

/// Everything needed to construct a task queue client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQueueSettings {
    pub broker: Url,
    pub result_backend: Url,
    pub default_queue: String,
    pub results_expire_in: Duration,
    pub exchange: String,
    pub exchange_kind: String,
    pub binding_key: String,
    pub concurrency: usize,
}

impl TaskQueueSettings {
    /// Relay topology over the given broker and result backend
    pub fn new(broker: Url, result_backend: Url, concurrency: usize) -> Self {
        Self {
            broker,
            result_backend,
            default_queue: DEFAULT_QUEUE.to_string(),
            results_expire_in: RESULTS_EXPIRE_IN,
            exchange: RELAY_EXCHANGE.to_string(),
            exchange_kind: RELAY_EXCHANGE_KIND.to_string(),
            binding_key: RELAY_BINDING_KEY.to_string(),
            concurrency,
        }
    }

    /// Settings for the relay's own queue
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            config.broker_url().clone(),
            config.redis_url().clone(),
            config.job_concurrency(),
        )
    }
}

/// Builds task queue clients
#[cfg_attr(test, mockall::automock(type Client = String; type Error = QueueError;))]
#[async_trait]
pub trait TaskQueueFactory: Send + Sync {
    type Client: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn create(&self, settings: TaskQueueSettings) -> Result<Self::Client, Self::Error>;
}

/// Construct a task queue client for the relay
///
/// Factory errors are returned as-is; there is no retry.
pub async fn provision<F>(config: &RelayConfig, factory: &F) -> Result<F::Client, F::Error>
where
    F: TaskQueueFactory + ?Sized,
{
    let settings = TaskQueueSettings::from_config(config);
    info!(
        broker = %redact_url(&settings.broker),
        result_backend = %redact_url(&settings.result_backend),
        queue = %settings.default_queue,
        concurrency = settings.concurrency,
        "Provisioning task queue"
    );
    factory.create(settings).await
}
