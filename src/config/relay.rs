//! Relay configuration assembly
//!
//! [`RelayConfig::build`] turns raw settings into a validated, immutable
//! configuration. Every setting is validated into a [`FieldOutcome`];
//! the first fatal outcome aborts assembly. Only the icon, image and
//! broker settings may fall back to a default.

use crate::config::field::{parse_absolute_url, parse_job_concurrency, FieldOutcome};
use crate::config::settings::{EnvSettings, Setting, SettingsSource};
use crate::error::{ConfigError, Result};
use crate::keys::load_actor_key;
use crate::store::{CacheStore, RedisConnector, StoreConnector};
use crate::utils::redact_url;
use redis::IntoConnectionInfo;
use rsa::RsaPrivateKey;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Scheme prepended to `RELAY_DOMAIN`
pub const DOMAIN_SCHEME: &str = "https://";

/// Validated relay configuration
///
/// Fields are private and never change after [`RelayConfig::build`]
/// returns; share it behind an `Arc`.
pub struct RelayConfig {
    actor_key: RsaPrivateKey,
    domain: Url,
    cache_store: Arc<dyn CacheStore>,
    broker_url: Url,
    redis_url: Url,
    server_bind: String,
    service_name: String,
    service_summary: String,
    service_icon_url: Option<Url>,
    service_image_url: Option<Url>,
    job_concurrency: usize,
}

impl RelayConfig {
    /// Assemble a configuration from `settings`, connecting to the cache
    /// store through `connector`
    ///
    /// The cache store must answer a ping for assembly to succeed.
    pub async fn build<S, C>(settings: &S, connector: &C) -> Result<Self>
    where
        S: SettingsSource + ?Sized,
        C: StoreConnector + ?Sized,
    {
        let domain = domain_field(&settings.get_string(Setting::RelayDomain))
            .resolve(Setting::RelayDomain)?;

        let service_icon_url = display_url_field(&settings.get_string(Setting::RelayIcon))
            .resolve(Setting::RelayIcon)?;

        let service_image_url = display_url_field(&settings.get_string(Setting::RelayImage))
            .resolve(Setting::RelayImage)?;

        let job_concurrency = concurrency_field(&settings.get_string(Setting::JobConcurrency))
            .resolve(Setting::JobConcurrency)?;

        let actor_key = FieldOutcome::or_fatal(
            load_actor_key(settings.get_string(Setting::ActorPem)).await,
            Setting::ActorPem,
        )
        .resolve(Setting::ActorPem)?;

        let redis_url = FieldOutcome::or_fatal(
            parse_absolute_url(&settings.get_string(Setting::RedisUrl)),
            Setting::RedisUrl,
        )
        .resolve(Setting::RedisUrl)?;
        let cache_store = connect_cache_store(&redis_url, connector).await?;

        let broker_url = broker_field(&settings.get_string(Setting::BrokerUrl), &redis_url)
            .resolve(Setting::BrokerUrl)?;

        let config = Self {
            actor_key,
            domain,
            cache_store,
            broker_url,
            redis_url,
            server_bind: settings.get_string(Setting::RelayBind),
            service_name: settings.get_string(Setting::RelayServiceName),
            service_summary: settings.get_string(Setting::RelaySummary),
            service_icon_url,
            service_image_url,
            job_concurrency,
        };

        info!(
            domain = %config.domain,
            broker = %redact_url(&config.broker_url),
            job_concurrency = config.job_concurrency,
            "Relay configuration assembled"
        );
        Ok(config)
    }

    /// Assemble from the process environment against a real Redis
    pub async fn from_env() -> Result<Self> {
        Self::build(&EnvSettings, &RedisConnector).await
    }

    /// API server bind address
    pub fn server_bind(&self) -> &str {
        &self.server_bind
    }

    /// Base URL of this relay instance
    pub fn server_hostname(&self) -> &Url {
        &self.domain
    }

    pub fn server_service_name(&self) -> &str {
        &self.service_name
    }

    pub fn service_summary(&self) -> &str {
        &self.service_summary
    }

    /// Icon shown on the relay actor, if configured
    pub fn service_icon_url(&self) -> Option<&Url> {
        self.service_icon_url.as_ref()
    }

    /// Header image shown on the relay actor, if configured
    pub fn service_image_url(&self) -> Option<&Url> {
        self.service_image_url.as_ref()
    }

    /// Number of concurrent delivery jobs, at least 1
    pub fn job_concurrency(&self) -> usize {
        self.job_concurrency
    }

    /// Key used to sign outbound requests
    pub fn actor_key(&self) -> &RsaPrivateKey {
        &self.actor_key
    }

    /// Shared handle to the cache store
    pub fn cache_store(&self) -> Arc<dyn CacheStore> {
        Arc::clone(&self.cache_store)
    }

    pub fn broker_url(&self) -> &Url {
        &self.broker_url
    }

    /// Cache store address, also the task queue's result backend
    pub fn redis_url(&self) -> &Url {
        &self.redis_url
    }

    /// Startup banner describing the running module and its configuration
    pub fn dump_welcome_message(&self, module_name: &str, version: &str) -> String {
        format!(
            "Welcome to YUKIMOCHI Activity-Relay {version} - {module_name}
 - Configuration
RELAY NAME      : {}
RELAY DOMAIN    : {}
BROKER URL      : {}
REDIS URL       : {}
BIND ADDRESS    : {}
JOB_CONCURRENCY : {}
",
            self.service_name,
            domain_host(&self.domain),
            redact_url(&self.broker_url),
            redact_url(&self.redis_url),
            self.server_bind,
            self.job_concurrency,
        )
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("domain", &self.domain.as_str())
            .field("cache_store", &self.cache_store.provider_name())
            .field("broker_url", &redact_url(&self.broker_url))
            .field("redis_url", &redact_url(&self.redis_url))
            .field("server_bind", &self.server_bind)
            .field("service_name", &self.service_name)
            .field("service_summary", &self.service_summary)
            .field("service_icon_url", &self.service_icon_url)
            .field("service_image_url", &self.service_image_url)
            .field("job_concurrency", &self.job_concurrency)
            .finish_non_exhaustive()
    }
}

/// `RELAY_DOMAIN` is a bare host; the scheme is fixed
pub(crate) fn domain_field(raw: &str) -> FieldOutcome<Url> {
    FieldOutcome::or_fatal(
        parse_absolute_url(&format!("{DOMAIN_SCHEME}{}", raw.trim())),
        Setting::RelayDomain,
    )
}

/// Decorative addresses are disabled rather than rejected when invalid
pub(crate) fn display_url_field(raw: &str) -> FieldOutcome<Option<Url>> {
    FieldOutcome::or_default(
        parse_absolute_url(raw).map(Some),
        || None,
        "invalid or empty, this column is disabled",
    )
}

pub(crate) fn concurrency_field(raw: &str) -> FieldOutcome<usize> {
    FieldOutcome::or_fatal(parse_job_concurrency(raw), Setting::JobConcurrency)
}

/// Small deployments share one store for cache and broker
pub(crate) fn broker_field(raw: &str, redis_url: &Url) -> FieldOutcome<Url> {
    FieldOutcome::or_default(
        parse_absolute_url(raw),
        || redis_url.clone(),
        "invalid or empty, using REDIS_URL",
    )
}

/// Open the cache store and check it answers
async fn connect_cache_store<C>(redis_url: &Url, connector: &C) -> Result<Arc<dyn CacheStore>>
where
    C: StoreConnector + ?Sized,
{
    let info = FieldOutcome::or_fatal(redis_url.as_str().into_connection_info(), Setting::RedisUrl)
        .resolve(Setting::RedisUrl)?;

    debug!(redis_url = %redact_url(redis_url), "Testing cache store connection");
    let store = connector
        .connect(info)
        .await
        .map_err(|e| ConfigError::connectivity(Setting::RedisUrl, e))?;
    store
        .ping()
        .await
        .map_err(|e| ConfigError::connectivity(Setting::RedisUrl, e))?;

    Ok(store)
}

/// Host of the domain, with the port when one is given
fn domain_host(domain: &Url) -> String {
    let host = domain.host_str().unwrap_or_default();
    match domain.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
