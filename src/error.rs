//! Error types for relay bootstrap
//!
//! Fatal configuration problems are reported as [`ConfigError`], always
//! tagged with the [`Setting`] that caused them so callers can inspect the
//! failure without matching on message text.

use crate::config::Setting;
use crate::store::StoreError;

/// Result type alias for the configuration assembler
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fatal failure while assembling a [`crate::config::RelayConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting is missing or malformed
    #[error("{setting}: {source}")]
    Invalid {
        setting: Setting,
        #[source]
        source: SettingError,
    },

    /// The cache store named by a setting could not be reached
    #[error("{setting}: cache store connection test failed: {source}")]
    Connectivity {
        setting: Setting,
        #[source]
        source: StoreError,
    },
}

impl ConfigError {
    /// Build an [`ConfigError::Invalid`] for a setting
    pub fn invalid(setting: Setting, source: impl Into<SettingError>) -> Self {
        Self::Invalid {
            setting,
            source: source.into(),
        }
    }

    /// Build a [`ConfigError::Connectivity`] for a setting
    pub fn connectivity(setting: Setting, source: StoreError) -> Self {
        Self::Connectivity { setting, source }
    }

    /// The setting this error originated from
    pub fn setting(&self) -> Setting {
        match self {
            Self::Invalid { setting, .. } | Self::Connectivity { setting, .. } => *setting,
        }
    }

    /// Whether this is a reachability failure rather than a syntax failure
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}

/// Why a single setting value was rejected
#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("{value:?} is 0 or empty, should be 1 or more")]
    NotPositive { value: String },

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("not a usable connection descriptor: {0}")]
    ConnectionDescriptor(#[from] redis::RedisError),
}

/// Why a raw string is not an absolute address
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("empty address")]
    Empty,

    #[error("invalid address {value:?}: {source}")]
    Parse {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("address {value:?} has no host")]
    MissingHost { value: String },
}

/// Failure loading the actor signing key
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("no key path given")]
    MissingPath,

    #[error("failed to read key file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse RSA private key from {path}: {message}")]
    Parse { path: String, message: String },
}
