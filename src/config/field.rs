//! Per-field validation outcomes
//!
//! Each setting is validated into a [`FieldOutcome`]. The assembler resolves
//! outcomes in order; the first fatal one aborts assembly, and defaulted
//! ones are logged as warnings.

use crate::config::Setting;
use crate::error::{AddressError, ConfigError, SettingError};
use tracing::warn;
use url::Url;

/// Result of validating a single setting
#[derive(Debug)]
pub enum FieldOutcome<T> {
    /// The raw value was accepted
    Valid(T),
    /// The raw value was rejected and replaced by a fallback
    Defaulted(T, String),
    /// The raw value was rejected and there is no fallback
    Fatal(ConfigError),
}

impl<T> FieldOutcome<T> {
    /// Accept `parsed`, or fall back to `fallback()` when it is an error
    pub fn or_default<E: std::fmt::Display>(
        parsed: Result<T, E>,
        fallback: impl FnOnce() -> T,
        reason: &str,
    ) -> Self {
        match parsed {
            Ok(value) => Self::Valid(value),
            Err(e) => Self::Defaulted(fallback(), format!("{reason} ({e})")),
        }
    }

    /// Accept `parsed`; an error is fatal for `setting`
    pub fn or_fatal<E>(parsed: Result<T, E>, setting: Setting) -> Self
    where
        E: Into<SettingError>,
    {
        match parsed {
            Ok(value) => Self::Valid(value),
            Err(e) => Self::Fatal(ConfigError::invalid(setting, e)),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted(..))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Collapse the outcome, warning about a defaulted value
    pub fn resolve(self, setting: Setting) -> Result<T, ConfigError> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Defaulted(value, reason) => {
                warn!(setting = %setting, "{}: {}", setting, reason);
                Ok(value)
            }
            Self::Fatal(err) => Err(err),
        }
    }
}

/// Parse an absolute address: scheme and host are both required
pub fn parse_absolute_url(raw: &str) -> Result<Url, AddressError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AddressError::Empty);
    }

    let url = Url::parse(raw).map_err(|source| AddressError::Parse {
        value: raw.to_string(),
        source,
    })?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(AddressError::MissingHost {
            value: raw.to_string(),
        }),
    }
}

/// Parse a job concurrency value; unset or unparseable counts as zero
pub fn parse_job_concurrency(raw: &str) -> Result<usize, SettingError> {
    let value = raw.trim().parse::<i64>().unwrap_or(0);
    if value < 1 {
        return Err(SettingError::NotPositive {
            value: raw.to_string(),
        });
    }
    usize::try_from(value).map_err(|_| SettingError::NotPositive {
        value: raw.to_string(),
    })
}
