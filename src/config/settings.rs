//! Raw key/value settings sources
//!
//! The assembler never reads process state directly. It is handed a
//! [`SettingsSource`], which may be the environment, a TOML file, an
//! in-memory map, or a layered combination of those.

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Settings recognized by the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    RelayDomain,
    RelayIcon,
    RelayImage,
    JobConcurrency,
    ActorPem,
    RedisUrl,
    BrokerUrl,
    RelayBind,
    RelayServiceName,
    RelaySummary,
}

impl Setting {
    /// Every recognized setting, in assembly order
    pub const ALL: [Setting; 10] = [
        Setting::RelayDomain,
        Setting::RelayIcon,
        Setting::RelayImage,
        Setting::JobConcurrency,
        Setting::ActorPem,
        Setting::RedisUrl,
        Setting::BrokerUrl,
        Setting::RelayBind,
        Setting::RelayServiceName,
        Setting::RelaySummary,
    ];

    /// The key this setting is looked up under
    pub fn key(&self) -> &'static str {
        match self {
            Setting::RelayDomain => "RELAY_DOMAIN",
            Setting::RelayIcon => "RELAY_ICON",
            Setting::RelayImage => "RELAY_IMAGE",
            Setting::JobConcurrency => "JOB_CONCURRENCY",
            Setting::ActorPem => "ACTOR_PEM",
            Setting::RedisUrl => "REDIS_URL",
            Setting::BrokerUrl => "BROKER_URL",
            Setting::RelayBind => "RELAY_BIND",
            Setting::RelayServiceName => "RELAY_SERVICENAME",
            Setting::RelaySummary => "RELAY_SUMMARY",
        }
    }

    /// Look a setting up by key, case-insensitively
    pub fn from_key(key: &str) -> Option<Setting> {
        Self::ALL
            .into_iter()
            .find(|setting| setting.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A source of raw, untyped settings
pub trait SettingsSource: Send + Sync {
    /// Raw value for `setting`, or `None` when it is not set
    fn get(&self, setting: Setting) -> Option<String>;

    /// Raw value for `setting`, with unset treated as the empty string
    fn get_string(&self, setting: Setting) -> String {
        self.get(setting).unwrap_or_default()
    }
}

impl<S: SettingsSource + ?Sized> SettingsSource for &S {
    fn get(&self, setting: Setting) -> Option<String> {
        (**self).get(setting)
    }
}

impl<S: SettingsSource + ?Sized> SettingsSource for Box<S> {
    fn get(&self, setting: Setting) -> Option<String> {
        (**self).get(setting)
    }
}

/// Settings read from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl SettingsSource for EnvSettings {
    fn get(&self, setting: Setting) -> Option<String> {
        env::var(setting.key()).ok()
    }
}

/// Settings held in memory
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<Setting, String>,
}

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style
    pub fn with(mut self, setting: Setting, value: impl Into<String>) -> Self {
        self.insert(setting, value);
        self
    }

    pub fn insert(&mut self, setting: Setting, value: impl Into<String>) {
        self.values.insert(setting, value.into());
    }

    pub fn remove(&mut self, setting: Setting) -> Option<String> {
        self.values.remove(&setting)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsSource for MapSettings {
    fn get(&self, setting: Setting) -> Option<String> {
        self.values.get(&setting).cloned()
    }
}

impl FromIterator<(Setting, String)> for MapSettings {
    fn from_iter<I: IntoIterator<Item = (Setting, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Errors loading a settings file
#[derive(Debug, Error)]
pub enum SettingsFileError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("setting {key} must be a string, integer, float or boolean")]
    UnsupportedValue { key: String },

    #[error("setting {setting} is given twice, as {first} and {second}")]
    DuplicateKey {
        setting: Setting,
        first: String,
        second: String,
    },
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(flatten)]
    values: HashMap<String, toml::Value>,
}

/// Settings loaded from a flat TOML file
///
/// ```toml
/// RELAY_DOMAIN = "relay.example.org"
/// JOB_CONCURRENCY = 50
/// ```
///
/// Keys match case-insensitively and may appear only once. Keys that do
/// not name a known setting are ignored.
#[derive(Debug, Clone, Default)]
pub struct FileSettings {
    values: MapSettings,
}

impl FileSettings {
    /// Load settings from a TOML file on disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsFileError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| SettingsFileError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsFileError> {
        let file: SettingsFile = toml::from_str(content)?;
        let mut values = MapSettings::new();
        let mut seen: HashMap<Setting, String> = HashMap::new();

        for (key, value) in file.values {
            let Some(setting) = Setting::from_key(&key) else {
                tracing::debug!(key = %key, "Ignoring unknown settings file key");
                continue;
            };
            // Keys differing only in case name the same setting
            if let Some(other) = seen.get(&setting) {
                let (first, second) = if other.as_str() < key.as_str() {
                    (other.clone(), key)
                } else {
                    (key, other.clone())
                };
                return Err(SettingsFileError::DuplicateKey {
                    setting,
                    first,
                    second,
                });
            }
            seen.insert(setting, key.clone());
            let raw = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => return Err(SettingsFileError::UnsupportedValue { key }),
            };
            values.insert(setting, raw);
        }

        Ok(Self { values })
    }
}

impl SettingsSource for FileSettings {
    fn get(&self, setting: Setting) -> Option<String> {
        self.values.get(setting)
    }
}

/// Ordered stack of sources; the first source that has a value wins
#[derive(Default)]
pub struct LayeredSettings {
    layers: Vec<Box<dyn SettingsSource>>,
}

impl LayeredSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lower-priority layer
    pub fn with_layer(mut self, source: impl SettingsSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }
}

impl fmt::Debug for LayeredSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredSettings")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl SettingsSource for LayeredSettings {
    fn get(&self, setting: Setting) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(setting))
    }
}
