//! Configuration management for the relay
//!
//! This module handles reading raw settings, validating them field by
//! field, and assembling the immutable relay configuration.

pub mod field;
pub mod relay;
pub mod settings;

// Re-export commonly used types
pub use field::{parse_absolute_url, FieldOutcome};
pub use relay::{RelayConfig, DOMAIN_SCHEME};
pub use settings::{
    EnvSettings, FileSettings, LayeredSettings, MapSettings, Setting, SettingsFileError,
    SettingsSource,
};
