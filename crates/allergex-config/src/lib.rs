//! allergex-config: settings loading shared by the CLI, server and client.
//!
//! Reads `config/settings.yaml`, or the path in `ALLERGEX_CONFIG`.

mod settings;

pub use settings::{AnnotatorKind, AnnotatorSettings, LookupTable, Settings};

use std::path::PathBuf;

/// Environment variable overriding the settings path.
pub const CONFIG_ENV: &str = "ALLERGEX_CONFIG";

/// Settings path used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/settings.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Resolve the settings path from the environment.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
