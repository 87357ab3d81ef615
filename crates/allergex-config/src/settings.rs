//! Typed view of `settings.yaml`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use allergex_nlp::{Annotator, HttpAnnotator, Lexicon, RuleAnnotator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_ip")]
    pub ip: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    #[serde(default)]
    pub annotator: AnnotatorSettings,
    pub lookup_table: LookupTable,
}

fn default_ip()              -> String { "127.0.0.1".to_string() }
fn default_port()            -> u16    { 5050 }
fn default_max_frame_bytes() -> usize  { 1024 * 1024 }

/// The four lexicon lists. All are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupTable {
    pub species: Vec<String>,
    pub allergens: Vec<String>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotatorKind {
    Builtin,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatorSettings {
    #[serde(default = "default_annotator_kind")]
    pub kind: AnnotatorKind,
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_annotator_kind() -> AnnotatorKind { AnnotatorKind::Builtin }
fn default_timeout_secs()   -> u64           { 30 }

impl Default for AnnotatorSettings {
    fn default() -> Self {
        Self {
            kind: default_annotator_kind(),
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnnotatorSettings {
    /// Build the configured annotator.
    pub fn build(&self) -> Result<Arc<dyn Annotator>> {
        match self.kind {
            AnnotatorKind::Builtin => Ok(Arc::new(RuleAnnotator::new())),
            AnnotatorKind::Http => {
                let url = self.url.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("annotator.url is required for kind 'http'".to_string())
                })?;
                let annotator = HttpAnnotator::new(url, Duration::from_secs(self.timeout_secs))
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                Ok(Arc::new(annotator))
            }
        }
    }
}

impl Settings {
    /// Load settings from `ALLERGEX_CONFIG` or `config/settings.yaml`.
    pub fn load() -> Result<Self> {
        Self::load_from(crate::config_path())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Config path: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(settings)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.annotator.kind == AnnotatorKind::Http && self.annotator.url.is_none() {
            return Err(ConfigError::Invalid(
                "annotator.url is required for kind 'http'".to_string(),
            ));
        }
        if self.max_frame_bytes == 0 {
            return Err(ConfigError::Invalid("maxFrameBytes must be positive".to_string()));
        }
        Ok(())
    }

    pub fn lexicon(&self) -> Lexicon {
        let table = &self.lookup_table;
        Lexicon::new(
            table.species.clone(),
            table.allergens.clone(),
            table.positive.clone(),
            table.negative.clone(),
        )
    }

    /// `ip:port` for binding or connecting.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}
