//! Administration configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use remindful_core::matcher::{MatchMode, MatchPolicy};
use remindful_core::session::{
    SessionConfig, DEFAULT_FREE_RECALL_SECS, DEFAULT_INTERFERENCE_SECS,
};

/// Top-level remindful configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindfulConfig {
    /// Directory holding vocabulary files.
    #[serde(default = "default_vocabulary_dir")]
    pub vocabulary_dir: PathBuf,
    /// Output directory for reports and history.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Default subject identifier.
    #[serde(default)]
    pub subject: Option<String>,
    /// Matching during controlled learning.
    #[serde(default)]
    pub learning_matching: MatchPolicy,
    /// Matching during immediate recall.
    #[serde(default = "default_immediate_matching")]
    pub immediate_matching: MatchPolicy,
    /// Interference length in seconds.
    #[serde(default = "default_interference_secs")]
    pub interference_secs: u64,
    /// Free recall length in seconds.
    #[serde(default = "default_free_recall_secs")]
    pub free_recall_secs: u64,
}

fn default_vocabulary_dir() -> PathBuf {
    PathBuf::from("./vocabularies")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./remindful-results")
}

fn default_immediate_matching() -> MatchPolicy {
    MatchPolicy::exact()
}

fn default_interference_secs() -> u64 {
    DEFAULT_INTERFERENCE_SECS
}

fn default_free_recall_secs() -> u64 {
    DEFAULT_FREE_RECALL_SECS
}

impl Default for RemindfulConfig {
    fn default() -> Self {
        Self {
            vocabulary_dir: default_vocabulary_dir(),
            output_dir: default_output_dir(),
            subject: None,
            learning_matching: MatchPolicy::default(),
            immediate_matching: default_immediate_matching(),
            interference_secs: default_interference_secs(),
            free_recall_secs: default_free_recall_secs(),
        }
    }
}

impl RemindfulConfig {
    /// Where administration history is kept.
    pub fn history_path(&self) -> PathBuf {
        self.output_dir.join("history.json")
    }

    /// Session parameters drawn from this configuration.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            learning_matching: self.learning_matching,
            immediate_matching: self.immediate_matching,
            interference_secs: self.interference_secs,
            free_recall_secs: self.free_recall_secs,
            subject: self.subject.clone(),
            ..SessionConfig::default()
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `remindful.toml` in the current directory
/// 2. `~/.config/remindful/config.toml`
///
/// Environment variable overrides: `REMINDFUL_VOCABULARY_DIR`,
/// `REMINDFUL_OUTPUT_DIR`, `REMINDFUL_SUBJECT`, `REMINDFUL_MATCHING`,
/// `REMINDFUL_THRESHOLD`, `REMINDFUL_INTERFERENCE_SECS`,
/// `REMINDFUL_FREE_RECALL_SECS`.
pub fn load_config() -> Result<RemindfulConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<RemindfulConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("remindful.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<RemindfulConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => RemindfulConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dir) = std::env::var("REMINDFUL_VOCABULARY_DIR") {
        config.vocabulary_dir = PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("REMINDFUL_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    if let Ok(subject) = std::env::var("REMINDFUL_SUBJECT") {
        config.subject = Some(subject);
    }
    if let Ok(raw) = std::env::var("REMINDFUL_MATCHING") {
        match raw.parse::<MatchMode>() {
            Ok(mode) => config.learning_matching.mode = mode,
            Err(e) => tracing::warn!("ignoring REMINDFUL_MATCHING: {e}"),
        }
    }
    if let Ok(raw) = std::env::var("REMINDFUL_THRESHOLD") {
        match raw.parse::<u8>() {
            Ok(threshold) => config.learning_matching.threshold = threshold,
            Err(e) => tracing::warn!("ignoring REMINDFUL_THRESHOLD: {e}"),
        }
    }
    if let Ok(raw) = std::env::var("REMINDFUL_INTERFERENCE_SECS") {
        match raw.parse::<u64>() {
            Ok(secs) => config.interference_secs = secs,
            Err(e) => tracing::warn!("ignoring REMINDFUL_INTERFERENCE_SECS: {e}"),
        }
    }
    if let Ok(raw) = std::env::var("REMINDFUL_FREE_RECALL_SECS") {
        match raw.parse::<u64>() {
            Ok(secs) => config.free_recall_secs = secs,
            Err(e) => tracing::warn!("ignoring REMINDFUL_FREE_RECALL_SECS: {e}"),
        }
    }

    // Resolve env vars in path and subject values
    config.vocabulary_dir = resolve_path(&config.vocabulary_dir);
    config.output_dir = resolve_path(&config.output_dir);
    config.subject = config.subject.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("remindful"))
}
