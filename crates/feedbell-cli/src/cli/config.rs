use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use feedbell_core::CoreConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration that can be loaded from a JSON file.
/// Core settings sit at the top level next to the session fields.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    #[serde(flatten)]
    pub core: CoreConfig,

    /// Bearer token for the notification API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Identity the session is started for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// `~/.config/feedbell/config.json` (or the platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("feedbell").join("config.json"))
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Explicit path if given, otherwise the default location if it exists,
    /// otherwise built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Apply `FEEDBELL_*` environment overrides
    pub fn apply_env(mut self) -> Self {
        self.core = self.core.apply_env();
        self.with_token(std::env::var("FEEDBELL_TOKEN").ok())
    }

    /// Replace the token when an override is present and non-empty
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    pub fn require_user_id(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .context("No userId configured. Set \"userId\" in the config file or pass --user.")
    }
}
