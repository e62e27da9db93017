use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level application configuration. Every key is optional; command-line
/// flags win over anything set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default `--hub` for `gitpull link`.
    pub hub_url: Option<String>,
    /// Default application to open after the pull.
    pub app: Option<String>,
    /// Default hub for Binder links.
    pub binder_url: Option<String>,
    pub sync: SyncConfig,
}

/// Defaults for `gitpull sync`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Notebook server base URL.
    pub base_url: Option<String>,
    /// Give up when the pull has not ended after this many seconds.
    pub timeout_secs: Option<u64>,
    /// Print notices line by line instead of opening the terminal view.
    pub plain: bool,
}

pub const DEFAULT_BINDER_URL: &str = "https://mybinder.org";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8888/";

impl AppConfig {
    pub fn binder_url(&self) -> &str {
        self.binder_url.as_deref().unwrap_or(DEFAULT_BINDER_URL)
    }

    pub fn base_url(&self) -> &str {
        self.sync.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// Config file path: `~/.config/gitpull/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gitpull").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing or unparsable.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => warn!(
                "failed to parse config at {}, using defaults: {e}",
                path.display()
            ),
        }
    }

    AppConfig::default()
}
