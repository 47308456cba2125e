use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::ToolDirectories;

/// Directory name shared by every game's configuration
pub const CONFIG_DIR_NAME: &str = "blasmod";

// ============================================================================
// Main App Config
// ============================================================================

#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Steam root to use instead of auto-detection
    pub steam_directory: Option<PathBuf>,
    /// Answer "yes" to every confirmation
    pub assume_yes: bool,
    /// User agent sent with every HTTP request
    pub user_agent: Option<String>,
    /// Additional mod sources, keyed by game key (`blasphemous`, `blasphemous2`)
    pub extra_sources: BTreeMap<String, Vec<String>>,
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        ToolDirectories::new(CONFIG_DIR_NAME).config.join("config.toml")
    }

    /// Load the config at `path`, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Extra mod sources configured for `game_key`
    pub fn sources_for(&self, game_key: &str) -> &[String] {
        self.extra_sources
            .get(game_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("blasmod/{}", env!("CARGO_PKG_VERSION")))
    }
}
