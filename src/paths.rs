use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// The user's home directory, `.` when it cannot be determined
pub static HOME: LazyLock<PathBuf> =
    LazyLock::new(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));

/// XDG directories owned by one tool (e.g. `blasmodcli`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDirectories {
    pub cache: PathBuf,
    pub config: PathBuf,
    pub data: PathBuf,
    pub state: PathBuf,
}

impl ToolDirectories {
    /// Resolve the XDG base directories for `tool_name`.
    ///
    /// Falls back to the `~/.cache`, `~/.config`, `~/.local/share` and
    /// `~/.local/state` defaults when the platform gives no answer.
    pub fn new(tool_name: &str) -> Self {
        let cache = dirs::cache_dir().unwrap_or_else(|| HOME.join(".cache"));
        let config = dirs::config_dir().unwrap_or_else(|| HOME.join(".config"));
        let data = dirs::data_dir().unwrap_or_else(|| HOME.join(".local/share"));
        let state = dirs::state_dir().unwrap_or_else(|| HOME.join(".local/state"));

        Self {
            cache: cache.join(tool_name),
            config: config.join(tool_name),
            data: data.join(tool_name),
            state: state.join(tool_name),
        }
    }

    /// Lay every directory out under one root (used by tests and portable installs)
    pub fn under(root: &Path) -> Self {
        Self {
            cache: root.join("cache"),
            config: root.join("config"),
            data: root.join("data"),
            state: root.join("state"),
        }
    }
}

/// Create `dir` and its parents if it does not exist yet
pub fn require_dir(dir: &Path) -> Result<&Path> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    Ok(dir)
}
