//! Error types shared by every blasmod operation
//!
//! Two variants are not failures: `AlreadyDone` ("nothing to do") and
//! `Cancelled` (the user declined a confirmation). The dispatcher reports
//! them with exit code 0.

use std::path::PathBuf;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed version string
    #[error("invalid version number '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// No cached mod database for the game
    #[error("mod database file not found at '{}'. Make sure to run the update command first.", .0.display())]
    DatabaseMissing(PathBuf),

    /// The cached mod database exists but could not be read back
    #[error("mod database '{}' is malformed: {reason}", .path.display())]
    DatabaseCorrupt { path: PathBuf, reason: String },

    /// The latest release of a mod could not be determined
    #[error("unable to look up the latest version of '{name}': {reason}")]
    VersionLookup { name: String, reason: String },

    /// None of the release archive naming conventions matched
    #[error("no release archive found for '{name}' {version}")]
    ArchiveNotFound { name: String, version: String },

    /// One or more archives failed to download during an install
    #[error("failed to download dependencies: {}", .mods.join(", "))]
    DependencyDownload { mods: Vec<String> },

    /// The mod has no archive in the mods directory
    #[error("mod '{0}' is not installed")]
    ModNotInstalled(String),

    /// The mod reports as activated but its plugin file is gone
    #[error("the mod's plugin file was not found: {}", .0.display())]
    PluginFileMissing(PathBuf),

    /// Name not present in the loaded mod table
    #[error("no mod named '{0}' found")]
    UnknownMod(String),

    /// Installed mods still depend on the mod being removed
    #[error("'{name}' is still required by: {}", .dependents.join(", "))]
    DependentsInstalled { name: String, dependents: Vec<String> },

    /// Nothing to do
    #[error("{0}")]
    AlreadyDone(String),

    /// User declined a confirmation
    #[error("{0}")]
    Cancelled(String),

    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("io error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable name printed before the message at the command boundary
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse { .. } => "ParseError",
            Error::DatabaseMissing(_) => "DatabaseMissingError",
            Error::DatabaseCorrupt { .. } => "DatabaseCorruptError",
            Error::VersionLookup { .. } => "VersionLookupError",
            Error::ArchiveNotFound { .. } => "ArchiveNotFoundError",
            Error::DependencyDownload { .. } => "DependencyDownloadError",
            Error::ModNotInstalled(_) => "ModNotInstalledError",
            Error::PluginFileMissing(_) => "PluginFileMissingError",
            Error::UnknownMod(_) => "UnknownModError",
            Error::DependentsInstalled { .. } => "DependentsInstalledError",
            Error::AlreadyDone(_) => "AlreadyDoneError",
            Error::Cancelled(_) => "CancelledError",
            Error::Http { .. } => "HttpError",
            Error::Io { .. } => "IoError",
            Error::Zip(_) => "ZipError",
            Error::Json(_) => "JsonError",
            Error::Config(_) => "ConfigError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_error_lists_every_mod() {
        let err = Error::DependencyDownload {
            mods: vec!["Modding API".to_string(), "Randomizer".to_string()],
        };
        assert_eq!(err.kind(), "DependencyDownloadError");
        assert_eq!(
            err.to_string(),
            "failed to download dependencies: Modding API, Randomizer"
        );
    }
}
