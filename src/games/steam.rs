//! Steam path detection utilities
//!
//! Locates the Steam installation so game directories and Proton prefixes
//! can be derived from it.

use std::path::{Path, PathBuf};

use crate::logging::{log_info, log_warning};
use crate::paths::HOME;

/// Find the Steam installation path.
///
/// Checks common locations for native, Flatpak, and Snap Steam installs.
/// Returns `None` if Steam is not found.
#[must_use]
pub fn find_steam_path() -> Option<PathBuf> {
    let steam_paths = [
        HOME.join(".local/share/Steam"),
        HOME.join(".steam/steam"),
        HOME.join(".var/app/com.valvesoftware.Steam/.steam/steam"),
        HOME.join("snap/steam/common/.steam/steam"),
    ];

    steam_paths.into_iter().find(|p| p.exists())
}

/// Steam root to use: the configured override, else the detected install,
/// else the default native location (which may not exist).
#[must_use]
pub fn steam_root(configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    match find_steam_path() {
        Some(path) => {
            log_info(&format!("Steam detected at: {}", path.display()));
            path
        }
        None => {
            log_warning("Steam installation not detected, using the default location");
            HOME.join(".local/share/Steam")
        }
    }
}

/// `steamapps/common/<folder>`
pub fn game_install_dir(steam_root: &Path, steam_folder: &str) -> PathBuf {
    steam_root.join("steamapps/common").join(steam_folder)
}

/// `steamapps/compatdata/<app_id>/pfx/drive_c`
pub fn proton_drive_c(steam_root: &Path, app_id: &str) -> PathBuf {
    steam_root
        .join("steamapps/compatdata")
        .join(app_id)
        .join("pfx/drive_c")
}
