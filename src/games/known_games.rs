//! Known games configuration
//!
//! Contains metadata for the games blasmod supports, including:
//! - Steam App ID and `steamapps/common` folder
//! - Mod loader and modding tools repository
//! - Whether the game runs natively or through Proton
//! - Where the game keeps its saves
//! - Built-in mod sources

/// Repository publishing the official mod lists
pub const MODDING_INSTALLER_REPOSITORY: &str = "https://github.com/BrandenEK/Blasphemous.Modding.Installer";

/// Where a game stores its save files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavesLocation {
    /// Relative to the XDG config directory (native Linux builds)
    XdgConfig(&'static str),
    /// Relative to `drive_c/users/steamuser` inside the game's Proton prefix
    ProtonUser(&'static str),
}

/// Configuration for a known game
#[derive(Debug, Clone)]
pub struct KnownGame {
    /// Key used on the command line
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// Name of the tool, also used for its XDG directories
    pub tool_name: &'static str,
    /// Mod loader shipped by the modding tools (folder name in the game directory)
    pub mod_loader: &'static str,
    /// Steam App ID
    pub steam_app_id: &'static str,
    /// Expected folder name in steamapps/common/
    pub steam_folder: &'static str,
    /// Linux build (true) or Windows build under Proton (false)
    pub is_native: bool,
    /// Repository hosting the modding tools archives
    pub modding_tools_repository: &'static str,
    /// Launcher script shipped with the modding tools (made executable after extraction)
    pub launcher_script: Option<&'static str>,
    pub saves: SavesLocation,
    /// Built-in mod sources
    pub mod_sources: &'static [&'static str],
}

/// All known games that blasmod supports
pub const KNOWN_GAMES: &[KnownGame] = &[
    KnownGame {
        key: "blasphemous",
        name: "Blasphemous",
        tool_name: "blasmodcli",
        mod_loader: "BepInEx",
        steam_app_id: "774361",
        steam_folder: "Blasphemous",
        is_native: true,
        modding_tools_repository: "https://github.com/BrandenEK/Blasphemous.ModdingTools",
        launcher_script: Some("run_bepinex.sh"),
        saves: SavesLocation::XdgConfig("unity3d/TheGameKitchen/Blasphemous/Savegames"),
        mod_sources: &[
            "https://github.com/BrandenEK/Blasphemous.Modding.Installer/raw/main/BlasphemousMods.json",
        ],
    },
    KnownGame {
        key: "blasphemous2",
        name: "Blasphemous 2",
        tool_name: "blas2modcli",
        mod_loader: "MelonLoader",
        steam_app_id: "2114740",
        steam_folder: "Blasphemous 2",
        is_native: false,
        modding_tools_repository: "https://github.com/BrandenEK/BlasII.ModdingTools",
        launcher_script: None,
        saves: SavesLocation::ProtonUser("AppData/LocalLow/The Game Kitchen/Blasphemous 2"),
        mod_sources: &[
            "https://github.com/BrandenEK/Blasphemous.Modding.Installer/raw/main/BlasphemousIIMods.json",
        ],
    },
];

/// Command-line keys of every known game
pub fn keys() -> impl Iterator<Item = &'static str> {
    KNOWN_GAMES.iter().map(|g| g.key)
}
