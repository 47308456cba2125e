//! Supported games and their filesystem layout
//!
//! A [`GameRegistry`] is built once at startup from the [`AppConfig`] and
//! handed to whatever needs to enumerate games.

pub mod known_games;
pub mod modding_tools;
pub mod steam;

use std::fs;
use std::path::{Path, PathBuf};

use crate::backup;
use crate::config::AppConfig;
use crate::context::TaskContext;
use crate::error::{Error, Result};
use crate::logging::log_action;
use crate::paths::ToolDirectories;

pub use known_games::{KnownGame, SavesLocation, KNOWN_GAMES};
pub use modding_tools::ModdingTools;

// ============================================================================
// Paths
// ============================================================================

/// The `Modding` directory the mod loader reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModdingDirectory {
    pub root: PathBuf,
    pub mods: PathBuf,
    pub plugins: PathBuf,
    pub skins: PathBuf,
}

impl ModdingDirectory {
    pub fn new(game_dir: &Path) -> Self {
        let root = game_dir.join("Modding");
        Self {
            mods: root.join("mods"),
            plugins: root.join("plugins"),
            skins: root.join("skins"),
            root,
        }
    }
}

/// Every location blasmod reads or writes for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePaths {
    /// Game installation directory
    pub install_dir: PathBuf,
    pub modding: ModdingDirectory,
    pub saves_dir: PathBuf,
    pub tool_dirs: ToolDirectories,
    /// Downloaded mod archives (`<name>-<version>.zip`)
    pub mods_dir: PathBuf,
    /// Cached mod database
    pub database_file: PathBuf,
}

impl GamePaths {
    pub fn new(install_dir: PathBuf, saves_dir: PathBuf, tool_dirs: ToolDirectories) -> Self {
        Self {
            modding: ModdingDirectory::new(&install_dir),
            mods_dir: tool_dirs.data.join("mods"),
            database_file: tool_dirs.cache.join("mods.json"),
            install_dir,
            saves_dir,
            tool_dirs,
        }
    }

    /// Derive the paths of `game` from a Steam root
    pub fn discover(game: &KnownGame, steam_root: &Path) -> Self {
        let install_dir = steam::game_install_dir(steam_root, game.steam_folder);
        let tool_dirs = ToolDirectories::new(game.tool_name);
        let saves_dir = match game.saves {
            SavesLocation::XdgConfig(relative) => dirs::config_dir()
                .unwrap_or_else(|| crate::paths::HOME.join(".config"))
                .join(relative),
            SavesLocation::ProtonUser(relative) => {
                steam::proton_drive_c(steam_root, game.steam_app_id)
                    .join("users/steamuser")
                    .join(relative)
            }
        };
        Self::new(install_dir, saves_dir, tool_dirs)
    }
}

// ============================================================================
// Game
// ============================================================================

#[derive(Debug, Clone)]
pub struct Game {
    pub definition: &'static KnownGame,
    pub paths: GamePaths,
    /// Built-in sources followed by the configured ones
    pub mod_sources: Vec<String>,
}

impl Game {
    pub fn new(definition: &'static KnownGame, paths: GamePaths, extra_sources: &[String]) -> Self {
        let mut mod_sources: Vec<String> =
            definition.mod_sources.iter().map(|s| s.to_string()).collect();
        for source in extra_sources {
            if !mod_sources.contains(source) {
                mod_sources.push(source.clone());
            }
        }
        Self {
            definition,
            paths,
            mod_sources,
        }
    }

    pub fn key(&self) -> &'static str {
        self.definition.key
    }

    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    pub fn tool_name(&self) -> &'static str {
        self.definition.tool_name
    }

    pub fn modding_tools(&self) -> ModdingTools {
        ModdingTools::new(self)
    }

    /// Zip the saves directory into `destination`, the working directory by default
    pub fn backup_saves(&self, destination: Option<&Path>, ctx: &TaskContext) -> Result<PathBuf> {
        ctx.info("Backing up saves data...");
        let destination = match destination {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir().map_err(|e| Error::io(".", e))?,
        };
        let prefix = self.name().replace(' ', "");
        let now = chrono::Local::now().naive_local();
        let archive = backup::backup_saves(&self.paths.saves_dir, &destination, &prefix, now)?;
        ctx.success(format!("Saves data backed up at '{}'!", archive.display()));
        Ok(archive)
    }

    /// Delete the whole `Modding` directory, deactivating every mod at once
    pub fn clear_modding_directory(&self, force: bool, ctx: &TaskContext) -> Result<()> {
        let root = &self.paths.modding.root;
        if !root.is_dir() {
            return Err(Error::AlreadyDone("Nothing to delete.".to_string()));
        }

        if !force
            && !ctx.confirm(
                "Are you sure you want to delete the 'Modding' directory? \
                 This will deactivate every mod, and remove current configurations and keybindings.",
                false,
            )
        {
            return Err(Error::Cancelled("Operation cancelled.".to_string()));
        }

        log_action(&format!("Removing {}", root.display()));
        fs::remove_dir_all(root).map_err(|e| Error::io(root, e))?;
        ctx.success("The 'Modding' directory was deleted.");
        Ok(())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Every supported game, resolved against the user's configuration
#[derive(Debug, Clone)]
pub struct GameRegistry {
    games: Vec<Game>,
}

impl GameRegistry {
    pub fn new(config: &AppConfig) -> Self {
        let steam_root = steam::steam_root(config.steam_directory.as_deref());
        let games = KNOWN_GAMES
            .iter()
            .map(|definition| {
                Game::new(
                    definition,
                    GamePaths::discover(definition, &steam_root),
                    config.sources_for(definition.key),
                )
            })
            .collect();
        Self { games }
    }

    pub fn get(&self, key: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.key() == key)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::game_under;
    use super::*;
    use crate::context::TaskContext;

    #[test]
    fn registry_knows_every_game() {
        let config = AppConfig {
            steam_directory: Some(PathBuf::from("/games/Steam")),
            extra_sources: [("blasphemous2".to_string(), vec!["https://example.org/b2.json".to_string()])]
                .into_iter()
                .collect(),
            ..AppConfig::default()
        };
        let registry = GameRegistry::new(&config);
        assert!(KNOWN_GAMES.iter().all(|g| registry.get(g.key).is_some()));
        assert!(registry.get("hollowknight").is_none());

        let b2 = registry.get("blasphemous2").unwrap();
        assert_eq!(
            b2.paths.install_dir,
            PathBuf::from("/games/Steam/steamapps/common/Blasphemous 2")
        );
        assert!(b2.paths.saves_dir.starts_with("/games/Steam/steamapps/compatdata/2114740/pfx"));
        assert_eq!(b2.mod_sources.len(), 2);
        assert_eq!(registry.get("blasphemous").unwrap().mod_sources.len(), 1);
    }

    #[test]
    fn modding_directory_layout() {
        let modding = ModdingDirectory::new(Path::new("/g"));
        assert_eq!(modding.root, PathBuf::from("/g/Modding"));
        assert_eq!(modding.plugins, PathBuf::from("/g/Modding/plugins"));
        assert_eq!(modding.skins, PathBuf::from("/g/Modding/skins"));
    }

    #[test]
    fn clear_missing_directory_is_already_done() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_under(tmp.path());
        let result = game.clear_modding_directory(true, &TaskContext::silent(true));
        assert!(matches!(result, Err(Error::AlreadyDone(_))));
    }

    #[test]
    fn clear_asks_before_deleting() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_under(tmp.path());
        fs::create_dir_all(&game.paths.modding.plugins).unwrap();

        let declined = game.clear_modding_directory(false, &TaskContext::silent(false));
        assert!(matches!(declined, Err(Error::Cancelled(_))));
        assert!(game.paths.modding.root.is_dir());

        game.clear_modding_directory(false, &TaskContext::silent(true)).unwrap();
        assert!(!game.paths.modding.root.exists());
    }

    #[test]
    fn backup_names_archive_after_game() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_under(tmp.path());
        fs::create_dir_all(&game.paths.saves_dir).unwrap();
        fs::write(game.paths.saves_dir.join("savegame_0.save"), "x").unwrap();

        let archive = game.backup_saves(Some(tmp.path()), &TaskContext::silent(true)).unwrap();
        let name = archive.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("BlasphemousSavesBackup_"));
        assert!(archive.is_file());
    }
}
