//! Modding tools (mod loader bundle) for a game
//!
//! The tools are a single archive extracted directly into the game
//! directory. Their version is tracked in a plain text file next to the
//! downloaded mods.

use std::fs;
use std::path::PathBuf;

use super::Game;
use crate::context::TaskContext;
use crate::error::{Error, Result};
use crate::github::raw_url;
use crate::http::Fetcher;
use crate::logging::{log_info, log_install, log_warning};
use crate::utils::extract_zip;
use crate::version::Version;

const EXTRACTION_NOTICE: &str = "IMPORTANT NOTICE
    The modding tools is an archive containing files, that will be
    extracted directly inside the game's directory.
    This procedure should not fail, and should not replace any of the game's file.

    HOWEVER, THE AUTHOR AND THE CONTRIBUTORS OF THIS TOOL DENY ALL RESPONSIBILITY
    IF THE GAME OR YOUR PROGRESSION IS DAMAGED IN ANYWAY DURING THIS PROCEDURE.

    If the game does not start after this step, try following the steps here:
    https://github.com/BrandenEK/Blasphemous.Modding.Installer
    If neither work, uninstall then reinstall your game.

    IN ANY CASE, WE RECOMMEND YOU TO BACKUP YOUR SAVE FILES.";

/// Outcome of comparing the local tools version with the published one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolsStatus {
    UpToDate(Version),
    UpdateAvailable { current: Version, latest: Version },
    /// Tools present but installed without a version file
    NoVersionInfo { latest: Version },
    NotInstalled { latest: Version },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModdingTools {
    /// Directory the mod loader creates in the game directory
    pub loader_dir: PathBuf,
    pub archive_url: String,
    pub archive_file: PathBuf,
    pub version_url: String,
    pub version_file: PathBuf,
}

impl ModdingTools {
    pub fn new(game: &Game) -> Self {
        let definition = game.definition;
        let platform = if definition.is_native { "linux" } else { "windows" };
        let stem = format!("modding-tools-{}", platform);
        let repository = definition.modding_tools_repository;
        let tool_dirs = &game.paths.tool_dirs;

        Self {
            loader_dir: game.paths.install_dir.join(definition.mod_loader),
            archive_url: raw_url(repository, &format!("{}.zip", stem)),
            archive_file: tool_dirs.cache.join("modding-tools.zip"),
            version_url: raw_url(repository, &format!("{}.version", stem)),
            version_file: tool_dirs.data.join(format!("{}.version", stem)),
        }
    }

    pub fn are_installed(&self) -> bool {
        self.loader_dir.is_dir()
    }

    /// Version recorded at the last `configure`, if any
    pub fn current_version(&self) -> Result<Option<Version>> {
        if !self.version_file.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.version_file).map_err(|e| Error::io(&self.version_file, e))?;
        Version::parse(text.trim()).map(Some)
    }

    pub fn latest_version(&self, fetcher: &dyn Fetcher) -> Result<Version> {
        let text = fetcher.get_text(&self.version_url).map_err(|e| Error::VersionLookup {
            name: "modding tools".to_string(),
            reason: e.to_string(),
        })?;
        Version::parse(text.trim())
    }

    pub fn status(&self, fetcher: &dyn Fetcher) -> Result<ToolsStatus> {
        let latest = self.latest_version(fetcher)?;
        let status = match self.current_version()? {
            Some(current) if current < latest => ToolsStatus::UpdateAvailable { current, latest },
            Some(current) => ToolsStatus::UpToDate(current),
            None if self.are_installed() => ToolsStatus::NoVersionInfo { latest },
            None => ToolsStatus::NotInstalled { latest },
        };
        Ok(status)
    }

    /// Check the published version and tell the user what to do about it
    pub fn check_for_update(&self, fetcher: &dyn Fetcher, ctx: &TaskContext) -> Result<ToolsStatus> {
        ctx.info("Fetching latest modding tools version...");
        let status = self.status(fetcher)?;
        match &status {
            ToolsStatus::UpToDate(version) => {
                ctx.success(format!("Modding tools are up to date ({}).", version));
            }
            ToolsStatus::UpdateAvailable { current, latest } => ctx.info(format!(
                "An update for the modding tools is available ({} -> {})! \
                 Download it now by running the configure command.",
                current, latest
            )),
            ToolsStatus::NoVersionInfo { .. } => ctx.warning(
                "The currently installed modding tools don't have version information. \
                 To make sure it is up to date, run the configure command.",
            ),
            ToolsStatus::NotInstalled { .. } => ctx.info(
                "You don't have the modding tools installed, you need them to run mods on your game. \
                 To install the modding tools, run the configure command.",
            ),
        }
        Ok(status)
    }

    /// Download and extract the latest tools into the game directory
    pub fn configure(&self, game: &Game, fetcher: &dyn Fetcher, ctx: &TaskContext) -> Result<Version> {
        let latest = self.latest_version(fetcher)?;
        let up_to_date = self.current_version()?.is_some_and(|current| current >= latest);
        if game.paths.modding.root.is_dir() && self.are_installed() && up_to_date {
            return Err(Error::AlreadyDone("Modding tools are already up to date.".to_string()));
        }

        ctx.info("Downloading the modding tools...");
        fetcher.download(&self.archive_url, &self.archive_file)?;

        ctx.failure(EXTRACTION_NOTICE);
        if ctx.confirm(
            "Would you like to backup your saves before hand? \
             You can also backup your saves directly from Steam.",
            false,
        ) {
            match game.backup_saves(None, ctx) {
                Ok(_) => {}
                Err(e) => {
                    log_warning(&format!("Saves backup failed: {}", e));
                    ctx.warning(format!("Unable to back up the saves: {}", e));
                }
            }
        }
        if !ctx.confirm("Would you like to proceed to the extraction?", false) {
            return Err(Error::Cancelled("Installation process cancelled.".to_string()));
        }

        ctx.info("Extracting modding tools...");
        extract_zip(&self.archive_file, &game.paths.install_dir)?;
        log_install(&format!("Modding tools {} extracted to {}", latest, game.paths.install_dir.display()));

        if let Some(script) = game.definition.launcher_script {
            make_executable(&game.paths.install_dir.join(script))?;
        }

        if let Some(parent) = self.version_file.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&self.version_file, latest.to_string()).map_err(|e| Error::io(&self.version_file, e))?;

        ctx.success("Modding tools successfully installed!");
        Ok(latest)
    }
}

#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if !path.is_file() {
        log_info(&format!("No launcher script at {}", path.display()));
        return Ok(());
    }
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::game_under;
    use crate::http::mock::MockFetcher;
    use crate::utils::testing::zip_bytes;

    const VERSION_URL: &str =
        "https://github.com/BrandenEK/Blasphemous.ModdingTools/raw/main/modding-tools-linux.version";
    const ARCHIVE_URL: &str =
        "https://github.com/BrandenEK/Blasphemous.ModdingTools/raw/main/modding-tools-linux.zip";

    fn tools_fetcher(version: &str) -> MockFetcher {
        MockFetcher::new().with_body(VERSION_URL, format!("{}\n", version)).with_body(
            ARCHIVE_URL,
            zip_bytes(&[
                ("BepInEx/core/BepInEx.dll", "loader"),
                ("Modding/plugins/ModdingAPI.dll", "api"),
                ("run_bepinex.sh", "#!/bin/sh"),
            ]),
        )
    }

    #[test]
    fn urls_follow_platform() {
        let tmp = tempfile::tempdir().unwrap();
        let tools = game_under(tmp.path()).modding_tools();
        assert_eq!(tools.archive_url, ARCHIVE_URL);
        assert_eq!(tools.version_url, VERSION_URL);
        assert!(tools.version_file.ends_with("modding-tools-linux.version"));
        assert!(tools.loader_dir.ends_with("Blasphemous/BepInEx"));
    }

    #[test]
    fn status_reports_every_case() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_under(tmp.path());
        let tools = game.modding_tools();
        let fetcher = tools_fetcher("1.2.0");

        assert!(matches!(tools.status(&fetcher).unwrap(), ToolsStatus::NotInstalled { .. }));

        fs::create_dir_all(&tools.loader_dir).unwrap();
        assert!(matches!(tools.status(&fetcher).unwrap(), ToolsStatus::NoVersionInfo { .. }));

        fs::create_dir_all(tools.version_file.parent().unwrap()).unwrap();
        fs::write(&tools.version_file, "1.1.0").unwrap();
        assert_eq!(
            tools.status(&fetcher).unwrap(),
            ToolsStatus::UpdateAvailable {
                current: Version::new(1, 1, 0),
                latest: Version::new(1, 2, 0)
            }
        );

        fs::write(&tools.version_file, "1.2.0").unwrap();
        assert_eq!(tools.status(&fetcher).unwrap(), ToolsStatus::UpToDate(Version::new(1, 2, 0)));
    }

    #[test]
    fn configure_extracts_and_records_version() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_under(tmp.path());
        fs::create_dir_all(&game.paths.install_dir).unwrap();
        let tools = game.modding_tools();
        let fetcher = tools_fetcher("1.2.0");

        let (ctx, lines) = TaskContext::recording(false);
        let declined = tools.configure(&game, &fetcher, &ctx);
        assert!(matches!(declined, Err(Error::Cancelled(_))));
        assert!(!tools.are_installed());
        assert!(lines.lock().iter().any(|l| l.starts_with("Failure: IMPORTANT NOTICE")));

        let mut ctx = TaskContext::silent(false);
        ctx.assume_yes = true;
        // Saves backup is attempted but no saves exist, which only warns
        let version = tools.configure(&game, &fetcher, &ctx).unwrap();
        assert_eq!(version, Version::new(1, 2, 0));
        assert!(tools.are_installed());
        assert_eq!(tools.current_version().unwrap(), Some(Version::new(1, 2, 0)));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(game.paths.install_dir.join("run_bepinex.sh"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        let again = tools.configure(&game, &fetcher, &ctx);
        assert!(matches!(again, Err(Error::AlreadyDone(_))));
    }
}
