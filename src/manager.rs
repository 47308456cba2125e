//! Mod lifecycle operations
//!
//! Install, activate, deactivate, uninstall and upgrade all follow the same
//! pattern: compute a plan with the resolver, report it through the
//! [`TaskContext`], then apply it to the filesystem one mod at a time.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::context::TaskContext;
use crate::database;
use crate::error::{Error, Result};
use crate::games::Game;
use crate::github;
use crate::http::Fetcher;
use crate::logging::{log_action, log_download, log_error, log_install};
use crate::mods::{Mod, ModGraph, ModId, ModState};
use crate::paths::require_dir;
use crate::resolver;
use crate::utils::{extract_zip, remove_file_if_exists};
use crate::version::Version;

/// What to do with dependencies nothing needs anymore after an uninstall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum UnusedDependenciesAction {
    /// Leave them as they are
    Nothing,
    /// Remove their plugin files
    #[default]
    Deactivate,
    /// Remove their plugin files and archives
    Uninstall,
}

/// Everything `info` shows about a mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModInfo {
    pub name: String,
    pub description: String,
    pub authors: Vec<String>,
    pub repository: String,
    pub dependencies: Vec<String>,
    pub release_date: NaiveDate,
    pub version: Version,
    pub installed_version: Option<Version>,
    pub state: ModState,
}

impl ModInfo {
    /// `(label, value)` pairs in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let yes_no = |b: bool| (if b { "Yes" } else { "No" }).to_string();
        vec![
            ("Name", self.name.clone()),
            ("Description", self.description.clone()),
            ("Authors", self.authors.join(", ")),
            ("Repository", self.repository.clone()),
            ("Dependencies", self.dependencies.join(", ")),
            ("Release date", self.release_date.format("%A, %e %B %Y").to_string()),
            ("Version", self.version.to_string()),
            (
                "Installed version",
                self.installed_version
                    .as_ref()
                    .map(Version::to_string)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("Installed", yes_no(self.state >= ModState::Installed)),
            ("Activated", yes_no(self.state == ModState::Activated)),
        ]
    }
}

pub struct ModManager<'a> {
    game: &'a Game,
    graph: ModGraph,
    fetcher: &'a dyn Fetcher,
    ctx: &'a TaskContext,
}

impl<'a> ModManager<'a> {
    pub fn new(game: &'a Game, graph: ModGraph, fetcher: &'a dyn Fetcher, ctx: &'a TaskContext) -> Self {
        Self {
            game,
            graph,
            fetcher,
            ctx,
        }
    }

    /// Manager over the cached database of `game`
    pub fn load(game: &'a Game, fetcher: &'a dyn Fetcher, ctx: &'a TaskContext) -> Result<Self> {
        let graph = database::load(game)?;
        Ok(Self::new(game, graph, fetcher, ctx))
    }

    pub fn graph(&self) -> &ModGraph {
        &self.graph
    }

    pub fn state(&self, id: ModId) -> ModState {
        self.graph.get(id).state(&self.game.paths)
    }

    fn name(&self, id: ModId) -> &str {
        &self.graph.get(id).name
    }

    /// The mod of `id`, refusing names that lead outside the game directories
    fn checked(&self, id: ModId) -> Result<&Mod> {
        let m = self.graph.get(id);
        m.check_file_names().map_err(|reason| Error::DatabaseCorrupt {
            path: self.game.paths.database_file.clone(),
            reason,
        })?;
        Ok(m)
    }

    fn names(&self, ids: &[ModId]) -> Vec<String> {
        ids.iter().map(|&id| self.name(id).to_string()).collect()
    }

    // ========================================================================
    // Install
    // ========================================================================

    /// Download `name` and every dependency that is not installed yet
    pub fn install(&self, name: &str, activate_after: bool, force: bool) -> Result<()> {
        let root = self.graph.id(name)?;
        require_dir(&self.game.paths.mods_dir)?;

        self.ctx.info("Resolving dependencies...");
        let mut plan = resolver::resolve(&self.graph, root, ModState::None, |id| self.state(id))?;
        if force && !plan.contains(&root) {
            plan.push(root);
        }

        if plan.is_empty() {
            self.ctx.success("Every dependency is already installed!");
        } else {
            self.ctx.info("Mods to install:");
            for &id in &plan {
                self.ctx.info(format!("    - {}", self.graph.get(id)));
            }
            if !self.ctx.confirm("Do you want to continue the installation?", true) {
                return Err(Error::Cancelled("Installation cancelled.".to_string()));
            }

            self.download_all(&plan)?;
            self.ctx.success("Dependencies successfully installed!");
        }

        if activate_after {
            self.activate(name, force, true)?;
        }
        Ok(())
    }

    /// Download every archive of `plan`, collecting failures instead of
    /// stopping at the first one
    fn download_all(&self, plan: &[ModId]) -> Result<()> {
        let total = plan.len();
        let mut failed = Vec::new();
        for (i, &id) in plan.iter().enumerate() {
            self.ctx.progress(i + 1, total, format!("Downloading {}...", self.name(id)));
            if let Err(e) = self.download_archive(id) {
                log_error(&format!("Download of '{}' failed: {}", self.name(id), e));
                self.ctx.failure(format!("{}: {}", self.name(id), e));
                failed.push(self.name(id).to_string());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::DependencyDownload { mods: failed })
        }
    }

    /// Download the cached version of a mod into the mods directory and drop
    /// archives of any other version
    pub fn download_archive(&self, id: ModId) -> Result<PathBuf> {
        let m = self.checked(id)?;
        let mods_dir = &self.game.paths.mods_dir;
        let url = github::release_archive_url(self.fetcher, &m.name, &m.repository, &m.version)?;

        let target = m.archive_path(mods_dir);
        let partial = target.with_extension("zip.part");
        if let Err(e) = self.fetcher.download(&url, &partial) {
            let _ = remove_file_if_exists(&partial);
            return Err(e);
        }
        fs::rename(&partial, &target).map_err(|e| Error::io(&target, e))?;
        log_download(&format!("{} {} saved to {}", m.name, m.version, target.display()));

        for (path, version) in m.installed_archives(mods_dir) {
            if version != m.version {
                remove_file_if_exists(&path)?;
            }
        }
        Ok(target)
    }

    // ========================================================================
    // Activate / deactivate
    // ========================================================================

    /// Extract `name`, and with `recursive` every dependency not active yet
    pub fn activate(&self, name: &str, reactivate: bool, recursive: bool) -> Result<()> {
        let root = self.graph.id(name)?;

        let mut plan = if recursive {
            resolver::resolve(&self.graph, root, ModState::Installed, |id| self.state(id))?
        } else {
            vec![root]
        };
        if reactivate && !plan.contains(&root) {
            plan.push(root);
        }

        if plan.is_empty() {
            self.ctx.info(format!("Mod '{}' is already activated.", name));
            return Ok(());
        }

        let total = plan.len();
        for (i, &id) in plan.iter().enumerate() {
            self.ctx.progress(i + 1, total, format!("Activating mod '{}'", self.name(id)));
            if let Err(e) = self.unpack(id, reactivate) {
                self.ctx.failure(format!("Unable to activate '{}'", self.name(id)));
                return Err(e);
            }
        }
        Ok(())
    }

    /// Extract the installed archive of a mod into the `Modding` directory.
    /// Returns `false` when it was already active and `reactivate` is off.
    pub fn unpack(&self, id: ModId, reactivate: bool) -> Result<bool> {
        let m = self.checked(id)?;
        let paths = &self.game.paths;
        if m.is_activated(paths) && !reactivate {
            return Ok(false);
        }

        let (archive, version) = m
            .installed_archive(&paths.mods_dir)
            .ok_or_else(|| Error::ModNotInstalled(m.name.clone()))?;
        extract_zip(&archive, &paths.modding.root)?;
        log_install(&format!("Activated {} {}", m.name, version));
        Ok(true)
    }

    /// Remove the plugin file of `name`.
    ///
    /// With `recursive`, activated mods depending on it are deactivated too,
    /// as are its dependencies no other activated mod needs.
    pub fn deactivate(&self, name: &str, recursive: bool) -> Result<()> {
        let root = self.graph.id(name)?;
        let root_active = self.state(root) == ModState::Activated;

        if !recursive {
            if !root_active {
                return Err(Error::AlreadyDone("This mod was not activated.".to_string()));
            }
            self.ctx.progress(1, 1, format!("Deactivating mod '{}'", name));
            return self.remove_plugin(root);
        }

        let mut plan: Vec<ModId> = resolver::dependents(&self.graph, root)
            .into_iter()
            .filter(|&id| self.state(id) == ModState::Activated)
            .rev()
            .collect();
        if root_active {
            plan.push(root);
        }
        if plan.is_empty() {
            return Err(Error::AlreadyDone("This mod was not activated.".to_string()));
        }

        let removed = plan.clone();
        plan.extend(resolver::unused_dependencies(
            &self.graph,
            &removed,
            ModState::Activated,
            |id| self.state(id),
        ));

        let total = plan.len();
        for (i, &id) in plan.iter().enumerate() {
            self.ctx.progress(i + 1, total, format!("Deactivating mod '{}'", self.name(id)));
            self.remove_plugin(id)?;
        }
        Ok(())
    }

    /// Delete the plugin file of a mod. Callers only pass activated mods, so
    /// a missing file means it was removed behind our back.
    fn remove_plugin(&self, id: ModId) -> Result<()> {
        let path = self.checked(id)?.plugin_path(&self.game.paths.modding);
        if !remove_file_if_exists(&path)? {
            return Err(Error::PluginFileMissing(path));
        }
        log_action(&format!("Deactivated {}", self.name(id)));
        Ok(())
    }

    fn remove_archives(&self, id: ModId) -> Result<()> {
        for (path, _) in self.checked(id)?.installed_archives(&self.game.paths.mods_dir) {
            remove_file_if_exists(&path)?;
        }
        log_action(&format!("Uninstalled {}", self.name(id)));
        Ok(())
    }

    // ========================================================================
    // Uninstall / upgrade
    // ========================================================================

    /// Delete every archive of `name`, then apply `action` to the
    /// dependencies it leaves unused.
    ///
    /// Files extracted by the mod other than its plugin stay in place.
    pub fn uninstall(&self, name: &str, action: UnusedDependenciesAction) -> Result<()> {
        let root = self.graph.id(name)?;
        if self.state(root) == ModState::None {
            return Err(Error::ModNotInstalled(name.to_string()));
        }

        let blocking: Vec<ModId> = resolver::dependents(&self.graph, root)
            .into_iter()
            .filter(|&id| self.state(id) >= ModState::Installed)
            .collect();
        if !blocking.is_empty() {
            return Err(Error::DependentsInstalled {
                name: name.to_string(),
                dependents: self.names(&blocking),
            });
        }

        if !self.ctx.confirm(&format!("Do you want to uninstall '{}'?", name), true) {
            return Err(Error::Cancelled("Uninstallation cancelled.".to_string()));
        }

        if self.state(root) == ModState::Activated {
            self.remove_plugin(root)?;
        }
        self.remove_archives(root)?;
        self.ctx.success(format!("Mod '{}' uninstalled.", name));

        let floor = match action {
            UnusedDependenciesAction::Nothing => return Ok(()),
            UnusedDependenciesAction::Deactivate => ModState::Activated,
            UnusedDependenciesAction::Uninstall => ModState::Installed,
        };
        let unused = resolver::unused_dependencies(&self.graph, &[root], floor, |id| self.state(id));
        let total = unused.len();
        for (i, &id) in unused.iter().enumerate() {
            self.ctx.progress(i + 1, total, format!("Removing unused dependency '{}'", self.name(id)));
            if self.state(id) == ModState::Activated {
                self.remove_plugin(id)?;
            }
            if action == UnusedDependenciesAction::Uninstall {
                self.remove_archives(id)?;
            }
        }
        Ok(())
    }

    /// Download the cached version of installed mods that are behind it.
    /// Activated mods are extracted again. Returns the upgraded mods.
    pub fn upgrade(&self, name: Option<&str>) -> Result<Vec<String>> {
        let mods_dir = &self.game.paths.mods_dir;
        let outdated: Vec<ModId> = match name {
            Some(name) => {
                let id = self.graph.id(name)?;
                if self.state(id) == ModState::None {
                    return Err(Error::ModNotInstalled(name.to_string()));
                }
                if !self.graph.get(id).is_outdated(mods_dir) {
                    return Err(Error::AlreadyDone(format!("Mod '{}' is already up to date.", name)));
                }
                vec![id]
            }
            None => self
                .graph
                .iter()
                .filter(|(_, m)| m.is_outdated(mods_dir))
                .map(|(id, _)| id)
                .collect(),
        };
        if outdated.is_empty() {
            return Err(Error::AlreadyDone("Every installed mod is up to date.".to_string()));
        }

        self.ctx.info("Mods to upgrade:");
        for &id in &outdated {
            let m = self.graph.get(id);
            let installed = m.installed_version(mods_dir).map(|v| v.to_string()).unwrap_or_default();
            self.ctx.info(format!("    - {} {} -> {}", m.name, installed, m.version));
        }
        if !self.ctx.confirm("Do you want to continue the upgrade?", true) {
            return Err(Error::Cancelled("Upgrade cancelled.".to_string()));
        }

        let was_active: Vec<bool> = outdated
            .iter()
            .map(|&id| self.state(id) == ModState::Activated)
            .collect();
        self.download_all(&outdated)?;
        for (&id, active) in outdated.iter().zip(was_active) {
            if active {
                self.unpack(id, true)?;
            }
        }

        self.ctx.success("Mods successfully upgraded!");
        Ok(self.names(&outdated))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Mods at or above `floor`, in database order
    pub fn list(&self, floor: ModState) -> Vec<&Mod> {
        self.graph
            .iter()
            .filter(|&(id, _)| self.state(id) >= floor)
            .map(|(_, m)| m)
            .collect()
    }

    /// Mods whose name or description contains any of `terms`
    pub fn search(&self, terms: &[String]) -> Vec<&Mod> {
        self.graph
            .mods()
            .filter(|m| terms.iter().any(|term| m.matches(term)))
            .collect()
    }

    pub fn info(&self, name: &str) -> Result<ModInfo> {
        let id = self.graph.id(name)?;
        let m = self.graph.get(id);
        let dependencies = self.names(&self.graph.dependency_ids(id)?);

        Ok(ModInfo {
            name: m.name.clone(),
            description: m.description.clone(),
            authors: m.authors.clone(),
            repository: m.repository.clone(),
            dependencies,
            release_date: m.release_date,
            version: m.version.clone(),
            installed_version: m.installed_version(&self.game.paths.mods_dir),
            state: self.state(id),
        })
    }
}
