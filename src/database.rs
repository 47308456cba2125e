//! Cached mod database of a game
//!
//! The cache is a pretty-printed JSON list of [`Mod`] records. It is only
//! ever replaced as a whole by [`update`].

use std::fs;
use std::path::Path;

use crate::context::TaskContext;
use crate::error::{Error, Result};
use crate::games::Game;
use crate::github::latest_release_version;
use crate::http::Fetcher;
use crate::logging::{log_action, log_warning};
use crate::mods::{Mod, ModGraph};
use crate::sources;

/// Summary of a database update
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Mods written to the cache
    pub saved: usize,
    pub failed_sources: Vec<String>,
    /// Mods whose latest version could not be determined
    pub failed_mods: Vec<String>,
}

/// Read the cache file as a list of mods
pub fn read(path: &Path) -> Result<Vec<Mod>> {
    if !path.is_file() {
        return Err(Error::DatabaseMissing(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let corrupt = |reason: String| Error::DatabaseCorrupt {
        path: path.to_path_buf(),
        reason,
    };
    let mods: Vec<Mod> = serde_json::from_str(&text).map_err(|e| corrupt(e.to_string()))?;
    for m in &mods {
        m.check_file_names().map_err(corrupt)?;
    }
    Ok(mods)
}

/// Load the cached database of `game` into a graph
pub fn load(game: &Game) -> Result<ModGraph> {
    read(&game.paths.database_file).map(ModGraph::new)
}

/// Overwrite the cache file with `mods`
pub fn save(path: &Path, mods: &[Mod]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(mods)?;
    fs::write(path, json).map_err(|e| Error::io(path, e))
}

/// Fetch every source of `game`, look up each mod's latest version and
/// replace the cache with the result
pub fn update(game: &Game, fetcher: &dyn Fetcher, ctx: &TaskContext) -> Result<UpdateReport> {
    ctx.info("Fetching mods database(s)...");
    let fetched = sources::fetch_all(fetcher, &game.mod_sources, ctx);
    if fetched.skipped_records > 0 {
        ctx.warning(format!("{} malformed mod record(s) were skipped.", fetched.skipped_records));
    }

    ctx.info("Fetching mods versions...");
    let total = fetched.descriptors.len();
    let mut mods = Vec::with_capacity(total);
    let mut failed_mods = Vec::new();
    for (i, descriptor) in fetched.descriptors.into_iter().enumerate() {
        ctx.progress(i + 1, total, descriptor.name.as_str());
        match latest_release_version(fetcher, &descriptor.name, &descriptor.repository()) {
            Ok(version) => mods.push(descriptor.into_mod(version)),
            Err(e) => {
                log_warning(&e.to_string());
                ctx.warning(e.to_string());
                failed_mods.push(descriptor.name);
            }
        }
    }

    save(&game.paths.database_file, &mods)?;
    log_action(&format!(
        "Saved {} mods to {}",
        mods.len(),
        game.paths.database_file.display()
    ));
    ctx.success(format!("{} mod(s) saved to the database.", mods.len()));

    Ok(UpdateReport {
        saved: mods.len(),
        failed_sources: fetched.failed_sources,
        failed_mods,
    })
}
