//! Mod metadata and local state
//!
//! A [`Mod`] is a read-only view of the cached metadata. Whether it is
//! installed or activated is never stored: it is read from the filesystem
//! (archive in the mods directory, plugin file in the `Modding` directory).

pub mod graph;

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::games::{GamePaths, ModdingDirectory};
use crate::version::Version;

pub use graph::{ModGraph, ModId};

/// Canonical separator between authors in the remote descriptors
pub const AUTHORS_SEPARATOR: &str = " && ";

/// Lifecycle state of a mod, ordered `None < Installed < Activated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ModState {
    #[default]
    None,
    Installed,
    Activated,
}

impl fmt::Display for ModState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModState::None => "none",
            ModState::Installed => "installed",
            ModState::Activated => "activated",
        };
        f.write_str(s)
    }
}

/// One mod as stored in the cached database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod {
    pub name: String,
    pub authors: Vec<String>,
    pub description: String,
    pub release_date: NaiveDate,
    pub repository: String,
    /// File name inside the `Modding/plugins` directory
    pub plugin_file: String,
    /// Names of the mods this one depends on
    pub dependencies: Vec<String>,
    /// Latest published version
    pub version: Version,
}

impl Mod {
    /// Fails when the name or plugin file would resolve outside the mods
    /// or plugins directory
    pub fn check_file_names(&self) -> std::result::Result<(), String> {
        check_file_names(&self.name, &self.plugin_file)
    }

    pub fn authors_string(&self) -> String {
        self.authors.join(", ")
    }

    /// File name of the archive for `version`
    pub fn archive_name(&self, version: &Version) -> String {
        format!("{}-{}.zip", self.name, version)
    }

    /// Where the archive of the latest version is stored
    pub fn archive_path(&self, mods_dir: &Path) -> PathBuf {
        mods_dir.join(self.archive_name(&self.version))
    }

    pub fn plugin_path(&self, modding: &ModdingDirectory) -> PathBuf {
        modding.plugins.join(&self.plugin_file)
    }

    /// Every archive of this mod in `mods_dir`, newest version first
    pub fn installed_archives(&self, mods_dir: &Path) -> Vec<(PathBuf, Version)> {
        let Ok(entries) = fs::read_dir(mods_dir) else {
            return Vec::new();
        };

        let mut archives: Vec<(PathBuf, Version)> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter_map(|path| {
                let version = self.archive_version(&path)?;
                Some((path, version))
            })
            .collect();

        archives.sort_by(|a, b| b.1.cmp(&a.1));
        archives
    }

    /// Version encoded in `path` if it is an archive of this mod
    /// (`<name>-<version>.zip`)
    fn archive_version(&self, path: &Path) -> Option<Version> {
        if path.extension()? != "zip" {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let (name, version) = stem.rsplit_once('-')?;
        if name != self.name {
            return None;
        }
        Version::parse(version).ok()
    }

    /// The newest installed archive, if any
    pub fn installed_archive(&self, mods_dir: &Path) -> Option<(PathBuf, Version)> {
        self.installed_archives(mods_dir).into_iter().next()
    }

    pub fn installed_version(&self, mods_dir: &Path) -> Option<Version> {
        self.installed_archive(mods_dir).map(|(_, version)| version)
    }

    pub fn is_installed(&self, paths: &GamePaths) -> bool {
        self.installed_archive(&paths.mods_dir).is_some()
    }

    pub fn is_activated(&self, paths: &GamePaths) -> bool {
        self.plugin_path(&paths.modding).is_file()
    }

    pub fn state(&self, paths: &GamePaths) -> ModState {
        if self.is_activated(paths) {
            ModState::Activated
        } else if self.is_installed(paths) {
            ModState::Installed
        } else {
            ModState::None
        }
    }

    /// Whether an installed archive is older than the cached version
    pub fn is_outdated(&self, mods_dir: &Path) -> bool {
        self.installed_version(mods_dir)
            .is_some_and(|installed| installed < self.version)
    }

    /// Case-insensitive match of `term` against name and description
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }
}

impl fmt::Display for Mod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

// ============================================================================
// Remote descriptors
// ============================================================================

/// One record of a remote mod source
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDescriptor {
    pub name: String,
    pub author: String,
    pub description: String,
    pub initial_release_date: NaiveDate,
    pub github_author: String,
    pub github_repo: String,
    pub plugin_file: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl RawDescriptor {
    pub fn repository(&self) -> String {
        crate::github::repository_url(&self.github_author, &self.github_repo)
    }

    pub fn authors(&self) -> Vec<String> {
        normalize_authors(&self.author)
    }

    pub fn check_file_names(&self) -> std::result::Result<(), String> {
        check_file_names(&self.name, &self.plugin_file)
    }

    /// Build the cached record once the latest version is known
    pub fn into_mod(self, version: Version) -> Mod {
        Mod {
            authors: self.authors(),
            repository: self.repository(),
            name: self.name,
            description: self.description,
            release_date: self.initial_release_date,
            plugin_file: self.plugin_file,
            dependencies: self.dependencies,
            version,
        }
    }
}

/// Whether `name` is exactly one normal path component
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn check_file_names(name: &str, plugin_file: &str) -> std::result::Result<(), String> {
    for (field, value) in [("name", name), ("plugin file", plugin_file)] {
        if !is_plain_file_name(value) {
            return Err(format!("{} '{}' is not a plain file name", field, value));
        }
    }
    Ok(())
}

/// Split an author string like `"A, B && C"` into `["A", "B", "C"]`
pub fn normalize_authors(raw: &str) -> Vec<String> {
    raw.replace(", && ", AUTHORS_SEPARATOR)
        .replace(", ", AUTHORS_SEPARATOR)
        .replace(',', AUTHORS_SEPARATOR)
        .split("&&")
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A mod with placeholder metadata
    pub fn sample_mod(name: &str, version: &str, dependencies: &[&str]) -> Mod {
        Mod {
            name: name.to_string(),
            authors: vec!["Damocles".to_string()],
            description: format!("{} description", name),
            release_date: NaiveDate::from_ymd_opt(2023, 8, 24).unwrap(),
            repository: format!("https://github.com/BrandenEK/Blasphemous.{}", name.replace(' ', "")),
            plugin_file: format!("{}.dll", name.replace(' ', "")),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            version: Version::parse(version).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::sample_mod;
    use super::*;
    use crate::games::testing::game_under;

    #[test]
    fn states_are_ordered() {
        assert!(ModState::None < ModState::Installed);
        assert!(ModState::Installed < ModState::Activated);
    }

    #[test]
    fn archive_path_encodes_name_and_version() {
        let m = sample_mod("Modding API", "1.5.0", &[]);
        assert_eq!(
            m.archive_path(Path::new("/data/mods")),
            PathBuf::from("/data/mods/Modding API-1.5.0.zip")
        );
    }

    #[test]
    fn installed_version_is_read_from_archive_names() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let m = sample_mod("Multiworld", "2.0.0", &[]);
        assert_eq!(m.installed_version(dir), None);

        for file in [
            "Multiworld-1.0.0.zip",
            "Multiworld-1.2.0.zip",
            "Multiworld-notes.zip",
            "Multiworld-1.3.0.zip.part",
            "Multi-world-9.0.0.zip",
            "Multiworld Extra-5.0.0.zip",
        ] {
            fs::write(dir.join(file), "").unwrap();
        }

        assert_eq!(m.installed_version(dir), Some(Version::new(1, 2, 0)));
        assert_eq!(m.installed_archives(dir).len(), 2);
        assert!(m.is_outdated(dir));

        let extra = sample_mod("Multiworld Extra", "5.0.0", &[]);
        assert_eq!(extra.installed_version(dir), Some(Version::new(5, 0, 0)));
        assert!(!extra.is_outdated(dir));
    }

    #[test]
    fn state_follows_the_filesystem() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_under(tmp.path());
        let paths = &game.paths;
        let m = sample_mod("Randomizer", "1.0.0", &[]);
        assert_eq!(m.state(paths), ModState::None);

        fs::create_dir_all(&paths.mods_dir).unwrap();
        fs::write(m.archive_path(&paths.mods_dir), "").unwrap();
        assert_eq!(m.state(paths), ModState::Installed);

        fs::create_dir_all(&paths.modding.plugins).unwrap();
        fs::write(m.plugin_path(&paths.modding), "").unwrap();
        assert_eq!(m.state(paths), ModState::Activated);
    }

    #[test]
    fn authors_are_normalized() {
        assert_eq!(normalize_authors("Damocles"), ["Damocles"]);
        assert_eq!(
            normalize_authors("Damocles, Octavia && BrandenEK"),
            ["Damocles", "Octavia", "BrandenEK"]
        );
        assert_eq!(normalize_authors("A, && B"), ["A", "B"]);
        assert_eq!(normalize_authors("A,B&&C"), ["A", "B", "C"]);
    }

    #[test]
    fn descriptor_becomes_mod() {
        let json = serde_json::json!({
            "Name": "Randomizer",
            "Author": "Damocles, BrandenEK",
            "Description": "Shuffles items",
            "InitialReleaseDate": "2022-02-20",
            "GithubAuthor": "BrandenEK",
            "GithubRepo": "Blasphemous.Randomizer",
            "PluginFile": "Randomizer.dll",
            "Dependencies": ["Modding API"]
        });
        let descriptor: RawDescriptor = serde_json::from_value(json).unwrap();
        let m = descriptor.into_mod(Version::new(2, 1, 0));

        assert_eq!(m.authors, ["Damocles", "BrandenEK"]);
        assert_eq!(m.repository, "https://github.com/BrandenEK/Blasphemous.Randomizer");
        assert_eq!(m.release_date, NaiveDate::from_ymd_opt(2022, 2, 20).unwrap());
        assert_eq!(m.dependencies, ["Modding API"]);
    }

    #[test]
    fn descriptor_dependencies_are_optional() {
        let json = serde_json::json!({
            "Name": "Modding API",
            "Author": "Damocles",
            "Description": "Base API",
            "InitialReleaseDate": "2023-01-01",
            "GithubAuthor": "BrandenEK",
            "GithubRepo": "Blasphemous.ModdingAPI",
            "PluginFile": "ModdingAPI.dll"
        });
        let descriptor: RawDescriptor = serde_json::from_value(json).unwrap();
        assert!(descriptor.dependencies.is_empty());
    }

    #[test]
    fn cached_record_shape() {
        let m = sample_mod("Randomizer", "1.0.0", &["Modding API"]);
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["release_date"], "2023-08-24");
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["dependencies"][0], "Modding API");
        let back: Mod = serde_json::from_value(value).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn file_names_must_stay_in_their_directory() {
        assert!(is_plain_file_name("Randomizer.dll"));
        assert!(is_plain_file_name("Modding API"));
        for bad in ["", ".", "..", "../victim.txt", "/tmp/victim.txt", "plugins/Randomizer.dll"] {
            assert!(!is_plain_file_name(bad), "{:?}", bad);
        }

        let mut m = sample_mod("Randomizer", "1.0.0", &[]);
        assert!(m.check_file_names().is_ok());
        m.plugin_file = "/tmp/victim.txt".to_string();
        assert!(m.check_file_names().unwrap_err().contains("plugin file"));
        let mut m = sample_mod("Randomizer", "1.0.0", &[]);
        m.name = "../Randomizer".to_string();
        assert!(m.check_file_names().unwrap_err().contains("name"));
    }

    #[test]
    fn search_matches_name_or_description() {
        let m = sample_mod("Randomizer", "1.0.0", &[]);
        assert!(m.matches("RANDOM"));
        assert!(m.matches("description"));
        assert!(!m.matches("multiworld"));
    }
}
