//! Save files backup

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};
use crate::logging::log_action;

/// File name of a backup taken at `now`
pub fn backup_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{}SavesBackup_{}.zip", prefix, now.format("%Y-%m-%d_%Hh%Mm%Ss"))
}

/// Where a backup ends up for a requested destination.
///
/// A directory receives a timestamped archive, a `.zip` path is used as is,
/// and any other path gets the `.zip` extension appended.
pub fn backup_target(destination: &Path, prefix: &str, now: NaiveDateTime) -> PathBuf {
    if destination.is_dir() {
        destination.join(backup_file_name(prefix, now))
    } else if destination.extension().is_some_and(|ext| ext == "zip") {
        destination.to_path_buf()
    } else {
        let mut name = destination.as_os_str().to_owned();
        name.push(".zip");
        PathBuf::from(name)
    }
}

/// Zip the whole `saves_dir` into `destination` (see [`backup_target`]),
/// returning the archive path
pub fn backup_saves(
    saves_dir: &Path,
    destination: &Path,
    prefix: &str,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    if !saves_dir.is_dir() {
        return Err(Error::io(
            saves_dir,
            io::Error::new(io::ErrorKind::NotFound, "saves directory not found"),
        ));
    }

    let target = backup_target(destination, prefix, now);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    log_action(&format!("Backing up {} to {}", saves_dir.display(), target.display()));

    let file = fs::File::create(&target).map_err(|e| Error::io(&target, e))?;
    if let Err(e) = write_archive(file, saves_dir, &target) {
        let _ = fs::remove_file(&target);
        return Err(e);
    }
    Ok(target)
}

/// Add every entry below `saves_dir` to a new archive written to `file`.
/// Any unreadable entry fails the whole archive.
fn write_archive(file: fs::File, saves_dir: &Path, target: &Path) -> Result<()> {
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for entry in WalkDir::new(saves_dir).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(saves_dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        let Ok(relative) = entry.path().strip_prefix(saves_dir) else {
            continue;
        };
        // Zip entries always use forward slashes
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut source = fs::File::open(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            io::copy(&mut source, &mut zip).map_err(|e| Error::io(target, e))?;
        }
    }

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_backup_file_name() {
        assert_eq!(
            backup_file_name("Blasphemous", noon()),
            "BlasphemousSavesBackup_2024-03-09_12h05m07s.zip"
        );
    }

    #[test]
    fn test_backup_target() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        assert_eq!(
            backup_target(dir, "Blasphemous", noon()),
            dir.join("BlasphemousSavesBackup_2024-03-09_12h05m07s.zip")
        );
        assert_eq!(backup_target(&dir.join("saves.zip"), "Blasphemous", noon()), dir.join("saves.zip"));
        assert_eq!(backup_target(&dir.join("saves"), "Blasphemous", noon()), dir.join("saves.zip"));
    }

    #[test]
    fn test_backup_saves_archives_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        let saves = tmp.path().join("Savegames");
        fs::create_dir_all(saves.join("slot1")).unwrap();
        fs::write(saves.join("savegame_0.save"), "progress").unwrap();
        fs::write(saves.join("slot1/options.json"), "{}").unwrap();

        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let archive = backup_saves(&saves, &out, "Blasphemous", noon()).unwrap();
        assert!(archive.starts_with(&out));

        let mut zip = zip::ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, ["savegame_0.save", "slot1/", "slot1/options.json"]);

        let mut contents = String::new();
        io::Read::read_to_string(&mut zip.by_name("savegame_0.save").unwrap(), &mut contents).unwrap();
        assert_eq!(contents, "progress");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_entry_fails_the_backup() {
        let tmp = tempfile::tempdir().unwrap();
        let saves = tmp.path().join("Savegames");
        fs::create_dir_all(&saves).unwrap();
        fs::write(saves.join("savegame_0.save"), "progress").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone.save"), saves.join("savegame_1.save")).unwrap();

        let target = tmp.path().join("backup.zip");
        match backup_saves(&saves, &target, "Blasphemous", noon()) {
            Err(Error::Io { path, .. }) => assert!(path.ends_with("savegame_1.save")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!target.exists());
    }

    #[test]
    fn test_backup_without_saves_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let result = backup_saves(&tmp.path().join("missing"), tmp.path(), "Blasphemous", noon());
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
