//! Shared filesystem helpers used across the application

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Write `reader` to `path`, creating the parent directory first
pub fn write_stream(reader: &mut impl io::Read, path: &Path) -> Result<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
    io::copy(reader, &mut file).map_err(|e| Error::io(path, e))
}

/// Extract a zip archive into `destination`, overwriting existing files
pub fn extract_zip(archive: &Path, destination: &Path) -> Result<()> {
    let file = fs::File::open(archive).map_err(|e| Error::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file)?;
    fs::create_dir_all(destination).map_err(|e| Error::io(destination, e))?;
    zip.extract(destination)?;
    Ok(())
}

/// Remove a file, treating "already gone" as success
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::make_zip;
    use super::*;

    #[test]
    fn extract_zip_writes_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("Mod-1.0.0.zip");
        make_zip(&archive, &[("plugins/Mod.dll", "dll"), ("data/Mod/config.json", "{}")]);

        let dest = tmp.path().join("Modding");
        extract_zip(&archive, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("plugins/Mod.dll")).unwrap(), "dll");
        assert!(dest.join("data/Mod/config.json").is_file());
    }

    #[test]
    fn remove_missing_file_reports_false() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nothing.dll");
        assert!(!remove_file_if_exists(&path).unwrap());
        fs::write(&path, "x").unwrap();
        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!path.exists());
    }
}
