//! GitHub release URL conventions
//!
//! Mods are published as GitHub releases. The latest version is read from
//! the `releases/latest` redirect, and the archive is found by probing the
//! tag and asset names mod authors commonly use.

use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::logging::log_info;
use crate::version::Version;

pub const GITHUB_URL: &str = "https://github.com";

/// `https://github.com/<author>/<repo>`
pub fn repository_url(author: &str, repo: &str) -> String {
    format!("{}/{}/{}", GITHUB_URL, author, repo)
}

/// URL of a file on the default branch of a repository
pub fn raw_url(repository: &str, file: &str) -> String {
    format!("{}/raw/main/{}", repository, file)
}

/// Extract the version from the last path segment of a release URL
/// (`.../releases/tag/v1.2.3` -> `1.2.3`)
pub fn version_from_release_url(url: &str) -> Result<Version> {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    Version::parse(segment)
}

/// Follow the `releases/latest` redirect of `repository` and parse the tag
pub fn latest_release_version(fetcher: &dyn Fetcher, name: &str, repository: &str) -> Result<Version> {
    let url = format!("{}/releases/latest", repository);
    let lookup_error = |reason: String| Error::VersionLookup {
        name: name.to_string(),
        reason,
    };

    let location = fetcher.final_url(&url).map_err(|e| lookup_error(e.to_string()))?;
    version_from_release_url(&location).map_err(|e| lookup_error(e.to_string()))
}

/// Tag names tried for a release, in order
pub fn release_tag_candidates(version: &Version) -> [String; 2] {
    [version.to_string(), format!("v{}", version)]
}

/// Asset file names tried for a release archive, in order
pub fn archive_name_candidates(mod_name: &str, version: &Version) -> [String; 3] {
    let name = mod_name.replace(' ', "");
    [
        format!("{}.zip", name),
        format!("{}.v{}.zip", name, version),
        format!("{}-v{}.zip", name, version),
    ]
}

/// Find the release page of `version`, trying both tag conventions
pub fn release_page_url(fetcher: &dyn Fetcher, repository: &str, version: &Version) -> Option<String> {
    release_tag_candidates(version)
        .into_iter()
        .map(|tag| format!("{}/releases/tag/{}", repository, tag))
        .find(|url| fetcher.exists(url))
}

/// Resolve the download URL of a mod's release archive.
///
/// The first tag convention with an existing release page wins, then the
/// first asset name that answers successfully.
pub fn release_archive_url(
    fetcher: &dyn Fetcher,
    mod_name: &str,
    repository: &str,
    version: &Version,
) -> Result<String> {
    let not_found = || Error::ArchiveNotFound {
        name: mod_name.to_string(),
        version: version.to_string(),
    };

    let page = release_page_url(fetcher, repository, version).ok_or_else(not_found)?;
    let base = page.replace("/releases/tag/", "/releases/download/");

    let url = archive_name_candidates(mod_name, version)
        .into_iter()
        .map(|asset| format!("{}/{}", base, asset))
        .find(|url| fetcher.exists(url))
        .ok_or_else(not_found)?;

    log_info(&format!("Resolved archive of '{}' {}: {}", mod_name, version, url));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockFetcher;

    const REPO: &str = "https://github.com/BrandenEK/Blasphemous.Randomizer";

    #[test]
    fn test_repository_url() {
        assert_eq!(repository_url("BrandenEK", "Blasphemous.Randomizer"), REPO);
        assert_eq!(
            raw_url(REPO, "BlasphemousMods.json"),
            format!("{}/raw/main/BlasphemousMods.json", REPO)
        );
    }

    #[test]
    fn test_version_from_release_url() {
        let v = version_from_release_url(&format!("{}/releases/tag/v2.1.0", REPO)).unwrap();
        assert_eq!(v, Version::new(2, 1, 0));
        assert!(version_from_release_url(&format!("{}/releases", REPO)).is_err());
    }

    #[test]
    fn test_latest_release_version() {
        let fetcher = MockFetcher::new().with_redirect(
            &format!("{}/releases/latest", REPO),
            &format!("{}/releases/tag/1.3.0", REPO),
        );
        let v = latest_release_version(&fetcher, "Randomizer", REPO).unwrap();
        assert_eq!(v, Version::new(1, 3, 0));

        let missing = latest_release_version(&MockFetcher::new(), "Randomizer", REPO);
        assert!(matches!(missing, Err(Error::VersionLookup { .. })));
    }

    #[test]
    fn test_archive_url_prefers_first_matching_convention() {
        let version = Version::new(2, 0, 1);
        let fetcher = MockFetcher::new()
            .with_body(&format!("{}/releases/tag/v2.0.1", REPO), "page")
            .with_body(&format!("{}/releases/download/v2.0.1/Randomizer.v2.0.1.zip", REPO), "zip")
            .with_body(&format!("{}/releases/download/v2.0.1/Randomizer-v2.0.1.zip", REPO), "zip");

        let url = release_archive_url(&fetcher, "Randomizer", REPO, &version).unwrap();
        assert_eq!(url, format!("{}/releases/download/v2.0.1/Randomizer.v2.0.1.zip", REPO));

        // Unprefixed tag is probed before the `v` one
        let requests = fetcher.requests.borrow();
        assert_eq!(requests[0], format!("{}/releases/tag/2.0.1", REPO));
        assert_eq!(requests[1], format!("{}/releases/tag/v2.0.1", REPO));
    }

    #[test]
    fn test_archive_name_strips_spaces() {
        let names = archive_name_candidates("Modding API", &Version::new(1, 0, 0));
        assert_eq!(names[0], "ModdingAPI.zip");
        assert_eq!(names[2], "ModdingAPI-v1.0.0.zip");
    }

    #[test]
    fn test_archive_not_found() {
        let version = Version::new(1, 0, 0);
        let fetcher = MockFetcher::new().with_body(&format!("{}/releases/tag/1.0.0", REPO), "page");
        let result = release_archive_url(&fetcher, "Randomizer", REPO, &version);
        assert!(matches!(result, Err(Error::ArchiveNotFound { .. })));
    }
}
