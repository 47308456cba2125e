//! Blocking HTTP access
//!
//! Every network call in the crate goes through [`Fetcher`], so the database
//! update and install paths can be exercised against [`mock::MockFetcher`].

use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::logging::log_download;
use crate::utils::write_stream;

pub trait Fetcher {
    /// GET `url` and decode the body as JSON
    fn get_json(&self, url: &str) -> Result<serde_json::Value>;

    /// GET `url` and return the body as text
    fn get_text(&self, url: &str) -> Result<String>;

    /// GET `url`, following redirects, and return the URL it ended at
    fn final_url(&self, url: &str) -> Result<String>;

    /// Whether `url` answers with a successful status
    fn exists(&self, url: &str) -> bool;

    /// Download `url` into `path`, returning the number of bytes written
    fn download(&self, url: &str, path: &Path) -> Result<u64>;
}

/// [`Fetcher`] backed by `ureq`
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new(user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(user_agent)
            .timeout_connect(Duration::from_secs(15))
            .redirects(8)
            .build();
        Self { agent }
    }

    fn call(&self, url: &str) -> Result<ureq::Response> {
        self.agent.get(url).call().map_err(|e| http_error(url, e))
    }
}

fn http_error(url: &str, error: ureq::Error) -> Error {
    let reason = match error {
        ureq::Error::Status(code, response) => {
            format!("HTTP {} {}", code, response.status_text())
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    };
    Error::Http {
        url: url.to_string(),
        reason,
    }
}

impl Fetcher for UreqFetcher {
    fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        self.call(url)?.into_json().map_err(|e| Error::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn get_text(&self, url: &str) -> Result<String> {
        self.call(url)?.into_string().map_err(|e| Error::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn final_url(&self, url: &str) -> Result<String> {
        Ok(self.call(url)?.get_url().to_string())
    }

    fn exists(&self, url: &str) -> bool {
        self.agent.head(url).call().is_ok()
    }

    fn download(&self, url: &str, path: &Path) -> Result<u64> {
        log_download(&format!("{} -> {}", url, path.display()));
        let response = self.call(url)?;
        let mut reader = response.into_reader();
        write_stream(&mut reader, path)
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockFetcher;
    use super::*;

    #[test]
    fn mock_follows_redirects() {
        let fetcher = MockFetcher::new().with_redirect(
            "https://github.com/a/b/releases/latest",
            "https://github.com/a/b/releases/tag/v1.2.0",
        );
        assert_eq!(
            fetcher.final_url("https://github.com/a/b/releases/latest").unwrap(),
            "https://github.com/a/b/releases/tag/v1.2.0"
        );
        assert!(!fetcher.exists("https://github.com/a/c"));
    }
}
