//! Remote mod sources
//!
//! A source is a URL serving a JSON array of mod descriptors. Sources are
//! fetched one after the other; a failing source is reported and skipped.

use crate::context::TaskContext;
use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::logging::{log_info, log_warning};
use crate::mods::RawDescriptor;

#[derive(Debug, Default)]
pub struct FetchReport {
    /// Every descriptor, in source order then record order
    pub descriptors: Vec<RawDescriptor>,
    pub failed_sources: Vec<String>,
    /// Records that could not be read as a descriptor
    pub skipped_records: usize,
}

/// Fetch and decode one source
pub fn fetch_source(fetcher: &dyn Fetcher, url: &str) -> Result<(Vec<RawDescriptor>, usize)> {
    let payload = fetcher.get_json(url)?;
    let serde_json::Value::Array(records) = payload else {
        return Err(Error::Http {
            url: url.to_string(),
            reason: "expected a JSON array of mods".to_string(),
        });
    };

    let mut descriptors = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        match serde_json::from_value::<RawDescriptor>(record) {
            Ok(descriptor) => match descriptor.check_file_names() {
                Ok(()) => descriptors.push(descriptor),
                Err(reason) => {
                    log_warning(&format!("Skipping record from {}: {}", url, reason));
                    skipped += 1;
                }
            },
            Err(e) => {
                log_warning(&format!("Skipping malformed record from {}: {}", url, e));
                skipped += 1;
            }
        }
    }
    Ok((descriptors, skipped))
}

/// Fetch every source, isolating failures per source
pub fn fetch_all(fetcher: &dyn Fetcher, sources: &[String], ctx: &TaskContext) -> FetchReport {
    let mut report = FetchReport::default();
    let total = sources.len();

    for (i, url) in sources.iter().enumerate() {
        ctx.progress(i + 1, total, url.as_str());
        match fetch_source(fetcher, url) {
            Ok((descriptors, skipped)) => {
                log_info(&format!("{} mods from {}", descriptors.len(), url));
                report.descriptors.extend(descriptors);
                report.skipped_records += skipped;
            }
            Err(e) => {
                log_warning(&format!("Source {} failed: {}", url, e));
                ctx.warning(format!("Unable to fetch {}: {}", url, e));
                report.failed_sources.push(url.clone());
            }
        }
    }

    report
}
