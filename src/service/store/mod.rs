//! Timestamped persistence for rendered reports.

use std::path::PathBuf;

use chrono::Local;
use tracing::{info, instrument};

use crate::base::types::Res;

/// Filename timestamp, second granularity.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Write-once file store for rendered reports.
///
/// Every save gets a fresh timestamped name, so existing reports are
/// never overwritten. Names sort lexicographically in time order.
#[derive(Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save a rendered report under a timestamped name and return its path.
    ///
    /// Creates the output directory on first use.
    #[instrument(name = "ReportStore::save", skip_all)]
    pub async fn save(&self, markdown: &str) -> Res<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let path = self.dir.join(format!("incident_report_{timestamp}.md"));

        tokio::fs::write(&path, markdown).await?;

        info!("Report saved to `{}`.", path.display());

        Ok(path)
    }

    /// List saved report names, newest first.
    pub async fn list(&self) -> Res<Vec<String>> {
        let mut names = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // An output directory that does not exist yet has no reports.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();

            if name.ends_with(".md") {
                names.push(name);
            }
        }

        names.sort();
        names.reverse();

        Ok(names)
    }

    /// Read one saved report back by name.
    ///
    /// Names arrive from user input (the web report browser), so anything
    /// other than a plain `.md` filename is rejected.
    pub async fn read(&self, name: &str) -> Res<String> {
        if !is_plain_report_name(name) {
            return Err(anyhow::anyhow!("invalid report name: `{name}`"));
        }

        Ok(tokio::fs::read_to_string(self.dir.join(name)).await?)
    }
}

fn is_plain_report_name(name: &str) -> bool {
    name.ends_with(".md") && !name.contains(['/', '\\']) && !name.contains("..")
}

// Tests.
