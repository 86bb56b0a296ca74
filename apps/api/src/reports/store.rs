//! Flat-file JSON store for finalized reports.
//!
//! The whole collection lives in one pretty-printed JSON array, newest first.
//! Every mutation reads the file, edits the list and replaces it. Writes go to
//! a temp file in the same directory that is renamed over the target, so readers
//! see either the old or the new collection, never a torn one. There is no
//! locking: concurrent writers race and the last write wins.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::report::{StoredReport, PLACEHOLDER};

static CASE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Fallnummer:\s*([^\n\r]+)").expect("case number pattern is valid")
});

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt report file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize reports: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads the case number from a formal report's `Fallnummer:` line.
///
/// Returns `None` when the marker is absent, blank or still the placeholder.
pub fn extract_case_id(formal: &str) -> Option<String> {
    let value = CASE_NUMBER_RE.captures(formal)?.get(1)?.as_str().trim();
    if value.is_empty() || value == PLACEHOLDER {
        None
    } else {
        Some(value.to_string())
    }
}

pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All reports, most recently saved first.
    pub async fn list(&self) -> Result<Vec<StoredReport>, StoreError> {
        self.read_all().await
    }

    /// Persists a formal report at the front of the collection.
    ///
    /// The id comes from the report's case number, else a fresh UUID. Saving a
    /// case number that already exists replaces the older record.
    pub async fn save(&self, formal: &str) -> Result<StoredReport, StoreError> {
        let mut reports = self.read_all().await?;

        let id = extract_case_id(formal).unwrap_or_else(|| Uuid::new_v4().to_string());
        let report = StoredReport {
            id,
            formal: formal.to_string(),
            date: Utc::now(),
        };

        let before = reports.len();
        reports.retain(|r| r.id != report.id);
        if reports.len() != before {
            info!("Replacing existing report {}", report.id);
        }
        reports.insert(0, report.clone());

        self.write_all(&reports).await?;
        info!("Saved report {} ({} total)", report.id, reports.len());
        Ok(report)
    }

    /// Removes the report with `id`. Unknown ids are a no-op.
    pub async fn delete_one(&self, id: &str) -> Result<(), StoreError> {
        let mut reports = self.read_all().await?;
        let before = reports.len();
        reports.retain(|r| r.id != id);

        if reports.len() == before {
            debug!("Delete of unknown report {id} ignored");
            return Ok(());
        }

        self.write_all(&reports).await?;
        info!("Deleted report {id}");
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), StoreError> {
        self.write_all(&[]).await?;
        info!("Deleted all reports");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<StoredReport>, StoreError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, reports: &[StoredReport]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(reports)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;

        let target = self.path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(json.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)
        .and_then(|written| written)
        .map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
