//! Change ledger
//!
//! Every record the engine looks at produces exactly one [`ChangeEntry`],
//! appended in discovery order (zone order, then record type order, then
//! provider order). The ledger is what dry-run previews, reports and the
//! final summary are built from.

mod html;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;

use crate::error::{Error, Result};

/// Outcome for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeStatus {
    /// Malformed, or nothing to change
    Skipped,
    /// A change was computed but not sent
    DryRun,
    /// The provider accepted the change
    Updated,
    /// The provider rejected the change or the call failed
    Failed,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Skipped => "skipped",
            ChangeStatus::DryRun => "dry-run",
            ChangeStatus::Updated => "updated",
            ChangeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One processed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Record name
    pub domain: String,
    pub record_id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub old_content: String,
    pub new_content: String,
    pub status: ChangeStatus,
}

/// Ordered, append-only list of change entries for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLedger {
    entries: Vec<ChangeEntry>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ChangeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries with `status`
    pub fn count(&self, status: ChangeStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Render the ledger as a standalone HTML page
    pub fn to_html(&self) -> String {
        html::render(self)
    }

    /// Render the ledger as a pretty-printed JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the HTML report to `path`
    pub async fn write_html(&self, path: impl AsRef<Path>) -> Result<()> {
        write_report(path.as_ref(), self.to_html()).await
    }

    /// Write the JSON ledger to `path`
    pub async fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        write_report(path.as_ref(), self.to_json()?).await
    }
}

async fn write_report(path: &Path, body: String) -> Result<()> {
    fs::write(path, body).await.map_err(|e| {
        Error::persistence(format!("Failed to write report {}: {}", path.display(), e))
    })?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

/// Run counters
///
/// `dry-run` and `failed` outcomes are only tracked in the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Result of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub summary: RunSummary,
    pub ledger: ChangeLedger,
}

impl RunReport {
    /// Append an entry and bump the matching counters
    pub fn record(&mut self, entry: ChangeEntry) {
        self.summary.total += 1;
        match entry.status {
            ChangeStatus::Updated => self.summary.updated += 1,
            ChangeStatus::Skipped => self.summary.skipped += 1,
            ChangeStatus::DryRun | ChangeStatus::Failed => {}
        }
        self.ledger.push(entry);
    }

    pub fn dry_run_count(&self) -> usize {
        self.ledger.count(ChangeStatus::DryRun)
    }

    pub fn failed_count(&self) -> usize {
        self.ledger.count(ChangeStatus::Failed)
    }

    /// One-line summary for the console
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "Total records: {} | Updated: {} | Skipped: {}",
            self.summary.total, self.summary.updated, self.summary.skipped
        );
        let dry_run = self.dry_run_count();
        if dry_run > 0 {
            line.push_str(&format!(" | Dry-run: {}", dry_run));
        }
        let failed = self.failed_count();
        if failed > 0 {
            line.push_str(&format!(" | Failed: {}", failed));
        }
        line
    }
}
