// # Backup File
//
// JSON snapshot of every backed-up zone, keyed by zone name. Zones keep
// the order they were discovered in, both in the file and on restore.
//
// ## File Format
//
// ```json
// {
//   "example.com": {
//     "zone_id": "023e105f4ecef8ad9ca31a8372d0c353",
//     "records": [
//       { "id": "372e67954025e0ba6aaa6d586b9e0b59", "type": "A", "name": "example.com",
//         "content": "198.51.100.4", "ttl": 3600, "proxied": false }
//     ]
//   }
// }
// ```
//
// Older backups may map a zone name straight to an array of records;
// those still load, and each record's own `zone_id` is used on restore.
//
// ## Writes
//
// The snapshot is written to a temporary sibling file and renamed over
// the target, so an interrupted write never leaves a truncated backup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::record::DnsRecord;

/// Default backup file name
pub const DEFAULT_BACKUP_FILE: &str = "cf_backup.json";

/// Records of one zone inside a backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackupZone {
    /// `{ "zone_id": ..., "records": [...] }`
    Full {
        zone_id: String,
        records: Vec<DnsRecord>,
    },
    /// A bare array of records
    Flat(Vec<DnsRecord>),
}

impl BackupZone {
    pub fn records(&self) -> &[DnsRecord] {
        match self {
            BackupZone::Full { records, .. } => records,
            BackupZone::Flat(records) => records,
        }
    }

    /// Zone id to restore `record` into
    pub fn zone_id_for<'r>(&'r self, record: &'r DnsRecord) -> Option<&'r str> {
        let id = match self {
            BackupZone::Full { zone_id, .. } => zone_id.as_str(),
            BackupZone::Flat(_) => record.zone_id.as_str(),
        };
        (!id.is_empty()).then_some(id)
    }
}

/// Every backed-up zone, keyed by zone name, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupSnapshot {
    zones: IndexMap<String, BackupZone>,
}

impl BackupSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, zone_name: impl Into<String>, zone: BackupZone) {
        self.zones.insert(zone_name.into(), zone);
    }

    pub fn get(&self, zone_name: &str) -> Option<&BackupZone> {
        self.zones.get(zone_name)
    }

    pub fn zones(&self) -> impl Iterator<Item = (&String, &BackupZone)> {
        self.zones.iter()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Total records across all zones
    pub fn record_count(&self) -> usize {
        self.zones.values().map(|z| z.records().len()).sum()
    }

    /// Load a snapshot from `path`
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::persistence(format!(
                "Backup file {} not found",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to read backup file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::persistence(format!(
                "Failed to parse backup file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the snapshot to `path` atomically
    pub async fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::persistence(format!("Failed to serialize backup: {}", e)))?;

        let temp_path = temp_path(path);
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::debug!("Backup written to {}", path.display());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
