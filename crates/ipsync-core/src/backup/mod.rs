//! Backup and restore of record sets
//!
//! Both directions are best-effort: a zone that cannot be fetched is left
//! out of the snapshot, and a record that cannot be restored is logged
//! and counted without stopping the others.

mod file;

pub use file::{BackupSnapshot, BackupZone, DEFAULT_BACKUP_FILE};

use crate::mask::{Censor, MaskKind};
use crate::record::{DnsRecord, RecordPayload, RecordType, Zone};
use crate::traits::DnsProvider;
use tracing::{error, info, warn};

/// Outcome of a restore
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Records replaced or created
    pub restored: usize,
    /// Records the provider rejected or that had nowhere to go
    pub failed: usize,
}

/// Fetch every record of `zones` into a snapshot
///
/// When `record_types` covers all supported types each zone is fetched in
/// one unfiltered call, which also captures types outside the supported
/// set. Otherwise each configured type is fetched separately.
pub async fn snapshot(
    provider: &dyn DnsProvider,
    zones: &[Zone],
    record_types: &[RecordType],
    censor: Censor,
) -> BackupSnapshot {
    let all_types = RecordType::covers_all(record_types);

    let mut snapshot = BackupSnapshot::new();
    for zone in zones {
        let zone_label = censor.apply(&zone.name, MaskKind::Name);

        let records = if all_types {
            match provider.list_records(&zone.id, None).await {
                Ok(records) => records,
                Err(e) => {
                    error!("Failed to backup zone {}: {}", zone_label, e);
                    continue;
                }
            }
        } else {
            fetch_by_type(provider, zone, record_types, &zone_label).await
        };

        info!("Backed up {} records for zone {}", records.len(), zone_label);
        snapshot.insert(
            zone.name.clone(),
            BackupZone::Full {
                zone_id: zone.id.clone(),
                records,
            },
        );
    }
    snapshot
}

async fn fetch_by_type(
    provider: &dyn DnsProvider,
    zone: &Zone,
    record_types: &[RecordType],
    zone_label: &str,
) -> Vec<DnsRecord> {
    let mut records = Vec::new();
    for record_type in record_types {
        match provider.list_records(&zone.id, Some(record_type)).await {
            Ok(mut batch) => records.append(&mut batch),
            Err(e) => warn!(
                "Backup of zone {} is partial: failed to fetch {} records: {}",
                zone_label, record_type, e
            ),
        }
    }
    records
}

/// Replay a snapshot against the provider
///
/// Records that carry an id are replaced in place; records without one
/// are created.
pub async fn restore(
    provider: &dyn DnsProvider,
    snapshot: &BackupSnapshot,
    censor: Censor,
) -> RestoreSummary {
    let mut summary = RestoreSummary::default();

    for (zone_name, zone) in snapshot.zones() {
        let zone_label = censor.apply(zone_name, MaskKind::Name);

        for record in zone.records() {
            let name = censor.apply(&record.name, MaskKind::Name);

            let Some(zone_id) = zone.zone_id_for(record) else {
                error!(
                    "Failed to restore record {} in {}: no zone id in backup",
                    name, zone_label
                );
                summary.failed += 1;
                continue;
            };

            let result = match RecordPayload::from_snapshot(record) {
                Ok(payload) if record.id.is_empty() => {
                    provider.create_record(zone_id, &payload).await
                }
                Ok(payload) => provider.replace_record(zone_id, &record.id, &payload).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    info!(
                        "Restored record {} ({}) in {}",
                        name, record.record_type, zone_label
                    );
                    summary.restored += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to restore record {} in {}: {}",
                        name, zone_label, e
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    info!(
        "Restore finished: {} restored, {} failed",
        summary.restored, summary.failed
    );
    summary
}
