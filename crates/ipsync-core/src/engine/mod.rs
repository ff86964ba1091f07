//! Reconciliation engine
//!
//! The [`Reconciler`] makes one pass over the provider's records and
//! brings them in line with the desired IP:
//!
//! ```text
//! zones ──► record types ──► records ──► decide() ──► skip / dry-run / update
//!                                                          │
//!                                                          ▼
//!                                                     ChangeLedger
//! ```
//!
//! ## Decision policy
//!
//! 1. A record missing its id, name or content is skipped untouched.
//! 2. `A` records are pinned to the desired IP.
//! 3. Every other type is only touched when it literally contains the
//!    configured match IP; all occurrences are replaced.
//!
//! Failures are contained: a failed record fetch skips that zone/type
//! pair, a failed update marks that one record `failed`. Only a failure to
//! list zones ends the run early.

use crate::config::RunConfig;
use crate::error::Result;
use crate::ledger::{ChangeEntry, ChangeStatus, RunReport};
use crate::mask::{Censor, MaskKind};
use crate::record::{DnsRecord, RecordType, Zone};
use crate::traits::DnsProvider;
use tracing::{debug, error, info, warn};

/// What should happen to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Missing id, name or content
    Malformed,
    /// Already correct, or not ours to touch
    Unchanged,
    /// Content must become `new_content`
    Update { new_content: String },
}

/// Decide whether `record` has to change
///
/// A records converge to `desired_ip`. Other types change only when
/// `match_ip` is set and appears in their content.
pub fn decide(record: &DnsRecord, desired_ip: &str, match_ip: Option<&str>) -> Decision {
    if !record.is_well_formed() {
        return Decision::Malformed;
    }

    if record.record_type == RecordType::A {
        return if record.content != desired_ip {
            Decision::Update {
                new_content: desired_ip.to_string(),
            }
        } else {
            Decision::Unchanged
        };
    }

    match match_ip.filter(|m| !m.is_empty()) {
        Some(old) if record.content.contains(old) => Decision::Update {
            new_content: record.content.replace(old, desired_ip),
        },
        _ => Decision::Unchanged,
    }
}

/// Single-pass reconciliation over every selected zone
pub struct Reconciler<'a> {
    provider: &'a dyn DnsProvider,
    config: &'a RunConfig,
    censor: Censor,
}

impl<'a> Reconciler<'a> {
    pub fn new(provider: &'a dyn DnsProvider, config: &'a RunConfig) -> Self {
        Self {
            provider,
            config,
            censor: config.censor(),
        }
    }

    /// Run the pass
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: the ledger and counters, even if every record failed
    /// - `Err(Error)`: zones could not be listed
    pub async fn run(&self) -> Result<RunReport> {
        let zones = self
            .provider
            .list_zones(self.config.target_domain.as_deref())
            .await?;

        if zones.is_empty() {
            warn!(
                "No zones found{}",
                self.config
                    .target_domain
                    .as_deref()
                    .map(|d| format!(" matching {}", self.censor.apply(d, MaskKind::Name)))
                    .unwrap_or_default()
            );
        }

        let mut report = RunReport::default();
        for zone in &zones {
            self.reconcile_zone(zone, &mut report).await;
        }

        info!("Reconciliation finished: {}", report.summary_line());
        Ok(report)
    }

    /// Reconcile one zone, appending to `report`
    pub async fn reconcile_zone(&self, zone: &Zone, report: &mut RunReport) {
        debug!(
            "Processing zone {} ({})",
            self.censor.apply(&zone.name, MaskKind::Name),
            self.censor.apply(&zone.id, MaskKind::Identifier)
        );

        for record_type in &self.config.record_types {
            let records = match self.provider.list_records(&zone.id, Some(record_type)).await {
                Ok(records) => records,
                Err(e) => {
                    error!(
                        "Failed to fetch {} records for zone {}: {}",
                        record_type,
                        self.censor.apply(&zone.id, MaskKind::Identifier),
                        e
                    );
                    continue;
                }
            };

            for record in &records {
                let entry = self.reconcile_record(zone, record).await;
                report.record(entry);
            }
        }
    }

    /// Classify one record, mutating it unless this is a dry run
    pub async fn reconcile_record(&self, zone: &Zone, record: &DnsRecord) -> ChangeEntry {
        let id = self.censor.apply(&record.id, MaskKind::Identifier);
        let name = self.censor.apply(&record.name, MaskKind::Name);
        debug!(
            "Record: id={} type={} name={} content={}",
            id, record.record_type, name, record.content
        );

        let decision = decide(
            record,
            &self.config.desired_ip,
            self.config.match_ip.as_deref(),
        );

        let (new_content, status) = match decision {
            Decision::Malformed => {
                info!(
                    "[SKIP] Empty field in {} record id='{}' name='{}'",
                    record.record_type, id, name
                );
                (record.content.clone(), ChangeStatus::Skipped)
            }
            Decision::Unchanged => {
                info!(
                    "Skipped record {} ({}) [{}] (no match or unchanged)",
                    id, name, record.record_type
                );
                (record.content.clone(), ChangeStatus::Skipped)
            }
            Decision::Update { new_content } if self.config.dry_run => {
                info!(
                    "[DRY RUN] Would update record {} ({}) [{}] in zone {}: current={}, new={}",
                    id,
                    name,
                    record.record_type,
                    self.censor.apply(&zone.id, MaskKind::Identifier),
                    record.content,
                    new_content
                );
                (new_content, ChangeStatus::DryRun)
            }
            Decision::Update { new_content } => {
                match self.provider.update_record(&zone.id, record, &new_content).await {
                    Ok(()) => {
                        info!(
                            "Updated record {} ({}) [{}]: {} -> {}",
                            id, name, record.record_type, record.content, new_content
                        );
                        (new_content, ChangeStatus::Updated)
                    }
                    Err(e) => {
                        error!(
                            "Failed to update record {} ({}) [{}]: {}",
                            id, name, record.record_type, e
                        );
                        (new_content, ChangeStatus::Failed)
                    }
                }
            }
        };

        ChangeEntry {
            domain: record.name.clone(),
            record_id: record.id.clone(),
            record_type: record.record_type.to_string(),
            old_content: record.content.clone(),
            new_content,
            status,
        }
    }
}
