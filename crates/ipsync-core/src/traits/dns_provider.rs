// # DNS Provider Trait
//
// Defines the interface to a DNS hosting provider's REST API.
//
// ## Implementations
//
// - Cloudflare: `ipsync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ipsync_core::DnsProvider;
//
// let zones = provider.list_zones(Some("example.com")).await?;
// for zone in &zones {
//     let records = provider.list_records(&zone.id, Some(&RecordType::A)).await?;
// }
// ```

use async_trait::async_trait;

use crate::error::Result;
use crate::record::{DnsRecord, RecordPayload, RecordType, Zone};

/// Trait for DNS provider implementations
///
/// Each method maps to exactly one API call. Providers are stateless:
/// they do not retry, back off, cache, or decide whether a change is
/// needed. Those decisions belong to the reconciliation engine, which
/// also decides how a failed call is reported.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List zones visible to the credentials
    ///
    /// Fetches a single page. When `filter_name` is set only the zone whose
    /// name equals it exactly (case-sensitive) is returned.
    async fn list_zones(&self, filter_name: Option<&str>) -> Result<Vec<Zone>>;

    /// List records of a zone, optionally filtered server-side by type
    async fn list_records(
        &self,
        zone_id: &str,
        record_type: Option<&RecordType>,
    ) -> Result<Vec<DnsRecord>>;

    /// Replace the record `record_id` with `payload`
    async fn replace_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<()>;

    /// Create a new record from `payload`
    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Point `record` at `new_content` with a full-record replace
    ///
    /// Safe to repeat with identical content.
    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        new_content: &str,
    ) -> Result<()> {
        let payload = RecordPayload::replacing_content(record, new_content);
        self.replace_record(zone_id, &record.id, &payload).await
    }
}
