// # ipsync-core
//
// Core library for ipsync: point DNS records at a new IP address.
//
// ## Architecture Overview
//
// - **DnsProvider**: Trait for listing and mutating records via a provider API
// - **Reconciler**: One pass over zones and records deciding what must change
// - **ChangeLedger**: Ordered record of every decision, rendered as reports
// - **backup**: Snapshot record sets to JSON and replay them
// - **RunConfig**: Immutable settings built once from a `ConfigSource`
// - **mask**: Display masking for identifiers, names and secrets
//
// ## Flow
//
// ```text
// ConfigSource ─► RunConfig ─► Reconciler ─► DnsProvider (list / update)
//                                   │
//                                   ▼
//                             ChangeLedger ─► summary / HTML / JSON
// ```

pub mod backup;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod mask;
pub mod record;
pub mod traits;

// Re-export core types for convenience
pub use config::{ApiToken, ConfigSource, EnvConfigSource, RawSettings, RunConfig};
pub use engine::{Decision, Reconciler, decide};
pub use error::{Error, Result};
pub use ledger::{ChangeEntry, ChangeLedger, ChangeStatus, RunReport, RunSummary};
pub use mask::{Censor, MaskKind, mask};
pub use record::{DnsRecord, RecordPayload, RecordType, Zone};
pub use traits::DnsProvider;
