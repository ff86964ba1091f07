//! DNS data model shared by the engine, providers and backups
//!
//! Records are validated at the provider boundary: the fields the engine
//! reasons about are typed, everything else the provider returns is kept
//! in [`DnsRecord::extra`] so a backup can be replayed without losing data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// TTL used when a provider payload carries none
pub const DEFAULT_TTL: u32 = 3600;

/// Fields owned by the provider that must not be sent back on restore
const SERVER_MANAGED_FIELDS: &[&str] = &["id", "zone_id", "zone_name", "created_on", "modified_on"];

/// A DNS zone as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider zone identifier
    pub id: String,
    /// Zone apex name (e.g. "example.com")
    pub name: String,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// DNS record type
///
/// The nineteen named variants are the types ipsync knows how to filter on.
/// Anything else a provider returns is carried as [`RecordType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Txt,
    Srv,
    Mx,
    Ns,
    Ptr,
    Caa,
    Cert,
    Dnskey,
    Ds,
    Loc,
    Naptr,
    Smimea,
    Sshfp,
    Svcb,
    Tlsa,
    Uri,
    /// A type string outside the supported set, kept verbatim
    Other(String),
}

impl RecordType {
    /// Every supported type, in the order records are fetched
    pub const SUPPORTED: [RecordType; 19] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Txt,
        RecordType::Srv,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Ptr,
        RecordType::Caa,
        RecordType::Cert,
        RecordType::Dnskey,
        RecordType::Ds,
        RecordType::Loc,
        RecordType::Naptr,
        RecordType::Smimea,
        RecordType::Sshfp,
        RecordType::Svcb,
        RecordType::Tlsa,
        RecordType::Uri,
    ];

    /// Wire representation (upper case)
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Caa => "CAA",
            RecordType::Cert => "CERT",
            RecordType::Dnskey => "DNSKEY",
            RecordType::Ds => "DS",
            RecordType::Loc => "LOC",
            RecordType::Naptr => "NAPTR",
            RecordType::Smimea => "SMIMEA",
            RecordType::Sshfp => "SSHFP",
            RecordType::Svcb => "SVCB",
            RecordType::Tlsa => "TLSA",
            RecordType::Uri => "URI",
            RecordType::Other(name) => name,
        }
    }

    /// Look up a supported type by name, ignoring case
    pub fn supported(name: &str) -> Option<RecordType> {
        let upper = name.trim().to_ascii_uppercase();
        Self::SUPPORTED
            .into_iter()
            .find(|candidate| candidate.as_str() == upper)
    }

    /// Whether `types` selects every supported type
    pub fn covers_all(types: &[RecordType]) -> bool {
        Self::SUPPORTED.iter().all(|t| types.contains(t))
    }

    /// Whether the provider's proxy flag applies to this type
    pub fn supports_proxied(&self) -> bool {
        matches!(self, RecordType::A | RecordType::Aaaa | RecordType::Cname)
    }
}

impl Default for RecordType {
    fn default() -> Self {
        RecordType::Other(String::new())
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        RecordType::supported(&value).unwrap_or(RecordType::Other(value))
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    /// Strict parse used for configuration: unknown names are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::supported(s).ok_or_else(|| {
            crate::Error::config(format!("Unsupported record type: '{}'", s.trim()))
        })
    }
}

/// A DNS record as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider record identifier
    #[serde(default, deserialize_with = "string_or_null")]
    pub id: String,

    /// Owning zone identifier
    #[serde(default, deserialize_with = "string_or_null")]
    pub zone_id: String,

    /// Record type
    #[serde(rename = "type", default)]
    pub record_type: RecordType,

    /// Fully qualified record name
    #[serde(default, deserialize_with = "string_or_null")]
    pub name: String,

    /// Record content (address, text, target, ...)
    #[serde(default, deserialize_with = "string_or_null")]
    pub content: String,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Proxy flag, meaningful only for A/AAAA/CNAME
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,

    /// Every other field the provider returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DnsRecord {
    pub fn new(
        id: impl Into<String>,
        record_type: RecordType,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            zone_id: String::new(),
            record_type,
            name: name.into(),
            content: content.into(),
            ttl: DEFAULT_TTL,
            proxied: None,
            extra: Map::new(),
        }
    }

    pub fn with_zone_id(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = zone_id.into();
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = Some(proxied);
        self
    }

    /// Attach a provider-specific field
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// A record missing its id, name or content cannot be reconciled
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty() && !self.content.is_empty()
    }
}

/// JSON body of a create or replace call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordPayload(Map<String, Value>);

impl RecordPayload {
    /// Full-record replace carrying `new_content`
    ///
    /// `proxied` is only sent for types that support it; `priority` is
    /// carried over when the record has one.
    pub fn replacing_content(record: &DnsRecord, new_content: &str) -> Self {
        let mut body = Map::new();
        body.insert("type".into(), Value::from(record.record_type.as_str()));
        body.insert("name".into(), Value::from(record.name.as_str()));
        body.insert("content".into(), Value::from(new_content));
        body.insert("ttl".into(), Value::from(record.ttl));
        if record.record_type.supports_proxied() {
            body.insert("proxied".into(), Value::from(record.proxied.unwrap_or(false)));
        }
        if let Some(priority) = record.extra.get("priority").filter(|p| !p.is_null()) {
            body.insert("priority".into(), priority.clone());
        }
        Self(body)
    }

    /// Replay body for a backed-up record, minus server-managed fields
    pub fn from_snapshot(record: &DnsRecord) -> crate::Result<Self> {
        let mut body = match serde_json::to_value(record)? {
            Value::Object(map) => map,
            other => {
                return Err(crate::Error::data(format!(
                    "record serialized to {} instead of an object",
                    other
                )));
            }
        };
        for field in SERVER_MANAGED_FIELDS {
            body.remove(*field);
        }
        Ok(Self(body))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `content` field, if present and a string
    pub fn content(&self) -> Option<&str> {
        self.0.get("content").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}
