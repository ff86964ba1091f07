//! Test doubles and common utilities for contract tests
//!
//! `MockDnsProvider` keeps zones and records in memory, applies replace and
//! create calls to that state, counts every call, and can be told to fail
//! specific operations.

#![allow(dead_code)]

use async_trait::async_trait;
use ipsync_core::error::{Error, Result};
use ipsync_core::{DnsProvider, DnsRecord, RecordPayload, RecordType, RunConfig, Zone};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// A replace or create call as seen by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct MutationCall {
    pub zone_id: String,
    /// `None` for creates
    pub record_id: Option<String>,
    pub payload: RecordPayload,
}

#[derive(Default)]
struct MockState {
    zones: Vec<Zone>,
    records: Vec<DnsRecord>,
    list_zone_calls: usize,
    list_record_calls: Vec<(String, Option<RecordType>)>,
    mutations: Vec<MutationCall>,
    next_id: usize,
    fail_list_zones: bool,
    fail_list: HashSet<(String, Option<String>)>,
    fail_updates: HashSet<String>,
}

/// In-memory provider
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().zones.push(Zone::new(id, name));
        self
    }

    /// Add a record to zone `zone_id`
    pub fn with_record(self, zone_id: &str, record: DnsRecord) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .push(record.with_zone_id(zone_id));
        self
    }

    /// Make `list_zones` fail
    pub fn failing_zone_list(self) -> Self {
        self.state.lock().unwrap().fail_list_zones = true;
        self
    }

    /// Make `list_records(zone_id, record_type)` fail (`None` = unfiltered)
    pub fn failing_list(self, zone_id: &str, record_type: Option<RecordType>) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_list
            .insert((zone_id.to_string(), record_type.map(String::from)));
        self
    }

    /// Make replace calls for `record_id` fail
    pub fn failing_update(self, record_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_updates
            .insert(record_id.to_string());
        self
    }

    pub fn mutations(&self) -> Vec<MutationCall> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.state.lock().unwrap().mutations.len()
    }

    pub fn list_zone_calls(&self) -> usize {
        self.state.lock().unwrap().list_zone_calls
    }

    pub fn list_record_calls(&self) -> Vec<(String, Option<RecordType>)> {
        self.state.lock().unwrap().list_record_calls.clone()
    }

    /// Current content of `record_id`
    pub fn content_of(&self, record_id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id == record_id)
            .map(|r| r.content.clone())
    }

    /// Snapshot of every stored record
    pub fn records(&self) -> Vec<DnsRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Remove a record, as if someone deleted it out of band
    pub fn delete(&self, record_id: &str) {
        self.state
            .lock()
            .unwrap()
            .records
            .retain(|r| r.id != record_id);
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self, filter_name: Option<&str>) -> Result<Vec<Zone>> {
        let mut state = self.state.lock().unwrap();
        state.list_zone_calls += 1;
        if state.fail_list_zones {
            return Err(Error::transport("connection refused"));
        }
        Ok(state
            .zones
            .iter()
            .filter(|z| filter_name.is_none_or(|name| z.name == name))
            .cloned()
            .collect())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        record_type: Option<&RecordType>,
    ) -> Result<Vec<DnsRecord>> {
        let mut state = self.state.lock().unwrap();
        state
            .list_record_calls
            .push((zone_id.to_string(), record_type.cloned()));

        let key = (zone_id.to_string(), record_type.map(|t| t.as_str().to_string()));
        if state.fail_list.contains(&key) {
            return Err(Error::provider("mock", "list failed"));
        }

        Ok(state
            .records
            .iter()
            .filter(|r| r.zone_id == zone_id)
            .filter(|r| record_type.is_none_or(|t| &r.record_type == t))
            .cloned()
            .collect())
    }

    async fn replace_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(MutationCall {
            zone_id: zone_id.to_string(),
            record_id: Some(record_id.to_string()),
            payload: payload.clone(),
        });

        if state.fail_updates.contains(record_id) {
            return Err(Error::provider("mock", "update rejected"));
        }

        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == record_id && r.zone_id == zone_id)
            .ok_or_else(|| Error::not_found(format!("record {}", record_id)))?;

        if let Some(content) = payload.content() {
            record.content = content.to_string();
        }
        if let Some(name) = payload.get("name").and_then(Value::as_str) {
            record.name = name.to_string();
        }
        if let Some(ttl) = payload.get("ttl").and_then(Value::as_u64) {
            record.ttl = ttl as u32;
        }
        if let Some(proxied) = payload.get("proxied").and_then(Value::as_bool) {
            record.proxied = Some(proxied);
        }
        Ok(())
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(MutationCall {
            zone_id: zone_id.to_string(),
            record_id: None,
            payload: payload.clone(),
        });

        let mut record: DnsRecord = serde_json::from_value(Value::Object(payload.as_map().clone()))?;
        state.next_id += 1;
        record.id = format!("created-{}", state.next_id);
        record.zone_id = zone_id.to_string();
        state.records.push(record);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Live-mode configuration pinning A records to `desired_ip`
pub fn live_config(desired_ip: &str) -> RunConfig {
    RunConfig::new("test-token-abcdefghijklmnop", desired_ip).with_censor(false)
}

pub fn a(id: &str, name: &str, content: &str) -> DnsRecord {
    DnsRecord::new(id, RecordType::A, name, content)
}

pub fn txt(id: &str, name: &str, content: &str) -> DnsRecord {
    DnsRecord::new(id, RecordType::Txt, name, content)
}
