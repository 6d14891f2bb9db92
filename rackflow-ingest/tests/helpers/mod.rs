//! Test Helper Utilities
//!
//! Scripted enricher and recording writer shared by the workflow tests

#![allow(dead_code)]

use async_trait::async_trait;
use rackflow_ingest::models::{AssetId, BatchRow, EnrichmentResult, WorkOrderRecord};
use rackflow_ingest::normalize::normalize;
use rackflow_ingest::services::Enricher;
use rackflow_ingest::writer::{EnumSelection, RecordWriter, WriteError};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Asset id from a small number, zero-padded to ten digits
pub fn asset(n: u64) -> AssetId {
    AssetId::parse(&format!("{:010}", n)).unwrap()
}

/// Work order placing asset `n` in CMH059
pub fn work_order(n: u64) -> WorkOrderRecord {
    WorkOrderRecord {
        work_order_id: Some(format!("WO-{}", n)),
        scanned_date: None,
        location: Some("CMH059".to_string()),
        position: Some(format!("CMH59.12.{}", n)),
        brick_name: Some(format!("brick-{}", n)),
        rack_type: Some("GB300 compute".to_string()),
        uplink_config: Some("Fabric A: 4x400G".to_string()),
        vendor: Some("Acme".to_string()),
    }
}

/// What the scripted enricher does for one asset
#[derive(Debug, Clone)]
pub enum Script {
    Found(WorkOrderRecord),
    NotFound,
    Failed(u16),
    AuthExpired,
}

/// Enricher answering from a script, with optional per-asset latency
#[derive(Default)]
pub struct ScriptedEnricher {
    scripts: HashMap<AssetId, Script>,
    delays: HashMap<AssetId, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, asset_id: AssetId, script: Script) -> Self {
        self.scripts.insert(asset_id, script);
        self
    }

    pub fn with_delay(mut self, asset_id: AssetId, delay: Duration) -> Self {
        self.delays.insert(asset_id, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enricher for ScriptedEnricher {
    async fn enrich(&self, asset_id: &AssetId) -> EnrichmentResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(asset_id) {
            tokio::time::sleep(*delay).await;
        }

        let mut result = EnrichmentResult::new(asset_id.clone());
        match self.scripts.get(asset_id) {
            Some(Script::Found(record)) => {
                result.work_order_ok = true;
                result.work_order_status = Some(200);
                result.work_order = Some(record.clone());
            }
            None => {
                let n: u64 = asset_id.as_str().parse().unwrap();
                result.work_order_ok = true;
                result.work_order_status = Some(200);
                result.work_order = Some(work_order(n));
            }
            Some(Script::NotFound) => {
                result.work_order_ok = true;
                result.work_order_status = Some(200);
            }
            Some(Script::Failed(status)) => {
                result.work_order_status = Some(*status);
                result.work_order_error = Some(format!("API error {}: upstream", status));
            }
            Some(Script::AuthExpired) => {
                result.work_order_status = Some(403);
                result.auth_expired = true;
                result.work_order_error = Some("Authentication expired (HTTP 403)".to_string());
            }
        }
        result.inventory_ok = true;
        result.inventory_status = Some(200);
        result.sla_minutes = Some(120.0);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Writable rows for assets `1..=count`
pub fn rows(count: u64) -> Vec<BatchRow> {
    (1..=count)
        .map(|n| {
            let mut result = EnrichmentResult::new(asset(n));
            result.work_order_ok = true;
            result.work_order = Some(work_order(n));
            result.sla_minutes = Some(60.0);
            let field_map = normalize(&result);
            BatchRow {
                asset_id: asset(n),
                ok: true,
                error: None,
                field_map,
                auth_expired: false,
                work_order_status: Some(200),
                inventory_status: Some(200),
            }
        })
        .collect()
}

/// Record captured by [`RecordingWriter`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedRecord {
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// Writer that records every call and can inject failures
#[derive(Default)]
pub struct RecordingWriter {
    pub calls: Vec<String>,
    pub records: Vec<CapturedRecord>,
    pub options: BTreeMap<String, Vec<String>>,
    current: Option<CapturedRecord>,
    fail_text_for: Option<String>,
    stall_ready_for: Option<String>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `set_text_field` for the asset with this id
    pub fn failing_for(mut self, asset_id: &AssetId) -> Self {
        self.fail_text_for = Some(asset_id.to_string());
        self
    }

    /// Never become ready for the record with this name
    pub fn stalling_on(mut self, name: &str) -> Self {
        self.stall_ready_for = Some(name.to_string());
        self
    }

    /// Cancel `token` once `count` records are finished
    pub fn cancel_after(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    pub fn with_options(mut self, field: &str, labels: &[&str]) -> Self {
        self.options
            .insert(field.to_string(), labels.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Number of recorded calls other than `prepare`
    pub fn write_calls(&self) -> usize {
        self.calls.iter().filter(|c| *c != "prepare").count()
    }

    fn open(&mut self) -> Result<&mut CapturedRecord, WriteError> {
        self.current.as_mut().ok_or(WriteError::NoOpenRecord)
    }
}

#[async_trait]
impl RecordWriter for RecordingWriter {
    async fn prepare(&mut self) -> Result<(), WriteError> {
        self.calls.push("prepare".to_string());
        self.current = None;
        Ok(())
    }

    async fn create_record(&mut self, name: &str) -> Result<(), WriteError> {
        self.calls.push(format!("create:{}", name));
        self.current = Some(CapturedRecord {
            name: name.to_string(),
            fields: BTreeMap::new(),
        });
        Ok(())
    }

    async fn wait_until_ready(&mut self) -> Result<(), WriteError> {
        self.calls.push("ready".to_string());
        let stalled = match (&self.stall_ready_for, &self.current) {
            (Some(name), Some(current)) => *name == current.name,
            _ => false,
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn set_text_field(&mut self, field: &str, value: &str) -> Result<(), WriteError> {
        self.calls.push(format!("text:{}={}", field, value));
        if field == "Asset (ID)" && self.fail_text_for.as_deref() == Some(value) {
            return Err(WriteError::FieldNotFound(field.to_string()));
        }
        self.open()?.fields.insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn set_enum_field(&mut self, field: &str, option: &str) -> Result<EnumSelection, WriteError> {
        self.calls.push(format!("enum:{}={}", field, option));
        if let Some(available) = self.options.get(field) {
            if !available.iter().any(|o| o == option) {
                return Ok(EnumSelection::NotOffered {
                    available: available.clone(),
                });
            }
        }
        self.open()?.fields.insert(field.to_string(), option.to_string());
        Ok(EnumSelection::Selected)
    }

    async fn set_date_field(&mut self, field: &str, month_day_year: &str) -> Result<(), WriteError> {
        self.calls.push(format!("date:{}={}", field, month_day_year));
        self.open()?
            .fields
            .insert(field.to_string(), month_day_year.to_string());
        Ok(())
    }

    async fn finish_record(&mut self) -> Result<(), WriteError> {
        self.calls.push("finish".to_string());
        let record = self.current.take().ok_or(WriteError::NoOpenRecord)?;
        self.records.push(record);

        if let Some((count, token)) = &self.cancel_after {
            if self.records.len() >= *count {
                token.cancel();
            }
        }
        Ok(())
    }
}
