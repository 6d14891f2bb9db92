//! Configuration resolution for rackflow-ingest
//!
//! Each setting resolves with CLI → ENV → TOML → default priority. The
//! command-line and environment tiers arrive together in [`Overrides`]
//! (clap reads both); the TOML tier comes from `rackflow_common::config`.

use crate::services::{HttpEnricher, InventoryClient, SourceError, WorkOrderClient};
use crate::workflow::RunOrchestrator;
use rackflow_common::config::TomlConfig;
use rackflow_common::{Error, Result};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const CONCURRENCY_RANGE: RangeInclusive<usize> = 1..=16;
pub const DEFAULT_ROW_DELAY_MS: u64 = 200;
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOG_LEVEL: &str = "rackflow_ingest=info";

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub work_order_url: Option<String>,
    pub inventory_url: Option<String>,
    pub work_order_cookie: Option<String>,
    pub inventory_cookie: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub row_delay_ms: Option<u64>,
    pub write_timeout_secs: Option<u64>,
}

/// Fully resolved settings for one intake run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub work_order_url: String,
    pub inventory_url: String,
    pub work_order_cookie: Option<String>,
    pub inventory_cookie: Option<String>,
    pub request_timeout: Duration,
    pub concurrency: usize,
    pub row_delay: Duration,
    pub write_timeout: Duration,
    pub log_level: String,
    pub options: BTreeMap<String, Vec<String>>,
}

impl IngestConfig {
    /// Merge the tiers and validate the result
    pub fn resolve(overrides: &Overrides, toml: &TomlConfig) -> Result<Self> {
        let work_order_url = required(
            "work_order_url",
            "RACKFLOW_WORK_ORDER_URL",
            non_blank(&overrides.work_order_url).or(non_blank(&toml.work_order_url)),
        )?;
        let inventory_url = required(
            "inventory_url",
            "RACKFLOW_INVENTORY_URL",
            non_blank(&overrides.inventory_url).or(non_blank(&toml.inventory_url)),
        )?;

        let concurrency = overrides
            .concurrency
            .or(toml.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        if !CONCURRENCY_RANGE.contains(&concurrency) {
            return Err(Error::Config(format!(
                "concurrency must be between {} and {}, got {}",
                CONCURRENCY_RANGE.start(),
                CONCURRENCY_RANGE.end(),
                concurrency
            )));
        }

        let request_timeout_secs = overrides
            .request_timeout_secs
            .or(toml.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be at least 1".to_string()));
        }

        let write_timeout_secs = overrides
            .write_timeout_secs
            .or(toml.write_timeout_secs)
            .unwrap_or(DEFAULT_WRITE_TIMEOUT_SECS);
        if write_timeout_secs == 0 {
            return Err(Error::Config("write_timeout_secs must be at least 1".to_string()));
        }

        let row_delay_ms = overrides
            .row_delay_ms
            .or(toml.row_delay_ms)
            .unwrap_or(DEFAULT_ROW_DELAY_MS);

        let config = Self {
            work_order_url,
            inventory_url,
            work_order_cookie: non_blank(&overrides.work_order_cookie)
                .or(non_blank(&toml.work_order_cookie)),
            inventory_cookie: non_blank(&overrides.inventory_cookie)
                .or(non_blank(&toml.inventory_cookie)),
            request_timeout: Duration::from_secs(request_timeout_secs),
            concurrency,
            row_delay: Duration::from_millis(row_delay_ms),
            write_timeout: Duration::from_secs(write_timeout_secs),
            log_level: non_blank(&toml.logging.level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            options: toml.options.clone(),
        };

        info!(
            work_order_url = %config.work_order_url,
            inventory_url = %config.inventory_url,
            concurrency = config.concurrency,
            option_fields = config.options.len(),
            "Configuration resolved"
        );

        Ok(config)
    }

    /// HTTP enricher for both external services
    pub fn build_enricher(&self) -> std::result::Result<HttpEnricher, SourceError> {
        let work_orders = WorkOrderClient::new(
            self.work_order_url.clone(),
            self.work_order_cookie.clone(),
            self.request_timeout,
        )?;
        let inventory = InventoryClient::new(
            self.inventory_url.clone(),
            self.inventory_cookie.clone(),
            self.request_timeout,
        )?;
        Ok(HttpEnricher::new(work_orders, inventory))
    }

    pub fn orchestrator(&self) -> RunOrchestrator {
        RunOrchestrator::new(self.row_delay, self.write_timeout)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(key: &str, env_var: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| {
        Error::Config(format!(
            "{} not configured. Set it using one of:\n\
             1. --{} command-line flag\n\
             2. {} environment variable\n\
             3. {} in config.toml",
            key,
            key.replace('_', "-"),
            env_var,
            key
        ))
    })
}
