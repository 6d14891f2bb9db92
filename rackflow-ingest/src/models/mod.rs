//! Data models for rackflow-ingest
//!
//! - Asset identifiers and input parsing
//! - Raw enrichment results from the external sources
//! - Normalized field maps and fetch-phase rows
//! - Write-phase run state machine

pub mod asset_id;
pub mod enrichment;
pub mod field_map;
pub mod run_state;

pub use asset_id::{parse_asset_ids, AssetId, InvalidAssetId, ParsedAssetIds};
pub use enrichment::{EnrichmentResult, WorkOrderRecord};
pub use field_map::{BatchRow, FieldMap, SlaDate};
pub use run_state::{RunFailure, RunPhase, RunReport, RunState, RunTotals, RunWarning};
