//! rackflow-ingest library
//!
//! Turns a pasted list of rack asset ids into tracker records:
//! - [`models`]: asset ids, enrichment results, field maps, run state
//! - [`services`]: work-order and inventory HTTP clients
//! - [`normalize`]: raw source data → canonical field map
//! - [`workflow`]: parallel fetch phase and sequential write phase
//! - [`writer`]: record writer boundary and record layout

pub mod config;
pub mod models;
pub mod normalize;
pub mod services;
pub mod workflow;
pub mod writer;

pub use config::{IngestConfig, Overrides};
pub use workflow::{IntakePipeline, IntakeSummary, RunError};
