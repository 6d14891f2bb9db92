//! Intake workflow
//!
//! Processes a batch of asset identifiers in two phases:
//! - **Fetch**: bounded worker pool enriches and normalizes every asset,
//!   preserving input order ([`batch_fetch`])
//! - **Write**: rows are written one at a time through a [`RecordWriter`]
//!   with cooperative cancellation ([`orchestrator`])
//!
//! [`pipeline`] glues parsing, both phases and the auth check together.
//!
//! [`RecordWriter`]: crate::writer::RecordWriter

pub mod batch_fetch;
pub mod orchestrator;
pub mod pipeline;

pub use batch_fetch::{fetch_batch, BatchFetchReport, AUTH_EXPIRED_MESSAGE, NO_RESULT_MESSAGE};
pub use orchestrator::{
    RunOrchestrator, DEFAULT_READY_TIMEOUT, DEFAULT_ROW_DELAY, DEFAULT_WRITE_TIMEOUT,
};
pub use pipeline::{IntakePipeline, IntakeSummary, SkippedRow, INVALID_ASSET_ID};

use thiserror::Error;

/// Batch-level failure; nothing past the failing step was attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Work-order session rejected; no record was written
    #[error("{message}")]
    AuthExpired { message: String },

    /// Input contained no 10-digit identifier
    #[error("No valid asset ids found ({} invalid token(s))", invalid.len())]
    NoValidIdentifiers { invalid: Vec<String> },

    /// Every asset lacked a usable work-order result
    #[error("No records found for any asset id")]
    NoRecordsFound,
}
