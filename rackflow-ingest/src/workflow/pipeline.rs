//! Intake pipeline: parse → fetch → auth check → write
//!
//! # Example
//! ```rust,ignore
//! let pipeline = IntakePipeline::new(enricher, 4, RunOrchestrator::default());
//! let summary = pipeline.run(&text, &mut writer, &cancel, |t| println!("{:?}", t)).await?;
//! ```

use super::batch_fetch::{fetch_batch, BatchFetchReport};
use super::orchestrator::RunOrchestrator;
use super::RunError;
use crate::models::{parse_asset_ids, AssetId, BatchRow, RunReport, RunTotals, RunWarning};
use crate::services::Enricher;
use crate::writer::RecordWriter;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Warning code for an input token that is not an asset id
pub const INVALID_ASSET_ID: &str = "INVALID_ASSET_ID";

const INVALID_ASSET_ID_MESSAGE: &str = "Not exactly 10 digits";

/// Asset left out of the write phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub asset_id: AssetId,
    pub error: String,
    pub work_order_status: Option<u16>,
    pub inventory_status: Option<u16>,
}

impl From<&BatchRow> for SkippedRow {
    fn from(row: &BatchRow) -> Self {
        Self {
            asset_id: row.asset_id.clone(),
            error: row.error.clone().unwrap_or_default(),
            work_order_status: row.work_order_status,
            inventory_status: row.inventory_status,
        }
    }
}

/// Everything a caller needs to report one intake
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSummary {
    /// Rejected input tokens
    pub input_warnings: Vec<RunWarning>,
    /// Assets without a usable work-order result
    pub skipped: Vec<SkippedRow>,
    /// Rows handed to the write phase, in input order
    pub rows: Vec<BatchRow>,
    /// Write-phase outcome; None for a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
}

/// Parse, enrich and write one batch of pasted asset ids
pub struct IntakePipeline {
    enricher: Arc<dyn Enricher>,
    concurrency: usize,
    orchestrator: RunOrchestrator,
}

impl IntakePipeline {
    pub fn new(enricher: Arc<dyn Enricher>, concurrency: usize, orchestrator: RunOrchestrator) -> Self {
        Self {
            enricher,
            concurrency,
            orchestrator,
        }
    }

    /// Run the whole intake and write every usable row
    pub async fn run<W, F>(
        &self,
        text: &str,
        writer: &mut W,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<IntakeSummary, RunError>
    where
        W: RecordWriter + ?Sized,
        F: FnMut(RunTotals),
    {
        let mut summary = self.prepare(text).await?;

        let report = self
            .orchestrator
            .run(&summary.rows, writer, cancel, on_progress)
            .await;
        summary.report = Some(report);

        Ok(summary)
    }

    /// Parse and fetch only; nothing is written
    pub async fn dry_run(&self, text: &str) -> Result<IntakeSummary, RunError> {
        self.prepare(text).await
    }

    async fn prepare(&self, text: &str) -> Result<IntakeSummary, RunError> {
        let parsed = parse_asset_ids(text);

        let input_warnings: Vec<RunWarning> = parsed
            .invalid
            .iter()
            .map(|token| RunWarning {
                asset_id: token.clone(),
                code: INVALID_ASSET_ID.to_string(),
                message: INVALID_ASSET_ID_MESSAGE.to_string(),
            })
            .collect();

        if !parsed.invalid.is_empty() {
            warn!(count = parsed.invalid.len(), tokens = ?parsed.invalid, "Ignoring invalid asset ids");
        }

        if parsed.valid.is_empty() {
            return Err(RunError::NoValidIdentifiers {
                invalid: parsed.invalid,
            });
        }

        let fetched: BatchFetchReport =
            fetch_batch(&parsed.valid, self.concurrency, self.enricher.as_ref()).await;
        fetched.ensure_authorized()?;

        let skipped: Vec<SkippedRow> = fetched.skipped_rows().map(SkippedRow::from).collect();
        let rows: Vec<BatchRow> = fetched.writable_rows().cloned().collect();

        if rows.is_empty() {
            return Err(RunError::NoRecordsFound);
        }

        info!(
            valid = parsed.valid.len(),
            invalid = input_warnings.len(),
            writable = rows.len(),
            skipped = skipped.len(),
            "Batch ready"
        );

        Ok(IntakeSummary {
            input_warnings,
            skipped,
            rows,
            report: None,
        })
    }
}
