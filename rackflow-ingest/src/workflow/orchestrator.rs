//! Write phase: sequential record creation with cooperative cancellation
//!
//! Rows are consumed strictly in order. Cancellation is checked only
//! between rows; a row that has started is always finished (or timed out).
//! Per-row errors are captured in the [`RunReport`] and never stop the run.

use crate::models::{BatchRow, RunReport, RunState, RunTotals, RunWarning};
use crate::writer::{write_field_map, RecordWarning, RecordWriter, WriteError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Pause between consecutive rows
pub const DEFAULT_ROW_DELAY: Duration = Duration::from_millis(200);

/// Upper bound for writing a single row
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound for a new record to accept field edits
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(8);

/// Drives a [`RecordWriter`] over a batch of rows
#[derive(Debug, Clone)]
pub struct RunOrchestrator {
    row_delay: Duration,
    write_timeout: Duration,
    ready_timeout: Duration,
}

impl Default for RunOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_DELAY, DEFAULT_WRITE_TIMEOUT)
    }
}

impl RunOrchestrator {
    pub fn new(row_delay: Duration, write_timeout: Duration) -> Self {
        Self {
            row_delay,
            write_timeout,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    pub fn with_ready_timeout(mut self, ready_timeout: Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    /// Write every row in order.
    ///
    /// `on_progress` receives a snapshot of the totals at start, after each
    /// row, and once more when the run ends.
    pub async fn run<W, F>(
        &self,
        rows: &[BatchRow],
        writer: &mut W,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> RunReport
    where
        W: RecordWriter + ?Sized,
        F: FnMut(RunTotals),
    {
        let mut state = RunState::new();
        state.start(rows.len());

        info!(run_id = %state.run_id, total = rows.len(), "Write phase started");
        on_progress(state.totals);

        for (idx, row) in rows.iter().enumerate() {
            if cancel.is_cancelled() {
                state.cancel_requested = true;
                info!(run_id = %state.run_id, done = state.totals.done, "Stop requested; remaining rows not written");
                break;
            }

            match self.write_row(row, writer).await {
                Ok(warnings) => {
                    debug!(asset_id = %row.asset_id, warnings = warnings.len(), "Row written");
                    state.record_success(warnings.into_iter().map(|w| stamp(row, w)));
                }
                Err(e) => {
                    warn!(asset_id = %row.asset_id, error = %e, "Row failed");
                    state.record_failure(row.asset_id.clone(), e.to_string());
                    if let Err(e) = writer.prepare().await {
                        warn!(asset_id = %row.asset_id, error = %e, "Writer reset after failure did not succeed");
                    }
                }
            }

            state.mark_done();
            on_progress(state.totals);

            if idx + 1 < rows.len() && !self.row_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.row_delay) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        state.finish();
        on_progress(state.totals);

        let report = state.report();
        info!(
            run_id = %report.run_id,
            phase = ?report.phase,
            total = report.totals.total,
            done = report.totals.done,
            ok = report.totals.ok,
            failed = report.totals.failed,
            "Write phase finished"
        );
        report
    }

    async fn write_row<W>(&self, row: &BatchRow, writer: &mut W) -> Result<Vec<RecordWarning>, WriteError>
    where
        W: RecordWriter + ?Sized,
    {
        let map = row.field_map.as_ref().ok_or_else(|| {
            WriteError::Other(
                row.error
                    .clone()
                    .unwrap_or_else(|| "No field map for row".to_string()),
            )
        })?;

        writer.prepare().await?;

        tokio::time::timeout(self.write_timeout, write_field_map(writer, map, self.ready_timeout))
            .await
            .map_err(|_| WriteError::Timeout(format!("row not written after {:?}", self.write_timeout)))?
    }
}

fn stamp(row: &BatchRow, warning: RecordWarning) -> RunWarning {
    RunWarning {
        asset_id: row.asset_id.to_string(),
        code: warning.code,
        message: warning.message,
    }
}
