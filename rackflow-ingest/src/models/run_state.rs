//! Write-phase run state machine
//!
//! A run progresses Idle → Running → Completed | Stopped. The state is
//! owned by the orchestrator for the duration of one batch and consumed
//! into a [`RunReport`] when the run ends.

use super::AssetId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Write-phase lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunPhase {
    /// Created, no rows consumed yet
    Idle,
    /// Consuming rows
    Running,
    /// Every row was consumed
    Completed,
    /// Cancellation observed between rows
    Stopped,
}

/// Counters reported with every progress callback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub total: usize,
    pub done: usize,
    pub ok: usize,
    pub failed: usize,
}

/// A row the writer could not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    pub asset_id: AssetId,
    pub error: String,
}

/// Advisory condition reported for a row; does not affect counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunWarning {
    /// Raw token for input warnings, asset id otherwise
    pub asset_id: String,
    pub code: String,
    pub message: String,
}

/// Mutable state for one write-phase execution
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: Uuid,
    pub phase: RunPhase,
    pub is_running: bool,
    pub cancel_requested: bool,
    pub totals: RunTotals,
    pub failures: Vec<RunFailure>,
    pub warnings: Vec<RunWarning>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            phase: RunPhase::Idle,
            is_running: false,
            cancel_requested: false,
            totals: RunTotals::default(),
            failures: Vec::new(),
            warnings: Vec::new(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Idle → Running, resetting counters for `total` rows
    pub fn start(&mut self, total: usize) {
        self.phase = RunPhase::Running;
        self.is_running = true;
        self.cancel_requested = false;
        self.totals = RunTotals {
            total,
            ..RunTotals::default()
        };
        self.failures.clear();
        self.warnings.clear();
        self.started_at = Some(Utc::now());
        self.ended_at = None;
    }

    pub fn record_success(&mut self, warnings: impl IntoIterator<Item = RunWarning>) {
        self.totals.ok += 1;
        self.warnings.extend(warnings);
    }

    pub fn record_failure(&mut self, asset_id: AssetId, error: String) {
        self.totals.failed += 1;
        self.failures.push(RunFailure { asset_id, error });
    }

    pub fn mark_done(&mut self) {
        self.totals.done += 1;
    }

    /// Running → Completed, or Stopped when cancellation was observed
    pub fn finish(&mut self) {
        self.is_running = false;
        self.phase = if self.cancel_requested {
            RunPhase::Stopped
        } else {
            RunPhase::Completed
        };
        self.ended_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, RunPhase::Completed | RunPhase::Stopped)
    }

    /// Snapshot of the final state
    pub fn report(&self) -> RunReport {
        RunReport {
            run_id: self.run_id,
            phase: self.phase,
            totals: self.totals,
            failures: self.failures.clone(),
            warnings: self.warnings.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Final result of one write-phase run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    pub phase: RunPhase,
    pub totals: RunTotals,
    pub failures: Vec<RunFailure>,
    pub warnings: Vec<RunWarning>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn stopped(&self) -> bool {
        self.phase == RunPhase::Stopped
    }
}
