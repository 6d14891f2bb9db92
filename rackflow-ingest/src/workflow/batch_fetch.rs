//! Fetch phase: bounded parallel enrichment with ordered results
//!
//! `min(N, len)` workers pull indices from a shared atomic cursor. Each
//! worker keeps its own `(index, row)` list; the lists are merged into
//! index slots once every worker has finished, so output order always
//! equals input order.

use super::RunError;
use crate::models::{AssetId, BatchRow};
use crate::normalize::normalize;
use crate::services::Enricher;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Row error when the work-order session has expired
pub const AUTH_EXPIRED_MESSAGE: &str =
    "Work order service auth expired: reauthenticate with the work order service, then re-run.";

/// Row error when no usable work order came back
pub const NO_RESULT_MESSAGE: &str = "No work order result";

/// Ordered fetch-phase outcome for a whole batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchFetchReport {
    pub rows: Vec<BatchRow>,
}

impl BatchFetchReport {
    /// Any row rejected by the work-order service as unauthenticated
    pub fn auth_expired(&self) -> bool {
        self.rows.iter().any(|r| r.auth_expired)
    }

    /// Fail the whole batch once if the session expired
    pub fn ensure_authorized(&self) -> Result<(), RunError> {
        if self.auth_expired() {
            Err(RunError::AuthExpired {
                message: AUTH_EXPIRED_MESSAGE.to_string(),
            })
        } else {
            Ok(())
        }
    }

    pub fn writable_rows(&self) -> impl Iterator<Item = &BatchRow> {
        self.rows.iter().filter(|r| r.is_writable())
    }

    pub fn skipped_rows(&self) -> impl Iterator<Item = &BatchRow> {
        self.rows.iter().filter(|r| !r.is_writable())
    }
}

/// Enrich and normalize every id with at most `concurrency` in flight
pub async fn fetch_batch(
    ids: &[AssetId],
    concurrency: usize,
    enricher: &dyn Enricher,
) -> BatchFetchReport {
    if ids.is_empty() {
        return BatchFetchReport::default();
    }

    let workers = concurrency.clamp(1, ids.len());
    let cursor = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);

    info!(total = ids.len(), workers, "Fetching work orders");

    let worker_results = join_all((0..workers).map(|worker| {
        let cursor = &cursor;
        let completed = &completed;
        async move {
            let mut local = Vec::new();
            loop {
                let idx = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(asset_id) = ids.get(idx) else {
                    break;
                };

                let row = fetch_row(asset_id, enricher).await;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(worker, asset_id = %asset_id, ok = row.ok, done, total = ids.len(), "Fetched");

                local.push((idx, row));
            }
            local
        }
    }))
    .await;

    let mut slots: Vec<Option<BatchRow>> = vec![None; ids.len()];
    for (idx, row) in worker_results.into_iter().flatten() {
        slots[idx] = Some(row);
    }

    let rows: Vec<BatchRow> = slots.into_iter().flatten().collect();
    let ok = rows.iter().filter(|r| r.ok).count();
    info!(total = rows.len(), ok, skipped = rows.len() - ok, "Fetch phase complete");

    BatchFetchReport { rows }
}

async fn fetch_row(asset_id: &AssetId, enricher: &dyn Enricher) -> BatchRow {
    let result = enricher.enrich(asset_id).await;
    let field_map = normalize(&result);
    let ok = field_map.is_some();

    let error = if ok {
        None
    } else if result.auth_expired {
        warn!(asset_id = %asset_id, "Work order service rejected the session");
        Some(AUTH_EXPIRED_MESSAGE.to_string())
    } else {
        match &result.work_order_error {
            Some(e) => {
                warn!(asset_id = %asset_id, error = %e, "Work order lookup failed");
                Some(format!("{}: {}", NO_RESULT_MESSAGE, e))
            }
            None => Some(NO_RESULT_MESSAGE.to_string()),
        }
    };

    BatchRow {
        asset_id: result.asset_id,
        ok,
        error,
        field_map,
        auth_expired: result.auth_expired,
        work_order_status: result.work_order_status,
        inventory_status: result.inventory_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichmentResult, WorkOrderRecord};
    use async_trait::async_trait;

    struct StaticEnricher;

    #[async_trait]
    impl Enricher for StaticEnricher {
        async fn enrich(&self, asset_id: &AssetId) -> EnrichmentResult {
            let mut result = EnrichmentResult::new(asset_id.clone());
            match asset_id.as_str() {
                "0000000001" => {
                    result.work_order_ok = true;
                    result.work_order = Some(WorkOrderRecord {
                        location: Some("CMH059".to_string()),
                        position: Some("CMH59.1.1".to_string()),
                        ..Default::default()
                    });
                }
                "0000000002" => {
                    result.work_order_ok = true;
                }
                "0000000003" => {
                    result.work_order_status = Some(500);
                    result.work_order_error = Some("HTTP 500".to_string());
                }
                _ => {
                    result.work_order_status = Some(403);
                    result.auth_expired = true;
                    result.work_order_error = Some("auth".to_string());
                }
            }
            result
        }
    }

    fn ids(raw: &[&str]) -> Vec<AssetId> {
        raw.iter().map(|s| AssetId::parse(s).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = fetch_batch(&[], 4, &StaticEnricher).await;
        assert!(report.rows.is_empty());
        assert!(report.ensure_authorized().is_ok());
    }

    #[tokio::test]
    async fn test_row_errors() {
        let report = fetch_batch(
            &ids(&["0000000001", "0000000002", "0000000003"]),
            4,
            &StaticEnricher,
        )
        .await;

        assert!(report.rows[0].ok);
        assert!(report.rows[0].error.is_none());

        // ok response without a record
        assert!(!report.rows[1].ok);
        assert_eq!(report.rows[1].error.as_deref(), Some(NO_RESULT_MESSAGE));

        assert_eq!(
            report.rows[2].error.as_deref(),
            Some("No work order result: HTTP 500")
        );
        assert_eq!(report.rows[2].work_order_status, Some(500));

        assert_eq!(report.writable_rows().count(), 1);
        assert_eq!(report.skipped_rows().count(), 2);
    }

    #[tokio::test]
    async fn test_auth_expired_fails_batch_once() {
        let report = fetch_batch(&ids(&["0000000001", "0000000009"]), 0, &StaticEnricher).await;

        assert_eq!(report.rows.len(), 2);
        assert!(report.auth_expired());
        assert_eq!(report.rows[1].error.as_deref(), Some(AUTH_EXPIRED_MESSAGE));
        assert_eq!(
            report.ensure_authorized(),
            Err(RunError::AuthExpired {
                message: AUTH_EXPIRED_MESSAGE.to_string()
            })
        );
    }
}
