//! Fetch phase ordering, bounding and row errors

mod helpers;

use helpers::{asset, Script, ScriptedEnricher};
use rackflow_ingest::workflow::{fetch_batch, RunError, AUTH_EXPIRED_MESSAGE};
use std::time::Duration;

#[tokio::test]
async fn output_order_matches_input_under_reordered_completion() {
    let ids: Vec<_> = (1..=6).map(asset).collect();

    // Early ids finish last
    let enricher = ScriptedEnricher::new()
        .with_delay(asset(1), Duration::from_millis(120))
        .with_delay(asset(2), Duration::from_millis(90))
        .with_delay(asset(3), Duration::from_millis(60))
        .with_delay(asset(4), Duration::from_millis(30));

    let report = fetch_batch(&ids, 3, &enricher).await;

    let order: Vec<_> = report.rows.iter().map(|r| r.asset_id.clone()).collect();
    assert_eq!(order, ids);
    assert!(report.rows.iter().all(|r| r.ok));
    assert_eq!(enricher.calls(), 6);
}

#[tokio::test]
async fn in_flight_bounded_by_concurrency() {
    let ids: Vec<_> = (1..=10).map(asset).collect();
    let mut enricher = ScriptedEnricher::new();
    for id in &ids {
        enricher = enricher.with_delay(id.clone(), Duration::from_millis(20));
    }

    let report = fetch_batch(&ids, 2, &enricher).await;

    assert_eq!(report.rows.len(), 10);
    assert!(enricher.max_in_flight() <= 2);
}

#[tokio::test]
async fn concurrency_larger_than_batch() {
    let ids = vec![asset(7)];
    let enricher = ScriptedEnricher::new();

    let report = fetch_batch(&ids, 16, &enricher).await;

    assert_eq!(report.rows.len(), 1);
    assert_eq!(enricher.max_in_flight(), 1);
}

#[tokio::test]
async fn auth_expired_row_still_completes_phase() {
    let ids: Vec<_> = (1..=4).map(asset).collect();
    let enricher = ScriptedEnricher::new()
        .with(asset(2), Script::AuthExpired)
        .with(asset(3), Script::AuthExpired);

    let report = fetch_batch(&ids, 4, &enricher).await;

    assert_eq!(report.rows.len(), 4);
    assert_eq!(enricher.calls(), 4);
    assert!(report.rows[0].ok);
    assert_eq!(report.rows[1].error.as_deref(), Some(AUTH_EXPIRED_MESSAGE));
    assert!(matches!(
        report.ensure_authorized(),
        Err(RunError::AuthExpired { .. })
    ));
}

#[tokio::test]
async fn failed_lookup_keeps_source_error() {
    let ids = vec![asset(1), asset(2)];
    let enricher = ScriptedEnricher::new()
        .with(asset(1), Script::Failed(502))
        .with(asset(2), Script::NotFound);

    let report = fetch_batch(&ids, 2, &enricher).await;

    assert_eq!(
        report.rows[0].error.as_deref(),
        Some("No work order result: API error 502: upstream")
    );
    assert_eq!(report.rows[0].work_order_status, Some(502));
    assert_eq!(report.rows[1].error.as_deref(), Some("No work order result"));
    assert_eq!(report.writable_rows().count(), 0);
}
