//! Raw per-asset enrichment data as returned by the two external sources

use super::AssetId;
use serde::{Deserialize, Serialize};

/// Selected work-order search result (installation service)
///
/// Every field is optional: the search result payload is loosely typed
/// and may omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderRecord {
    pub work_order_id: Option<String>,
    pub scanned_date: Option<String>,
    pub location: Option<String>,
    pub position: Option<String>,
    pub brick_name: Option<String>,
    pub rack_type: Option<String>,
    pub uplink_config: Option<String>,
    pub vendor: Option<String>,
}

/// Outcome of querying both sources for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub asset_id: AssetId,
    /// Work-order call completed with a 2xx response
    pub work_order_ok: bool,
    /// Inventory call completed with a 2xx response
    pub inventory_ok: bool,
    /// HTTP status of the work-order call (None on transport failure)
    pub work_order_status: Option<u16>,
    /// HTTP status of the inventory call (None on transport failure)
    pub inventory_status: Option<u16>,
    /// Work-order call was rejected with an expired-credential response
    pub auth_expired: bool,
    /// Error text of a failed work-order call
    pub work_order_error: Option<String>,
    /// None when the search found nothing or the call failed
    pub work_order: Option<WorkOrderRecord>,
    /// Minutes until handoff deadline (negative when overdue)
    pub sla_minutes: Option<f64>,
}

impl EnrichmentResult {
    /// Empty result for an asset; both sources not-ok until filled in
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            work_order_ok: false,
            inventory_ok: false,
            work_order_status: None,
            inventory_status: None,
            auth_expired: false,
            work_order_error: None,
            work_order: None,
            sla_minutes: None,
        }
    }
}
