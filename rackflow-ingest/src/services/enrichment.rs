//! Per-asset enrichment: both sources queried concurrently

use super::inventory_client::InventoryClient;
use super::work_order_client::WorkOrderClient;
use crate::models::{AssetId, EnrichmentResult};
use async_trait::async_trait;

/// Produces the raw enrichment result for one asset.
///
/// Implementations never fail: every source failure is recorded in the
/// returned [`EnrichmentResult`].
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, asset_id: &AssetId) -> EnrichmentResult;
}

/// Enricher backed by the work-order and inventory HTTP services
pub struct HttpEnricher {
    work_orders: WorkOrderClient,
    inventory: InventoryClient,
}

impl HttpEnricher {
    pub fn new(work_orders: WorkOrderClient, inventory: InventoryClient) -> Self {
        Self {
            work_orders,
            inventory,
        }
    }
}

#[async_trait]
impl Enricher for HttpEnricher {
    async fn enrich(&self, asset_id: &AssetId) -> EnrichmentResult {
        let (work_order, sla) = tokio::join!(
            self.work_orders.find_work_order(asset_id),
            self.inventory.fetch_sla_minutes(asset_id),
        );

        let mut result = EnrichmentResult::new(asset_id.clone());

        match work_order {
            Ok(fetched) => {
                result.work_order_ok = true;
                result.work_order_status = Some(fetched.status);
                result.work_order = fetched.value;
            }
            Err(e) => {
                result.work_order_status = e.status();
                result.auth_expired = e.is_auth_expired();
                result.work_order_error = Some(e.to_string());
            }
        }

        match sla {
            Ok(fetched) => {
                result.inventory_ok = true;
                result.inventory_status = Some(fetched.status);
                result.sla_minutes = fetched.value;
            }
            Err(e) => {
                result.inventory_status = e.status();
                tracing::debug!(asset_id = %asset_id, error = %e, "SLA unavailable; SLA fields will be empty");
            }
        }

        result
    }
}
