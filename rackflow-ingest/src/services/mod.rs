//! External source clients
//!
//! - Work-order (installation) service: placement and configuration
//! - Inventory service: SLA countdown
//! - [`Enricher`]: both queried concurrently for one asset

pub mod enrichment;
pub mod inventory_client;
pub mod source_error;
pub mod work_order_client;

pub use enrichment::{Enricher, HttpEnricher};
pub use inventory_client::InventoryClient;
pub use source_error::{Fetched, SourceError};
pub use work_order_client::WorkOrderClient;
