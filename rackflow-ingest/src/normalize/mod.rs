//! Field normalization
//!
//! Pure transformation of an [`EnrichmentResult`] into the canonical
//! [`FieldMap`]. Malformed input never fails normalization: individual
//! fields degrade to empty strings. The only case without a field map is
//! a missing work-order record.

pub mod building;
pub mod rack_position;
pub mod rack_type;
pub mod sla;
pub mod uplink;

pub use building::{normalize_building, normalize_location};
pub use rack_position::build_rack_position;
pub use rack_type::{classify_rack_type, RackFamily, RACK_TYPE_RULES};
pub use sla::{sla_from_minutes, sla_from_minutes_at};
pub use uplink::{parse_uplink_config, UplinkConfig};

use crate::models::{EnrichmentResult, FieldMap};
use chrono::{DateTime, Local};

/// Normalize against the current local time
pub fn normalize(result: &EnrichmentResult) -> Option<FieldMap> {
    normalize_at(result, Local::now())
}

/// Normalize with an explicit "now" for the SLA deadline
pub fn normalize_at(result: &EnrichmentResult, now: DateTime<Local>) -> Option<FieldMap> {
    if !result.work_order_ok {
        return None;
    }
    let record = result.work_order.as_ref()?;

    let text = |v: &Option<String>| v.as_deref().unwrap_or_default().to_string();

    let UplinkConfig { fabric, uplinks } = parse_uplink_config(record.uplink_config.as_deref());
    let rack_type_canonical = record
        .rack_type
        .as_deref()
        .map(|raw| classify_rack_type(raw).as_str().to_string())
        .unwrap_or_default();

    Some(FieldMap {
        asset_id: result.asset_id.clone(),
        building: text(&record.location),
        rack_position: build_rack_position(
            record.location.as_deref().unwrap_or_default(),
            record.position.as_deref().unwrap_or_default(),
        ),
        brick_name: text(&record.brick_name),
        rack_type_raw: text(&record.rack_type),
        rack_type_canonical,
        vendor: text(&record.vendor),
        fabric,
        uplinks,
        work_order_id: text(&record.work_order_id),
        sla_date: sla_from_minutes_at(result.sla_minutes, now),
    })
}
