//! Canonical per-asset record and fetch-phase rows

use super::AssetId;
use serde::{Deserialize, Serialize};

/// SLA deadline split into the two strings the tracker expects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaDate {
    /// `MM/DD/YYYY`, empty when unknown
    pub month_day_year: String,
    /// `h:MMam` / `h:MMpm`, empty when unknown
    pub time_12h: String,
}

impl SlaDate {
    pub fn is_empty(&self) -> bool {
        self.month_day_year.is_empty() && self.time_12h.is_empty()
    }

    /// Date and time joined for the free-text SLA field
    pub fn raw(&self) -> String {
        format!("{} {}", self.month_day_year, self.time_12h)
            .trim()
            .to_string()
    }
}

/// Normalized record for one asset, ready for the record writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMap {
    pub asset_id: AssetId,
    /// Raw work-order location; normalized to a building code at write time
    pub building: String,
    pub rack_position: String,
    pub brick_name: String,
    pub rack_type_raw: String,
    pub rack_type_canonical: String,
    pub vendor: String,
    pub fabric: String,
    pub uplinks: String,
    pub work_order_id: String,
    pub sla_date: SlaDate,
}

/// One asset's fetch-phase outcome, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRow {
    pub asset_id: AssetId,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_map: Option<FieldMap>,
    pub auth_expired: bool,
    pub work_order_status: Option<u16>,
    pub inventory_status: Option<u16>,
}

impl BatchRow {
    /// Row ready to be written
    pub fn is_writable(&self) -> bool {
        self.ok && self.field_map.is_some()
    }
}
