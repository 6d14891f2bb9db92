//! Uplink configuration parsing
//!
//! The work-order `uplinkConfig` field looks like `"EC2 | (32+32+32+32)x100"`:
//! fabric name on the left, uplink spec on the right.

/// Fabric and uplink spec split out of an uplink configuration string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UplinkConfig {
    pub fabric: String,
    pub uplinks: String,
}

/// Parse an uplink configuration. Missing input yields empty fields.
pub fn parse_uplink_config(raw: Option<&str>) -> UplinkConfig {
    let Some(raw) = raw else {
        return UplinkConfig::default();
    };

    let mut parts = raw.split('|').map(str::trim);
    let raw_fabric = parts.next().unwrap_or_default();
    let uplinks = parts.next().unwrap_or_default();

    let fabric = if raw_fabric.eq_ignore_ascii_case("PRODUCTION") {
        "PROD"
    } else {
        raw_fabric
    };

    UplinkConfig {
        fabric: fabric.to_string(),
        uplinks: uplinks.to_string(),
    }
}
