//! Rack position composition
//!
//! Work orders carry a location (`CMH059`) and a position that often
//! repeats the location in some spelling (`CMH59.12.3`, `cmh059 . 12.3`).
//! The composed label is the normalized location followed by the position
//! with any leading copies of the location removed.

use super::building::{normalize_building, normalize_location};
use regex::RegexBuilder;

/// Combine a work-order location and position into one dotted label
pub fn build_rack_position(location: &str, position: &str) -> String {
    let loc_raw = location.trim();
    let pos_raw = position.trim();

    if loc_raw.is_empty() {
        return pos_raw.to_string();
    }

    let loc_normalized = normalize_location(loc_raw);
    if pos_raw.is_empty() {
        return loc_normalized;
    }

    let remainder = strip_location_prefix(pos_raw, loc_raw, &loc_normalized);
    if remainder.is_empty() {
        loc_normalized
    } else {
        format!("{}.{}", loc_normalized, remainder)
    }
}

/// Remove leading repetitions of any spelling of the location, then any
/// leftover leading dots.
fn strip_location_prefix(position: &str, loc_raw: &str, loc_normalized: &str) -> String {
    let variants = [
        loc_raw.to_uppercase(),
        loc_normalized.to_string(),
        normalize_building(loc_raw),
    ];

    let group = variants
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| regex::escape(v))
        .collect::<Vec<_>>()
        .join("|");

    let pattern = format!(r"^(?:(?:{})\s*\.?\s*)+", group);

    let stripped = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.replace(position, "").into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, location = %loc_raw, "Location pattern rejected; keeping position as-is");
            position.to_string()
        }
    };

    stripped
        .trim()
        .trim_start_matches('.')
        .trim()
        .to_string()
}
