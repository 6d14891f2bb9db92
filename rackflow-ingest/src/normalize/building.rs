//! Building code and location normalization

use once_cell::sync::Lazy;
use regex::Regex;

/// 2-4 letter site prefix, optional leading zero, 1-3 digits
static BUILDING_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2,4})0?([0-9]{1,3})$").expect("static regex"));

/// Letters followed by a digit run
static LOCATION_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)0*([0-9]+)$").expect("static regex"));

/// Normalize a building code to prefix + 3-digit number.
///
/// `CMH70` → `CMH070`, `OSU059` → `OSU059`, `PDX2` → `PDX002`.
/// Input that does not look like a building code is returned uppercased.
pub fn normalize_building(raw: &str) -> String {
    let s = raw.trim().to_uppercase();

    match BUILDING_CODE.captures(&s) {
        Some(caps) => format!("{}{:0>3}", &caps[1], &caps[2]),
        None => s,
    }
}

/// Normalize a location for use in a rack position: leading zeros are
/// stripped from the trailing digit run (`CMH059` → `CMH59`).
pub fn normalize_location(raw: &str) -> String {
    let s = raw.trim().to_uppercase();

    match LOCATION_CODE.captures(&s) {
        Some(caps) => {
            let digits = caps[2].trim_start_matches('0');
            let digits = if digits.is_empty() { "0" } else { digits };
            format!("{}{}", &caps[1], digits)
        }
        None => s,
    }
}
