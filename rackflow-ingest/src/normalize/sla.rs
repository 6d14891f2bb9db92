//! SLA deadline conversion
//!
//! The inventory service reports minutes remaining until handoff. The
//! tracker wants an absolute local date (`MM/DD/YYYY`) and a 12-hour
//! time (`2:05pm`).

use crate::models::SlaDate;
use chrono::{DateTime, Duration, Local, TimeZone, Timelike};
use std::fmt;

/// Convert minutes-from-now into an SLA date using the current local time
pub fn sla_from_minutes(minutes: Option<f64>) -> SlaDate {
    sla_from_minutes_at(minutes, Local::now())
}

/// Convert minutes-from-`now` into an SLA date.
///
/// Absent, NaN, infinite or out-of-range input yields empty strings.
pub fn sla_from_minutes_at<Tz>(minutes: Option<f64>, now: DateTime<Tz>) -> SlaDate
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match minutes.and_then(|m| deadline(m, now)) {
        Some(at) => SlaDate {
            month_day_year: at.format("%m/%d/%Y").to_string(),
            time_12h: format_time_12h(&at),
        },
        None => SlaDate::default(),
    }
}

fn deadline<Tz: TimeZone>(minutes: f64, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let millis = (minutes * 60_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }

    let offset = Duration::try_milliseconds(millis as i64)?;
    now.checked_add_signed(offset)
}

/// `h:MMam` / `h:MMpm`; hour 0 and 12 display as 12
fn format_time_12h<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    let (is_pm, hour) = at.hour12();
    format!("{}:{:02}{}", hour, at.minute(), if is_pm { "pm" } else { "am" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn fixed_now() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 15, 14, 5, 30)
            .unwrap()
    }

    #[test]
    fn test_zero_minutes_is_now() {
        let sla = sla_from_minutes_at(Some(0.0), fixed_now());
        assert_eq!(sla.month_day_year, "01/15/2025");
        assert_eq!(sla.time_12h, "2:05pm");
    }

    #[test]
    fn test_negative_minutes_in_past() {
        let sla = sla_from_minutes_at(Some(-60.0), fixed_now());
        assert_eq!(sla.month_day_year, "01/15/2025");
        assert_eq!(sla.time_12h, "1:05pm");
    }

    #[test]
    fn test_crosses_midnight() {
        // 14:05 + 10h = 00:05 next day
        let sla = sla_from_minutes_at(Some(600.0), fixed_now());
        assert_eq!(sla.month_day_year, "01/16/2025");
        assert_eq!(sla.time_12h, "12:05am");
    }

    #[test]
    fn test_noon_is_pm() {
        let noon = Utc.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap();
        let sla = sla_from_minutes_at(Some(0.0), noon);
        assert_eq!(sla.time_12h, "12:00pm");
    }

    #[test]
    fn test_fractional_minutes() {
        // 14:05:30 + 90s = 14:07:00
        let sla = sla_from_minutes_at(Some(1.5), fixed_now());
        assert_eq!(sla.time_12h, "2:07pm");
    }

    #[test]
    fn test_days_overdue() {
        let sla = sla_from_minutes_at(Some(-3.0 * 24.0 * 60.0), fixed_now());
        assert_eq!(sla.month_day_year, "01/12/2025");
    }

    #[test]
    fn test_invalid_input_is_empty() {
        assert!(sla_from_minutes_at(None, fixed_now()).is_empty());
        assert!(sla_from_minutes_at(Some(f64::NAN), fixed_now()).is_empty());
        assert!(sla_from_minutes_at(Some(f64::INFINITY), fixed_now()).is_empty());
        assert!(sla_from_minutes_at(Some(1e300), fixed_now()).is_empty());
    }

    #[test]
    fn test_local_now_formats() {
        let sla = sla_from_minutes(Some(0.0));
        assert_eq!(sla.month_day_year.len(), 10);
        assert!(sla.time_12h.ends_with("am") || sla.time_12h.ends_with("pm"));
    }
}
