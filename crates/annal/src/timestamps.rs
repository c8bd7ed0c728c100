//! Timestamp conversion utilities.
//!
//! The ledger stores timestamps as i64 (microseconds since Unix epoch).
//! This module provides conversion to/from chrono types and an ISO-8601
//! rendering for reports and logs.

use chrono::{NaiveDateTime, TimeZone, Utc};

/// Microseconds per second
const MICROS_PER_SECOND: i64 = 1_000_000;

/// Current wall-clock time as microseconds since Unix epoch.
#[inline]
#[must_use]
pub fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Convert chrono `NaiveDateTime` to microseconds since Unix epoch.
#[inline]
#[must_use]
pub fn naive_to_micros(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_micros()
}

/// Convert microseconds since Unix epoch to chrono `NaiveDateTime`.
///
/// For extreme values outside chrono's representable range, saturates to
/// chrono's minimum/maximum instant instead of panicking.
#[inline]
#[must_use]
pub fn micros_to_naive(micros: i64) -> NaiveDateTime {
    // rem_euclid keeps the sub-second part non-negative for pre-epoch values
    let secs = micros.div_euclid(MICROS_PER_SECOND);
    let sub_micros = micros.rem_euclid(MICROS_PER_SECOND);
    let nsecs = u32::try_from(sub_micros * 1000).unwrap_or(0);
    Utc.timestamp_opt(secs, nsecs)
        .single()
        .unwrap_or(if micros < 0 {
            chrono::DateTime::<Utc>::MIN_UTC
        } else {
            chrono::DateTime::<Utc>::MAX_UTC
        })
        .naive_utc()
}

/// Convert microseconds to an ISO-8601 string with microsecond precision.
#[inline]
#[must_use]
pub fn micros_to_iso(micros: i64) -> String {
    micros_to_naive(micros)
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}

/// Parse an ISO-8601 string to microseconds.
///
/// Accepts RFC 3339 with an offset, or a bare datetime with or without a
/// trailing `Z`. Returns `None` if the string cannot be parsed.
#[must_use]
pub fn iso_to_micros(s: &str) -> Option<i64> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_micros());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Some(naive_to_micros(dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive_to_micros(dt));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn naive_round_trip() {
        let now = Utc::now().naive_utc();
        let micros = naive_to_micros(now);
        let back = micros_to_naive(micros);

        // Sub-microsecond precision is lost; anything beyond that is a bug.
        let diff = (now.and_utc().timestamp_micros() - back.and_utc().timestamp_micros()).abs();
        assert!(diff <= 1, "round trip drifted: diff={diff}");
    }

    #[test]
    fn now_micros_is_wall_clock() {
        let before = Utc::now().timestamp_micros();
        let now = now_micros();
        let after = Utc::now().timestamp_micros();
        assert!(now >= before);
        assert!(now <= after);
    }

    #[test]
    fn epoch_boundary() {
        let dt = micros_to_naive(0);
        assert_eq!(
            dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            "1970-01-01 00:00:00"
        );

        // One microsecond before epoch round-trips.
        let dt = micros_to_naive(-1);
        assert_eq!(naive_to_micros(dt), -1);
    }

    #[test]
    fn pre_epoch_values_round_trip() {
        let micros = -500_000_i64;
        let dt = micros_to_naive(micros);
        assert_eq!(
            dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            "1969-12-31 23:59:59"
        );
        assert_eq!(naive_to_micros(dt), micros);
    }

    #[test]
    fn extreme_values_saturate_without_panicking() {
        let dt_min = micros_to_naive(i64::MIN);
        assert!(
            dt_min.year() < -200_000,
            "i64::MIN should saturate to the distant past, got {dt_min:?}"
        );

        let dt_max = micros_to_naive(i64::MAX);
        assert!(
            dt_max.year() > 200_000,
            "i64::MAX should saturate to the far future, got {dt_max:?}"
        );
    }

    #[test]
    fn iso_rendering_keeps_microseconds() {
        let micros = 1_704_067_200_123_456_i64; // 2024-01-01 00:00:00.123456 UTC
        assert_eq!(micros_to_iso(micros), "2024-01-01T00:00:00.123456Z");
        assert_eq!(iso_to_micros("2024-01-01T00:00:00.123456Z"), Some(micros));
    }

    #[test]
    fn iso_parsing_accepts_offsets_and_bare_datetimes() {
        assert_eq!(
            iso_to_micros("2024-01-01T00:00:00+00:00"),
            Some(1_704_067_200_000_000)
        );
        assert_eq!(
            iso_to_micros("2024-01-01T00:00:00"),
            Some(1_704_067_200_000_000)
        );
    }

    #[test]
    fn iso_parsing_rejects_garbage() {
        assert!(iso_to_micros("not-a-date").is_none());
        assert!(iso_to_micros("").is_none());
        assert!(iso_to_micros("2024-13-01T00:00:00Z").is_none()); // month 13
    }
}
