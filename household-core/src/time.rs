//! Timestamp parsing for the loosely-typed date fields on the wire.
//!
//! Rows carry their dates as strings. Depending on who produced them these are
//! RFC 3339 instants, zone-less `YYYY-MM-DDTHH:MM[:SS]` values (taken as UTC),
//! bare dates, or epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a wire timestamp. Returns `None` for anything unrecognized.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }

    s.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

/// Format an instant the way browsers do (`2024-01-01T18:00:00.000Z`).
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_all_wire_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2024-01-01T18:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T19:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T18:00:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T18:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T18:00:00"), Some(expected));
        assert_eq!(
            parse_timestamp(&expected.timestamp_millis().to_string()),
            Some(expected)
        );
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        assert_eq!(
            parse_timestamp("2024-03-05"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-45T99:00"), None);
    }

    #[test]
    fn formats_with_millis() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        assert_eq!(format_timestamp(&dt), "2024-01-01T18:00:00.000Z");
    }
}
