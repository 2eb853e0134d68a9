//! Upstream timestamp normalization.
//!
//! Quote feeds report "as of" times in several shapes: RFC 3339, local
//! `YYYY-MM-DD HH:MM:SS` strings, or compact `yyyyMMddHHmmss` digits. Local
//! shapes are interpreted in the host time zone.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NATIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Normalize an upstream time string to an absolute instant, falling back to
/// `now` when it cannot be parsed.
pub fn normalize_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(parse_timestamp).unwrap_or(now)
}

/// Parse an upstream time string, `None` when no known shape matches.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NATIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return local_to_utc(naive);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return local_to_utc(date.and_hms_opt(0, 0, 0)?);
        }
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 14 {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M%S") {
            return local_to_utc(naive);
        }
    }

    None
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, ss)
            .unwrap();
        local_to_utc(naive).unwrap()
    }

    #[test]
    fn test_rfc3339() {
        let parsed = parse_timestamp("2024-01-02T07:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-02T07:00:00+00:00");
    }

    #[test]
    fn test_native_date_string() {
        assert_eq!(
            parse_timestamp("2024-01-02 15:00:00"),
            Some(local(2024, 1, 2, 15, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2024/01/02 09:31:05"),
            Some(local(2024, 1, 2, 9, 31, 5))
        );
    }

    #[test]
    fn test_compact_digits() {
        assert_eq!(
            parse_timestamp("20240102150003"),
            Some(local(2024, 1, 2, 15, 0, 3))
        );
    }

    #[test]
    fn test_unparseable_defaults_to_now() {
        let now = Utc::now();
        assert_eq!(normalize_timestamp(Some("not a time"), now), now);
        assert_eq!(normalize_timestamp(Some(" "), now), now);
        assert_eq!(normalize_timestamp(None, now), now);
    }
}
