//! Time normalization for range queries and recurrence anchors.
//!
//! Every timestamp entering the engine is normalized into the owner's
//! configured timezone: naive clock times are attached as-is, zoned
//! timestamps are converted while preserving the instant. Range queries are
//! calendar-day-inclusive in that zone, so window bounds are widened to
//! local 00:00:00.000 / 23:59:59.999 regardless of how storage recorded the
//! offsets.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::domain::errors::DomainError;

/// Convert an already-zoned timestamp into `tz`. The instant is unchanged;
/// only the numeric fields move.
pub fn localize(ts: DateTime<FixedOffset>, tz: Tz) -> DateTime<FixedOffset> {
    ts.with_timezone(&tz).fixed_offset()
}

/// Attach `tz` to a naive clock time without shifting the numeric fields.
pub fn localize_naive(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<FixedOffset>, DomainError> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|zoned| zoned.fixed_offset())
        .ok_or_else(|| {
            DomainError::Validation(format!("clock time {} does not exist in {}", naive, tz))
        })
}

/// Parse an ISO-8601 date or datetime string and normalize it into `tz`.
///
/// Accepted forms, tried in order: RFC 3339 with offset, naive datetime
/// (with or without fractional seconds), plain date (interpreted as local
/// midnight). Anything else is a validation error.
pub fn parse_datetime(raw: &str, tz: Tz) -> Result<DateTime<FixedOffset>, DomainError> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Ok(localize(zoned, tz));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return localize_naive(naive, tz);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is valid for every calendar day");
        return localize_naive(midnight, tz);
    }

    Err(DomainError::Validation(format!(
        "'{}' is not an ISO-8601 date or datetime",
        raw
    )))
}

/// Local 00:00:00.000 of the timestamp's calendar day, keeping its offset.
pub fn start_of_day(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts.date_naive()
        .and_hms_milli_opt(0, 0, 0, 0)
        .expect("midnight is valid for every calendar day")
        .and_local_timezone(*ts.offset())
        .single()
        .expect("fixed offsets have no gaps or ambiguities")
}

/// Local 23:59:59.999 of the timestamp's calendar day, keeping its offset.
pub fn end_of_day(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts.date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is valid for every calendar day")
        .and_local_timezone(*ts.offset())
        .single()
        .expect("fixed offsets have no gaps or ambiguities")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_rfc3339_converts_to_zone() {
        let parsed = parse_datetime("2024-03-05T12:00:00+00:00", chrono_tz::Europe::Warsaw).unwrap();
        // Same instant, Warsaw clock (UTC+1 in March before DST switch)
        assert_eq!(parsed.hour(), 13);
        assert_eq!(
            parsed.with_timezone(&chrono::Utc),
            chrono::Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_naive_attaches_zone() {
        let parsed = parse_datetime("2024-03-05T12:00:00", chrono_tz::Europe::Warsaw).unwrap();
        // Clock fields kept, offset attached
        assert_eq!(parsed.hour(), 12);
        assert_eq!(parsed.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_date_only_is_local_midnight() {
        let parsed = parse_datetime("2024-03-05", chrono_tz::UTC).unwrap();
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_datetime("2024-03-05T12:00:00.250", chrono_tz::UTC).unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for raw in ["not-a-date", "2024-13-01", "2024-02-31", "05/03/2024", ""] {
            let result = parse_datetime(raw, chrono_tz::UTC);
            assert!(
                matches!(result, Err(DomainError::Validation(_))),
                "expected validation error for '{}'",
                raw
            );
        }
    }

    #[test]
    fn test_localize_preserves_instant() {
        let original = DateTime::parse_from_rfc3339("2024-06-01T18:30:00-04:00").unwrap();
        let converted = localize(original, chrono_tz::UTC);
        assert_eq!(converted.with_timezone(&chrono::Utc), original.with_timezone(&chrono::Utc));
        assert_eq!(converted.hour(), 22);
    }

    #[test]
    fn test_day_bounds() {
        let ts = DateTime::parse_from_rfc3339("2024-03-05T15:45:30+02:00").unwrap();

        let start = start_of_day(ts);
        assert_eq!(start.to_rfc3339(), "2024-03-05T00:00:00+02:00");

        let end = end_of_day(ts);
        assert_eq!(end.hour(), 23);
        assert_eq!(end.minute(), 59);
        assert_eq!(end.second(), 59);
        assert_eq!(end.timestamp_subsec_millis(), 999);
        assert_eq!(end.date_naive(), ts.date_naive());
    }
}
