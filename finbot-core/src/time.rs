//! Time utilities: ledger timestamps in a fixed local zone.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{CoreError, Result};

/// Zone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Ledger timestamp layout, e.g. `16/10/2026 14:05:09`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse an IANA zone name like "America/Sao_Paulo".
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse()
        .map_err(|_| CoreError::InvalidTimezone(name.to_string()))
}

/// Current wall-clock time in `tz`, without the offset.
pub fn local_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_round_trip_format() {
        let ts = NaiveDate::from_ymd_opt(2026, 2, 3)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "03/02/2026 09:05:07");
        assert_eq!(parse_timestamp(" 03/02/2026 09:05:07 "), Some(ts));
        assert_eq!(parse_timestamp("2026-02-03 09:05:07"), None);
    }

    #[test]
    fn test_sao_paulo_offset() {
        // No DST in Brazil since 2019: UTC-3 all year.
        let tz = parse_timezone(DEFAULT_TIMEZONE).unwrap();
        let utc = Utc.with_ymd_and_hms(2026, 1, 10, 15, 0, 0).unwrap();
        let local = utc.with_timezone(&tz).naive_local();
        assert_eq!(format_timestamp(&local), "10/01/2026 12:00:00");
    }

    #[test]
    fn test_invalid_timezone() {
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(CoreError::InvalidTimezone(_))
        ));
    }
}
