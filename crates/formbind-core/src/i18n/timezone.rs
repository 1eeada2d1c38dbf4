//! Timezone conversion between naive UTC storage and local wall-clock time.
//!
//! Datetimes are stored naive and in UTC. User input is interpreted in the
//! configured timezone ([`crate::settings::get_timezone`]) and converted with
//! [`to_utc`]; stored values are shown to users through [`from_utc`].
//!
//! ```
//! use chrono::NaiveDate;
//! use formbind_core::i18n::timezone;
//!
//! let tz = timezone::parse_timezone("America/Sao_Paulo").unwrap();
//! let local = NaiveDate::from_ymd_opt(2000, 9, 30).unwrap().and_hms_opt(23, 0, 0).unwrap();
//! let utc = timezone::to_utc(&local, tz);
//! assert_eq!(utc.to_string(), "2000-10-01 02:00:00");
//! assert_eq!(timezone::from_utc(&utc, tz), local);
//! ```

use chrono::{Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::error::{FormbindError, FormbindResult};

/// Parses an IANA timezone name such as `UTC` or `America/Sao_Paulo`.
pub fn parse_timezone(name: &str) -> FormbindResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| FormbindError::UnknownTimezone(name.to_string()))
}

/// Interprets `local` as wall-clock time in `tz` and returns the naive UTC
/// instant.
///
/// Ambiguous times (the repeated hour when daylight saving ends) resolve to
/// standard time. Times that fall in a daylight-saving gap use the offset in
/// effect before the transition.
pub fn to_utc(local: &NaiveDateTime, tz: Tz) -> NaiveDateTime {
    match tz.from_local_datetime(local) {
        LocalResult::Single(dt) => dt.naive_utc(),
        LocalResult::Ambiguous(_, standard) => standard.naive_utc(),
        LocalResult::None => {
            let before = *local - Duration::days(1);
            let offset = tz.offset_from_local_datetime(&before).earliest().map_or(0, |o| {
                i64::from(o.fix().local_minus_utc())
            });
            *local - Duration::seconds(offset)
        }
    }
}

/// Converts a naive UTC instant into wall-clock time in `tz`.
pub fn from_utc(utc: &NaiveDateTime, tz: Tz) -> NaiveDateTime {
    tz.from_utc_datetime(utc).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("UTC").unwrap(), Tz::UTC);
        assert!(matches!(
            parse_timezone("Nowhere/Land"),
            Err(FormbindError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn test_utc_is_identity() {
        let value = dt(2016, 9, 30, 12, 0, 0);
        assert_eq!(to_utc(&value, Tz::UTC), value);
        assert_eq!(from_utc(&value, Tz::UTC), value);
    }

    #[test]
    fn test_sao_paulo_crosses_midnight() {
        let tz = parse_timezone("America/Sao_Paulo").unwrap();
        assert_eq!(
            to_utc(&dt(2000, 9, 30, 23, 0, 0), tz),
            dt(2000, 10, 1, 2, 0, 0)
        );
        assert_eq!(
            from_utc(&dt(2016, 12, 25, 18, 0, 0), tz),
            dt(2016, 12, 25, 16, 0, 0)
        );
    }

    #[test]
    fn test_ambiguous_resolves_to_standard_time() {
        // New York falls back at 02:00 on 2016-11-06; 01:30 happens twice.
        let tz = parse_timezone("America/New_York").unwrap();
        assert_eq!(
            to_utc(&dt(2016, 11, 6, 1, 30, 0), tz),
            dt(2016, 11, 6, 6, 30, 0)
        );
    }

    #[test]
    fn test_gap_uses_previous_offset() {
        // New York springs forward at 02:00 on 2016-03-13; 02:30 never happens.
        let tz = parse_timezone("America/New_York").unwrap();
        assert_eq!(
            to_utc(&dt(2016, 3, 13, 2, 30, 0), tz),
            dt(2016, 3, 13, 7, 30, 0)
        );
    }
}
