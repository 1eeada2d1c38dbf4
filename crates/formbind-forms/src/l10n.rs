//! Locale-aware number and date conventions.
//!
//! A small table of number symbols and short date patterns per locale, with
//! the lenient parsers field descriptors use on user input:
//!
//! - [`parse_decimal`] drops grouping separators and reads the locale's
//!   decimal separator.
//! - [`parse_date`] only looks at the digit runs of its input and assigns
//!   them to year, month and day in the order of the locale's pattern.
//! - [`parse_time`] does the same for hour, minute and second.
//!
//! ```
//! use formbind_core::Locale;
//! use formbind_forms::l10n;
//!
//! let pt = Locale::parse("pt_BR").unwrap();
//! assert_eq!(l10n::parse_decimal("1.000,5", &pt).unwrap().to_string(), "1000.5");
//! assert_eq!(l10n::short_date_pattern(&pt), "dd/MM/yyyy");
//! ```

use std::fmt::Write;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use formbind_core::Locale;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// The input is not a number in the given locale.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{text:?} is not a valid decimal number for locale {locale}")]
pub struct NumberFormatError {
    /// The rejected input.
    pub text: String,
    /// The locale it was parsed with.
    pub locale: String,
}

/// The separators a locale writes numbers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
    /// Separates the integer part from the fraction.
    pub decimal: char,
    /// Groups integer digits by thousands.
    pub group: char,
}

const DOT_DECIMAL: NumberSymbols = NumberSymbols {
    decimal: '.',
    group: ',',
};
const COMMA_DECIMAL: NumberSymbols = NumberSymbols {
    decimal: ',',
    group: '.',
};
const SPACE_GROUPED: NumberSymbols = NumberSymbols {
    decimal: ',',
    group: '\u{a0}',
};
const NARROW_SPACE_GROUPED: NumberSymbols = NumberSymbols {
    decimal: ',',
    group: '\u{202f}',
};

/// Returns the number symbols of `locale`. Unknown languages use `.` and `,`.
pub fn number_symbols(locale: &Locale) -> NumberSymbols {
    match (locale.language.as_str(), locale.territory.as_deref()) {
        ("de", Some("CH")) => NumberSymbols {
            decimal: '.',
            group: '\u{2019}',
        },
        ("es", Some("MX" | "US")) => DOT_DECIMAL,
        ("pt", Some("PT")) => SPACE_GROUPED,
        ("pt" | "de" | "es" | "it" | "nl" | "id" | "tr" | "da" | "el" | "ro" | "hr" | "sl", _) => {
            COMMA_DECIMAL
        }
        ("fr", _) => NARROW_SPACE_GROUPED,
        ("ru" | "pl" | "cs" | "sk" | "sv" | "fi" | "nb" | "uk" | "hu" | "bg", _) => SPACE_GROUPED,
        _ => DOT_DECIMAL,
    }
}

/// Parses a number written in `locale`.
///
/// Grouping separators are removed wherever they appear; the locale decimal
/// separator becomes the fraction point. A leading sign is accepted, any
/// other character is not.
pub fn parse_decimal(text: &str, locale: &Locale) -> Result<Decimal, NumberFormatError> {
    let symbols = number_symbols(locale);
    let error = || NumberFormatError {
        text: text.to_string(),
        locale: locale.to_string(),
    };

    let mut cleaned = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c == symbols.group || (symbols.group.is_whitespace() && c.is_whitespace()) {
            continue;
        }
        cleaned.push(if c == symbols.decimal { '.' } else { c });
    }

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(cleaned.as_str())),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(error());
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let canonical = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };
    let value = Decimal::from_str(&canonical).map_err(|_| error())?;
    Ok(if negative { -value } else { value })
}

/// Formats a number the way `locale` writes it: integer digits grouped by
/// thousands, at most three fraction digits (half to even), no trailing
/// zeros.
///
/// ```
/// use formbind_core::Locale;
/// use formbind_forms::l10n::format_decimal;
/// use rust_decimal::Decimal;
///
/// let en = Locale::default();
/// assert_eq!(format_decimal(Decimal::new(111_100_034, 2), &en), "1,111,000.34");
/// assert_eq!(format_decimal(Decimal::new(1_0005, 4), &en), "1")
/// ```
pub fn format_decimal(value: Decimal, locale: &Locale) -> String {
    let symbols = number_symbols(locale);
    let rounded = value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointNearestEven)
        .normalize();

    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    let len = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(symbols.group);
        }
        out.push(c);
    }
    if !frac_part.is_empty() {
        out.push(symbols.decimal);
        out.push_str(frac_part);
    }
    out
}

// ── Dates ────────────────────────────────────────────────────────────────

fn cldr_short_date(locale: &Locale) -> &'static str {
    match (locale.language.as_str(), locale.territory.as_deref()) {
        ("en", Some("GB" | "IE" | "NZ" | "IN")) => "dd/MM/y",
        ("en", Some("AU")) => "d/M/yy",
        ("en", Some("CA")) => "y-MM-dd",
        ("pt", Some("PT")) => "dd/MM/yy",
        ("pt" | "fr", _) => "dd/MM/y",
        ("es", _) => "d/M/yy",
        ("de", _) => "dd.MM.yy",
        ("it", _) => "dd/MM/yy",
        ("nl", _) => "dd-MM-y",
        ("ru" | "pl" | "uk", _) => "dd.MM.y",
        ("ja", _) => "y/MM/dd",
        ("zh", _) => "y/M/d",
        ("ko", _) => "yy. M. d.",
        _ => "M/d/yy",
    }
}

/// The short date pattern of `locale` with fixed-width fields: month and
/// day take two digits and the year four, so `M/d/yy` becomes `MM/dd/yyyy`
/// and `dd/MM/y` becomes `dd/MM/yyyy`.
pub fn short_date_pattern(locale: &Locale) -> String {
    let mut pattern = String::new();
    let mut chars = cldr_short_date(locale).chars().peekable();
    while let Some(c) = chars.next() {
        let mut width = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            width += 1;
        }
        let width = match c {
            'y' => 4,
            'M' | 'd' => width.max(2),
            _ => width,
        };
        pattern.extend(std::iter::repeat(c).take(width));
    }
    pattern
}

/// The time pattern used next to a date in datetime fields.
pub const TIME_PATTERN: &str = "HH:mm:ss";

fn digit_runs(text: &str) -> Vec<&str> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("valid regex"));
    digits.find_iter(text).map(|m| m.as_str()).collect()
}

/// Positions of the given pattern letters, ranked by where they first occur.
fn field_order<const N: usize>(pattern: &str, letters: [char; N]) -> Option<[usize; N]> {
    let mut positions = [0; N];
    for (slot, letter) in positions.iter_mut().zip(letters) {
        *slot = pattern.find(letter)?;
    }
    let mut ranks = [0; N];
    for (i, rank) in ranks.iter_mut().enumerate() {
        *rank = positions.iter().filter(|p| **p < positions[i]).count();
    }
    Some(ranks)
}

/// Parses a date typed in `locale`.
///
/// Only the digit runs are used. A two-digit year is taken as 20xx, and a
/// month above 12 is swapped with the day.
///
/// ```
/// use chrono::NaiveDate;
/// use formbind_core::Locale;
/// use formbind_forms::l10n::parse_date;
///
/// let en = Locale::default();
/// assert_eq!(parse_date("09/30/2000", &en), NaiveDate::from_ymd_opt(2000, 9, 30));
/// assert_eq!(parse_date("30/09/2000", &en), NaiveDate::from_ymd_opt(2000, 9, 30));
/// assert_eq!(parse_date("09/30/a", &en), None);
/// ```
pub fn parse_date(text: &str, locale: &Locale) -> Option<NaiveDate> {
    let numbers = digit_runs(text);
    let pattern = short_date_pattern(locale);
    let [year_idx, month_idx, day_idx] = field_order(&pattern, ['y', 'M', 'd'])?;

    let year_text = numbers.get(year_idx)?;
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += 2000;
    }
    let mut month: u32 = numbers.get(month_idx)?.parse().ok()?;
    let mut day: u32 = numbers.get(day_idx)?.parse().ok()?;
    if month > 12 {
        std::mem::swap(&mut month, &mut day);
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a time as hour, minute and second. All three are required.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let numbers = digit_runs(text);
    let [hour, minute, second] = [0, 1, 2].map(|i| numbers.get(i).and_then(|n| n.parse().ok()));
    NaiveTime::from_hms_opt(hour?, minute?, second?)
}

/// Renders `datetime` with an LDML-style pattern.
///
/// Supported fields are `y` (`yy` gives two digits), `M`, `d`, `H`, `m`
/// and `s`; the repeat count is the minimum width. Text in single quotes is
/// copied as is.
///
/// ```
/// use chrono::NaiveDate;
/// use formbind_forms::l10n::format_pattern;
///
/// let dt = NaiveDate::from_ymd_opt(2016, 12, 5).unwrap().and_hms_opt(8, 0, 0).unwrap();
/// assert_eq!(format_pattern(&dt, "dd/MM/y HH:mm:ss"), "05/12/2016 08:00:00");
/// assert_eq!(format_pattern(&dt, "M/d/yy"), "12/5/16");
/// ```
pub fn format_pattern(datetime: &NaiveDateTime, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            for quoted in chars.by_ref() {
                if quoted == '\'' {
                    break;
                }
                out.push(quoted);
            }
            continue;
        }

        let mut width = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            width += 1;
        }

        let number = match c {
            'y' if width == 2 => i64::from(datetime.year().rem_euclid(100)),
            'y' => i64::from(datetime.year()),
            'M' => i64::from(datetime.month()),
            'd' => i64::from(datetime.day()),
            'H' => i64::from(datetime.hour()),
            'm' => i64::from(datetime.minute()),
            's' => i64::from(datetime.second()),
            other => {
                out.extend(std::iter::repeat(other).take(width));
                continue;
            }
        };
        let _ = write!(out, "{number:0width$}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn locale(name: &str) -> Locale {
        Locale::parse(name).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case("en_US", "1,000.0", "1000")]
    #[case("en_US", "1,111,000.3399999", "1111000.3399999")]
    #[case("en_US", "0", "0")]
    #[case("en_US", "-1.5", "-1.5")]
    #[case("en_US", ".5", "0.5")]
    #[case("pt_BR", "1.000,34", "1000.34")]
    #[case("de", "2,5", "2.5")]
    #[case("fr_FR", "1\u{202f}000,5", "1000.5")]
    #[case("ru", "1 000,5", "1000.5")]
    fn test_parse_decimal(#[case] loc: &str, #[case] text: &str, #[case] expected: &str) {
        assert_eq!(parse_decimal(text, &locale(loc)).unwrap(), dec(expected));
    }

    #[rstest]
    #[case("foo")]
    #[case("123h")]
    #[case("0x456")]
    #[case("")]
    #[case("-")]
    #[case("1.2.3")]
    fn test_parse_decimal_rejects(#[case] text: &str) {
        let err = parse_decimal(text, &locale("en_US")).unwrap_err();
        assert_eq!(err.text, text);
        assert_eq!(err.locale, "en_US");
    }

    #[rstest]
    #[case("0", "0")]
    #[case("0.0", "0")]
    #[case("1.34", "1.34")]
    #[case("1111000.34", "1,111,000.34")]
    #[case("1111000.33", "1,111,000.33")]
    #[case("0.001", "0.001")]
    #[case("0.0005", "0")]
    #[case("2.0015", "2.002")]
    #[case("-1234.5", "-1,234.5")]
    #[case("100", "100")]
    fn test_format_decimal_en(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(format_decimal(dec(value), &locale("en_US")), expected);
    }

    #[test]
    fn test_format_decimal_pt() {
        assert_eq!(format_decimal(dec("1111000.34"), &locale("pt_BR")), "1.111.000,34");
    }

    #[rstest]
    #[case("en_US", "MM/dd/yyyy")]
    #[case("en", "MM/dd/yyyy")]
    #[case("pt_BR", "dd/MM/yyyy")]
    #[case("pt_PT", "dd/MM/yyyy")]
    #[case("de_DE", "dd.MM.yyyy")]
    #[case("es", "dd/MM/yyyy")]
    #[case("ja", "yyyy/MM/dd")]
    #[case("ko", "yyyy. MM. dd.")]
    #[case("en_CA", "yyyy-MM-dd")]
    fn test_short_date_pattern(#[case] loc: &str, #[case] expected: &str) {
        assert_eq!(short_date_pattern(&locale(loc)), expected);
    }

    #[rstest]
    #[case("en_US", "09/30/2000", Some((2000, 9, 30)))]
    #[case("en_US", "9/30/00", Some((2000, 9, 30)))]
    #[case("en_US", "30/09/2000", Some((2000, 9, 30)))]
    #[case("en_US", "08/01/1999", Some((1999, 8, 1)))]
    #[case("en_US", "02/30/2000", None)]
    #[case("en_US", "1999/08/a1", None)]
    #[case("en_US", "a/09/30", None)]
    #[case("pt_BR", "25/12/2016", Some((2016, 12, 25)))]
    #[case("pt_BR", "02/01/0999", Some((999, 1, 2)))]
    #[case("ja", "2016/12/25", Some((2016, 12, 25)))]
    fn test_parse_date(
        #[case] loc: &str,
        #[case] text: &str,
        #[case] expected: Option<(i32, u32, u32)>,
    ) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_date(text, &locale(loc)), expected);
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("23:59:00"), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(parse_time("1:2:3"), NaiveTime::from_hms_opt(1, 2, 3));
        assert_eq!(parse_time("23:59"), None);
        assert_eq!(parse_time("23:59:a"), None);
        assert_eq!(parse_time("25:00:00"), None);
    }

    #[test]
    fn test_format_pattern_literals() {
        let dt = NaiveDate::from_ymd_opt(2016, 12, 25)
            .unwrap()
            .and_hms_opt(18, 5, 9)
            .unwrap();
        assert_eq!(format_pattern(&dt, "d 'de' MM 'de' y"), "25 de 12 de 2016");
        assert_eq!(format_pattern(&dt, "yy. M. d."), "16. 12. 25.");
        assert_eq!(format_pattern(&dt, "MM/dd/yyyy HH:mm:ss"), "12/25/2016 18:05:09");
    }
}
