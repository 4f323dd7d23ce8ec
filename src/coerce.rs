use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_AMOUNT_CHARS: Regex = Regex::new(r"[^0-9.]").unwrap();
}

// Month-first wins for ambiguous slashed dates; day-first only when the
// month-first reading is impossible
const DATE_FORMATS: [&str; 11] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
    "%d %B %Y",
];

// `%.f` also matches an absent fraction
const TIME_SUFFIXES: [&str; 4] = [" %H:%M:%S%.f", " %H:%M", "T%H:%M:%S%.f", "T%H:%M"];

// chrono's `%Y` takes one or two digit years, so "1/5/24" would read as
// year 1 under a year-first format
const MIN_YEAR: i32 = 1000;

/// Parse a loosely formatted date cell
///
/// Accepts RFC 3339 timestamps as well as the usual spreadsheet renderings
/// (`2024-01-15`, `1/15/2024`, `1/15/24`, `25/12/2024`, `15 Jan 2024`,
/// `Jan 15, 2024`), optionally followed by a time of day with or without
/// fractional seconds. Anything else yields `None`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use expense_dashboard::coerce::parse_date;
///
/// assert_eq!(parse_date("1/5/24"), NaiveDate::from_ymd_opt(2024, 1, 5));
/// assert_eq!(parse_date("soon"), None);
/// ```
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return plausible(ts.date_naive());
    }

    for format in DATE_FORMATS {
        if let Some(date) = NaiveDate::parse_from_str(text, format).ok().and_then(plausible) {
            return Some(date);
        }
        for suffix in TIME_SUFFIXES {
            let with_time = format!("{}{}", format, suffix);
            if let Some(date) = NaiveDateTime::parse_from_str(text, &with_time)
                .ok()
                .and_then(|ts| plausible(ts.date()))
            {
                return Some(date);
            }
        }
    }

    None
}

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_YEAR).then_some(date)
}

/// Parse an amount cell
///
/// Every character that is not a digit or a decimal point is dropped before
/// parsing, so currency symbols, thousands separators and signs all vanish.
/// Returns 0 when nothing parseable is left; the result is never negative.
///
/// # Examples
/// ```
/// use expense_dashboard::coerce::parse_amount;
///
/// assert_eq!(parse_amount("$1,234.50"), 1234.50);
/// assert_eq!(parse_amount("n/a"), 0.0);
/// ```
pub fn parse_amount(raw: &str) -> f64 {
    let digits = NON_AMOUNT_CHARS.replace_all(raw, "");
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn amounts_drop_currency_noise() {
        assert_eq!(parse_amount("$1,234.50"), 1234.50);
        assert_eq!(parse_amount("Rp 150.000"), 150.0);
        assert_eq!(parse_amount("  42 "), 42.0);
        assert_eq!(parse_amount("USD 9.99"), 9.99);
    }

    #[test]
    fn amounts_degrade_to_zero() {
        assert_eq!(parse_amount("n/a"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("."), 0.0);
        assert_eq!(parse_amount("1.2.3"), 0.0);
    }

    #[test]
    fn amounts_are_never_negative() {
        assert_eq!(parse_amount("-25"), 25.0);
        assert_eq!(parse_amount("(12.5)"), 12.5);
        for raw in ["-", "-0", "--1", "−7", "1e5", "NaN", "inf"] {
            assert!(parse_amount(raw) >= 0.0, "{raw} went negative");
        }
    }

    #[test]
    fn dates_in_common_formats() {
        assert_eq!(parse_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024/01/15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("1/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("15 Jan 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("Jan 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("January 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("15-Jan-2024"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn dates_with_time_of_day() {
        assert_eq!(parse_date("2024-03-02 10:30:00"), Some(ymd(2024, 3, 2)));
        assert_eq!(parse_date("3/2/2024 10:30"), Some(ymd(2024, 3, 2)));
        assert_eq!(
            parse_date("2024-03-01T17:00:00.000Z"),
            Some(ymd(2024, 3, 1))
        );
    }

    #[test]
    fn ambiguous_slashes_read_month_first() {
        assert_eq!(parse_date("02/03/2024"), Some(ymd(2024, 2, 3)));
    }

    #[test]
    fn day_first_when_month_first_is_impossible() {
        assert_eq!(parse_date("25/12/2024"), Some(ymd(2024, 12, 25)));
        assert_eq!(parse_date("13/01/2024"), Some(ymd(2024, 1, 13)));
        assert_eq!(parse_date("31/01/24"), Some(ymd(2024, 1, 31)));
    }

    #[test]
    fn two_digit_years_are_not_read_as_year_one() {
        assert_eq!(parse_date("1/5/24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("01/05/24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("12/31/99"), Some(ymd(1999, 12, 31)));
        assert_eq!(parse_date("24-01-05"), None);
    }

    #[test]
    fn iso_timestamps_without_offset() {
        assert_eq!(parse_date("2024-01-05T10:00:00"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T10:00"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05 10:00:00.000"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T10:00:00.123456"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }
}
