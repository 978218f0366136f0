//! Display transforms for form fields.
//!
//! None of these functions fail: unparseable input degrades to a passthrough
//! (dates, phones) or to a not-a-number value (currency).

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Display pattern for dates: two-digit day and month, four-digit year.
pub const DATE_DISPLAY_FORMAT: &str = "%d-%m-%Y";

const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", DATE_DISPLAY_FORMAT, "%d/%m/%Y"];

fn date_shape() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("static pattern compiles"))
}

/// Formats a date as `DD-MM-YYYY`.
///
/// Accepts ISO dates (`1980-04-02`), RFC 3339 timestamps, and dates already
/// written `DD-MM-YYYY` or `DD/MM/YYYY`. Anything else comes back unchanged,
/// so the result is a best-effort display string, not a validated date.
pub fn format_date(input: &str) -> String {
    let trimmed = input.trim();
    parse_date(trimmed)
        .map(format_naive_date)
        .unwrap_or_else(|| input.to_string())
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format(DATE_DISPLAY_FORMAT).to_string()
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(timestamp.date_naive());
    }
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

/// True only for `DD-MM-YYYY` strings naming a real calendar day.
///
/// Anything [`format_date`] produces from a date it could parse passes.
pub fn is_valid_date(input: &str) -> bool {
    date_shape().is_match(input)
        && NaiveDate::parse_from_str(input, DATE_DISPLAY_FORMAT).is_ok()
}

/// A currency amount as a form supplies it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrencyInput<'a> {
    Number(f64),
    Text(&'a str),
}

impl From<f64> for CurrencyInput<'_> {
    fn from(value: f64) -> Self {
        CurrencyInput::Number(value)
    }
}

impl<'a> From<&'a str> for CurrencyInput<'a> {
    fn from(value: &'a str) -> Self {
        CurrencyInput::Text(value)
    }
}

/// Formats an amount as pounds sterling with two decimals: `-£1,234.50`.
///
/// Text is read with [`parse_currency`]; garbage renders as `£NaN`.
pub fn format_currency<'a>(input: impl Into<CurrencyInput<'a>>) -> String {
    let amount = match input.into() {
        CurrencyInput::Number(n) => n,
        CurrencyInput::Text(s) => parse_currency(s),
    };

    if amount.is_nan() {
        return "£NaN".to_string();
    }
    if amount.is_infinite() {
        return if amount < 0.0 { "-£∞" } else { "£∞" }.to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let negative = amount < 0.0 && fixed != "0.00";

    format!(
        "{}£{}.{}",
        if negative { "-" } else { "" },
        group_thousands(whole),
        fraction
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Strips everything but digits, `.` and `-`, then reads the longest numeric
/// prefix. Returns NaN when nothing numeric remains.
pub fn parse_currency(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let end = numeric_prefix_len(cleaned.as_bytes());
    if end == 0 {
        return f64::NAN;
    }
    cleaned[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Length of the longest prefix shaped `-?digits[.digits]` that ends in a digit,
/// or 0 when there is none.
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let mut i = usize::from(bytes.first() == Some(&b'-'));
    let mut end = 0;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'0'..=b'9' => end = i + 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        i += 1;
    }
    end
}

/// Regroups a 12-digit international number (2-digit country code + 4 + 6)
/// as `+44 7700 900123`. Any other digit count returns the bare digits.
pub fn format_phone(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 12 {
        return digits;
    }
    format!("+{} {} {}", &digits[..2], &digits[2..6], &digits[6..])
}

/// Display form of a stored 14-digit phone field (`00` + 12-digit number).
///
/// Drops the `00` international prefix before regrouping; any other input is
/// handled by [`format_phone`].
pub fn display_stored_phone(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix("00") {
        Some(rest) if rest.len() == 12 => format_phone(rest),
        _ => format_phone(&digits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_inputs() {
        assert_eq!(format_date("1980-04-02"), "02-04-1980");
        assert_eq!(format_date("2024-12-31T23:30:00Z"), "31-12-2024");
        assert_eq!(format_date("02/04/1980"), "02-04-1980");
        assert_eq!(format_date("02-04-1980"), "02-04-1980");
    }

    #[test]
    fn test_format_date_passthrough() {
        assert_eq!(format_date("next tuesday"), "next tuesday");
        assert_eq!(format_date("2023-02-30"), "2023-02-30");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date("29-02-2024"));
        assert!(!is_valid_date("29-02-2023"));
        assert!(!is_valid_date("2-4-1980"));
        assert!(!is_valid_date("02/04/1980"));
        assert!(!is_valid_date("1980-04-02"));
    }

    #[test]
    fn test_formatter_output_passes_validator() {
        for input in ["1980-04-02", "2000-01-01T00:00:00+01:00", "07/11/1999"] {
            assert!(is_valid_date(&format_date(input)), "{}", input);
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5), "£1,234.50");
        assert_eq!(format_currency(-1234567.891), "-£1,234,567.89");
        assert_eq!(format_currency(0.0), "£0.00");
        assert_eq!(format_currency(-0.001), "£0.00");
        assert_eq!(format_currency(999.999), "£1,000.00");
        assert_eq!(format_currency("2500"), "£2,500.00");
        assert_eq!(format_currency("abc"), "£NaN");
        assert_eq!(format_currency(f64::NAN), "£NaN");
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("£1,234.50"), 1234.5);
        assert_eq!(parse_currency("-£20"), -20.0);
        assert_eq!(parse_currency("1.2.3"), 1.2);
        assert!(parse_currency("").is_nan());
        assert!(parse_currency("n/a").is_nan());
        assert!(parse_currency("-").is_nan());
        assert_eq!(parse_currency("-12.5.3-4"), -12.5);
        assert_eq!(parse_currency("£.75"), 0.75);
        assert_eq!(parse_currency("7-3"), 7.0);
        assert!(parse_currency("--5").is_nan());
    }

    #[test]
    fn test_parse_currency_long_garbage_input() {
        let garbage = ".-".repeat(200_000);
        assert!(parse_currency(&garbage).is_nan());

        let digits = format!("12.5{}", "-.".repeat(200_000));
        assert_eq!(parse_currency(&digits), 12.5);
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("447700900123"), "+44 7700 900123");
        assert_eq!(format_phone("+44 (7700) 900-123"), "+44 7700 900123");
        assert_eq!(format_phone("07700 900123"), "07700900123");
        assert_eq!(format_phone("00447700900123"), "00447700900123");
    }

    #[test]
    fn test_display_stored_phone() {
        assert_eq!(display_stored_phone("00447700900123"), "+44 7700 900123");
        assert_eq!(display_stored_phone("447700900123"), "+44 7700 900123");
        assert_eq!(display_stored_phone("12345678901234"), "12345678901234");
    }
}
