//! Normalisation of raw user input.
//!
//! Every function in here is pure, never fails and is idempotent: feeding the output back in
//! gives the same output. The output is always a safe input for the matching validator in
//! [`crate::validate`].
use lazy_static::lazy_static;
use regex::Regex;

pub const MAX_ACCOUNT_LEN: usize = 128;
pub const MAX_TOKEN_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_TICKET_ID_LEN: usize = 128;
pub const MAX_DATES_LEN: usize = 10_000;

/// Smallest number of hours a single entry may hold
pub const MIN_HOURS: f64 = 0.01;
/// Largest number of hours a single entry may hold, which is also the daily cap
pub const MAX_HOURS: f64 = 8.0;

lazy_static! {
    static ref NOT_ACCOUNT_CHAR: Regex = Regex::new(r"[^A-Za-z0-9_.\-]").unwrap();
    static ref NOT_TICKET_CHAR: Regex = Regex::new(r"[^A-Za-z0-9\-]").unwrap();
    static ref NOT_DATES_CHAR: Regex = Regex::new(r"[^0-9A-Za-z/,\-\s]").unwrap();
    static ref COMMA_SPACING: Regex = Regex::new(r"\s*,\s*").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"^\s*([+-]?(?:(?i:inf(?:inity)?)|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?))")
            .unwrap();
}

/// Keeps the first `max_len` characters (not bytes)
fn truncate(input: &str, max_len: usize) -> String {
    input.chars().take(max_len).collect()
}

/// Account names: letters, digits and `_`, `.`, `-`
#[must_use]
pub fn sanitize_account(input: &str) -> String {
    truncate(&NOT_ACCOUNT_CHAR.replace_all(input, ""), MAX_ACCOUNT_LEN)
}

/// Tokens are opaque, only the length is limited
#[must_use]
pub fn sanitize_token(input: &str) -> String {
    truncate(input, MAX_TOKEN_LEN)
}

#[must_use]
pub fn sanitize_description(input: &str) -> String {
    truncate(input, MAX_DESCRIPTION_LEN)
}

/// Ticket ids like `ABC-123`: letters, digits and dash, upper cased
#[must_use]
pub fn sanitize_ticket_id(input: &str) -> String {
    truncate(
        &NOT_TICKET_CHAR.replace_all(input, "").to_uppercase(),
        MAX_TICKET_ID_LEN,
    )
}

/// List of dates like `20/Aug/25, 21/Aug/25`. Keeps digits, letters, `/`, `,`, `-` and
/// white space, puts exactly one space after every comma and collapses white space.
#[must_use]
pub fn sanitize_dates(input: &str) -> String {
    let filtered = NOT_DATES_CHAR.replace_all(input, "");
    let comma_spaced = COMMA_SPACING.replace_all(&filtered, ", ");
    let collapsed = WHITESPACE_RUN.replace_all(&comma_spaced, " ");
    truncate(&collapsed, MAX_DATES_LEN)
}

/// Parses the leading number of `input`, ignoring whatever follows it, so `"3.5h"` gives
/// `3.5`. `None` if the text does not start with a number.
#[must_use]
pub fn parse_hours(input: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(input)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Clamps hours into `[MIN_HOURS, MAX_HOURS]` and rounds to two decimals.
///
/// Values which are not a number or below the minimum become the minimum, values above the
/// maximum become the maximum. Rounding is half-up on the value scaled by 100, so `0.125`
/// becomes `0.13`.
#[must_use]
pub fn clamp_hours(hours: f64) -> f64 {
    if hours.is_nan() || hours < MIN_HOURS {
        return MIN_HOURS;
    }
    if hours > MAX_HOURS {
        return MAX_HOURS;
    }
    (hours * 100.0).round() / 100.0
}

/// [`clamp_hours`] applied to raw text
#[must_use]
pub fn sanitize_hours(input: &str) -> f64 {
    clamp_hours(parse_hours(input).unwrap_or(f64::NAN))
}
