use thiserror::Error;

/// Amounts are held as integer cents so that category totals add up exactly.
/// 1 unit = 100 cents, so 4.50 = 450 cents.
pub type Cents = i64;

/// Largest magnitude a single parsed amount may have: 999,999,999,999.99.
/// Keeps any realistic number of expenses far away from `Cents` overflow
/// when they are summed.
pub const MAX_AMOUNT_CENTS: Cents = 99_999_999_999_999;

/// Format cents as a plain decimal string.
/// Example: 450 -> "4.50", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, magnitude / 100, magnitude % 100)
}

/// Parse user-typed amount text into cents.
///
/// Accepts an optional sign, whole units and up to any number of fractional
/// digits; anything past the second fractional digit rounds half away from
/// zero. Negative and zero amounts are valid; the magnitude is limited to
/// [`MAX_AMOUNT_CENTS`] in either direction.
///
/// Example: "4.5" -> 450, "-2" -> -200, "0.005" -> 1
pub fn parse_amount(input: &str) -> Result<Cents, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    let invalid = || AmountError::InvalidFormat(trimmed.to_string());

    let (negative, unsigned) = if let Some(rest) = trimmed.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_prefix('+') {
        (false, rest)
    } else {
        (false, trimmed)
    };

    let (units_str, fraction_str) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(units_str) || !all_digits(fraction_str) {
        return Err(invalid());
    }

    let out_of_range = || AmountError::OutOfRange(trimmed.to_string());
    let units: i64 = if units_str.is_empty() {
        0
    } else {
        // Only digits remain, so a parse failure means overflow
        units_str.parse().map_err(|_| out_of_range())?
    };

    let mut digits = fraction_str.bytes().map(|b| i64::from(b - b'0'));
    let tens = digits.next().unwrap_or(0);
    let ones = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(tens * 10 + ones + i64::from(round_up)))
        .filter(|c| *c <= MAX_AMOUNT_CENTS)
        .ok_or_else(out_of_range)?;

    Ok(if negative { -cents } else { cents })
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a number")]
    InvalidFormat(String),

    #[error("'{0}' is out of range")]
    OutOfRange(String),
}
