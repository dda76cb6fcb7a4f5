//! Lenient numeric scanning for configuration values.
//!
//! Both scanners follow C `strtoll` / `strtod` conventions: leading
//! whitespace is skipped, a sign is allowed, and trailing characters after
//! the number are ignored (logged at trace level). A value with no digits at
//! all, or one that does not fit the target type, is an error.

use tracing::trace;

use crate::error::{ParseError, ParseResult};

/// Scan a signed 64-bit integer from the start of `text`.
pub fn scan_ll(text: &str) -> ParseResult<i64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == digits_start {
        return Err(ParseError::InvalidInteger(text.to_string()));
    }

    let value = trimmed[..end]
        .parse::<i64>()
        .map_err(|_| ParseError::OutOfRange(text.to_string()))?;

    if end < trimmed.len() {
        trace!(text, leftover = &trimmed[end..], "characters left over after integer");
    }
    Ok(value)
}

/// Scan a double-precision float from the start of `text`.
///
/// Accepts decimal notation with an optional exponent plus `inf`,
/// `infinity` and `nan` in any case. Overflow to infinity and underflow of a
/// non-zero mantissa to zero are errors.
pub fn scan_double(text: &str) -> ParseResult<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if let Some(len) = special_float_len(&trimmed[end..]) {
        let value = trimmed[..end + len]
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber(text.to_string()))?;
        return Ok(value);
    }

    let mut mantissa_digits = 0;
    let mut nonzero_mantissa = false;
    while let Some(b) = bytes.get(end).copied().filter(u8::is_ascii_digit) {
        nonzero_mantissa |= b != b'0';
        mantissa_digits += 1;
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while let Some(b) = bytes.get(end).copied().filter(u8::is_ascii_digit) {
            nonzero_mantissa |= b != b'0';
            mantissa_digits += 1;
            end += 1;
        }
    }
    if mantissa_digits == 0 {
        return Err(ParseError::InvalidNumber(text.to_string()));
    }

    // Exponent only counts if at least one digit follows it
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let value = trimmed[..end]
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(text.to_string()))?;

    if value.is_infinite() || (value == 0.0 && nonzero_mantissa) {
        return Err(ParseError::OutOfRange(text.to_string()));
    }
    if end < trimmed.len() {
        trace!(text, leftover = &trimmed[end..], "characters left over after number");
    }
    Ok(value)
}

fn special_float_len(text: &str) -> Option<usize> {
    let lower = text.get(..8).unwrap_or(text).to_ascii_lowercase();
    if lower.starts_with("infinity") {
        Some(8)
    } else if lower.starts_with("inf") || lower.starts_with("nan") {
        Some(3)
    } else {
        None
    }
}
