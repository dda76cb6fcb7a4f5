//! Operation interval parsing (`10s`, `1m30s`, `500ms`, `PT1H`).

use crate::error::{ParseError, ParseResult};

/// Parse an interval specification into milliseconds.
///
/// Supports unit suffixes `ms`, `s`/`sec`, `m`/`min`, `h`/`hr` and `d`,
/// combinations such as "1h30m", a bare number (seconds), and ISO 8601
/// durations limited to weeks, days, hours, minutes and seconds
/// ("P1D", "PT1H30M", "PT0.5S").
pub fn parse_interval_ms(s: &str) -> ParseResult<u64> {
    let s = s.trim();
    let invalid = || ParseError::InvalidInterval(s.to_string());

    if s.is_empty() {
        return Err(invalid());
    }
    if s.starts_with('P') || s.starts_with('p') {
        return parse_iso_duration_ms(s).ok_or_else(invalid);
    }

    let mut total_ms: u64 = 0;
    let mut rest = s;
    let mut found_unit = false;

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(invalid());
        }
        let n: u64 = rest[..digits_end].parse().map_err(|_| invalid())?;
        rest = rest[digits_end..].trim_start();

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = rest[..unit_end].trim();
        rest = &rest[unit_end..];

        let factor = match unit.to_ascii_lowercase().as_str() {
            // Trailing number without unit is seconds, but only on its own
            "" if !found_unit => 1_000,
            "ms" | "msec" => 1,
            "s" | "sec" => 1_000,
            "m" | "min" => 60_000,
            "h" | "hr" => 3_600_000,
            "d" => 86_400_000,
            _ => return Err(invalid()),
        };
        found_unit |= !unit.is_empty();
        total_ms = n
            .checked_mul(factor)
            .and_then(|v| total_ms.checked_add(v))
            .ok_or_else(|| ParseError::OutOfRange(s.to_string()))?;
    }

    Ok(total_ms)
}

fn parse_iso_duration_ms(s: &str) -> Option<u64> {
    let body = &s[1..];
    if body.is_empty() {
        return None;
    }

    let mut total_ms: f64 = 0.0;
    let mut in_time = false;
    let mut num_buf = String::new();
    let mut any = false;

    for ch in body.chars() {
        match ch.to_ascii_uppercase() {
            'T' if !in_time && num_buf.is_empty() => in_time = true,
            c if c.is_ascii_digit() || c == '.' => num_buf.push(c),
            unit => {
                let n: f64 = num_buf.parse().ok()?;
                num_buf.clear();
                let factor = match (in_time, unit) {
                    (false, 'W') => 7.0 * 86_400_000.0,
                    (false, 'D') => 86_400_000.0,
                    (true, 'H') => 3_600_000.0,
                    (true, 'M') => 60_000.0,
                    (true, 'S') => 1_000.0,
                    _ => return None,
                };
                total_ms += n * factor;
                any = true;
            }
        }
    }

    if !num_buf.is_empty() || !any || !total_ms.is_finite() || total_ms > u64::MAX as f64 {
        return None;
    }
    Some(total_ms.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_suffixes() {
        assert_eq!(parse_interval_ms("500ms"), Ok(500));
        assert_eq!(parse_interval_ms("10s"), Ok(10_000));
        assert_eq!(parse_interval_ms("10sec"), Ok(10_000));
        assert_eq!(parse_interval_ms("2m"), Ok(120_000));
        assert_eq!(parse_interval_ms("2min"), Ok(120_000));
        assert_eq!(parse_interval_ms("1h"), Ok(3_600_000));
        assert_eq!(parse_interval_ms("1d"), Ok(86_400_000));
    }

    #[test]
    fn bare_number_is_seconds() {
        assert_eq!(parse_interval_ms("0"), Ok(0));
        assert_eq!(parse_interval_ms("15"), Ok(15_000));
        assert_eq!(parse_interval_ms(" 15 "), Ok(15_000));
    }

    #[test]
    fn combined_units() {
        assert_eq!(parse_interval_ms("1m30s"), Ok(90_000));
        assert_eq!(parse_interval_ms("1h 15m"), Ok(4_500_000));
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_interval_ms("PT1H30M"), Ok(5_400_000));
        assert_eq!(parse_interval_ms("P1D"), Ok(86_400_000));
        assert_eq!(parse_interval_ms("PT0.5S"), Ok(500));
        assert_eq!(parse_interval_ms("P1W"), Ok(604_800_000));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "abc", "10x", "1m30", "P", "PT", "P1H", "PT1D", "s10"] {
            assert!(parse_interval_ms(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
