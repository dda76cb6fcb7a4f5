//! Integer range text such as `9-17`, `5`, `3-` or `-10`.

use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, ParseResult};

/// An inclusive integer range; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntRange {
    pub low: Option<i64>,
    pub high: Option<i64>,
}

/// Where a value falls relative to an [`IntRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePosition {
    Below,
    Within,
    Above,
}

impl IntRange {
    pub fn new(low: Option<i64>, high: Option<i64>) -> Self {
        Self { low, high }
    }

    /// Locate `value` relative to this range.
    pub fn position(&self, value: i64) -> RangePosition {
        match (self.low, self.high) {
            (Some(low), _) if value < low => RangePosition::Below,
            (_, Some(high)) if value > high => RangePosition::Above,
            _ => RangePosition::Within,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.position(value) == RangePosition::Within
    }
}

impl FromStr for IntRange {
    type Err = ParseError;

    /// Parse `N`, `N-M`, `N-` or `-M`. Bounds are non-negative decimal
    /// integers; a low bound greater than the high bound is rejected.
    fn from_str(s: &str) -> ParseResult<Self> {
        let text = s.trim();
        let invalid = || ParseError::InvalidRange(s.to_string());

        let (low, high) = match text.split_once('-') {
            None => {
                let value = parse_bound(text).ok_or_else(invalid)?;
                (Some(value), Some(value))
            }
            Some((low, high)) => {
                let low = if low.is_empty() {
                    None
                } else {
                    Some(parse_bound(low).ok_or_else(invalid)?)
                };
                let high = if high.is_empty() {
                    None
                } else {
                    Some(parse_bound(high).ok_or_else(invalid)?)
                };
                (low, high)
            }
        };

        match (low, high) {
            (None, None) => Err(invalid()),
            (Some(l), Some(h)) if l > h => Err(invalid()),
            _ => Ok(Self { low, high }),
        }
    }
}

fn parse_bound(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.low, self.high) {
            (Some(l), Some(h)) if l == h => write!(f, "{l}"),
            (Some(l), Some(h)) => write!(f, "{l}-{h}"),
            (Some(l), None) => write!(f, "{l}-"),
            (None, Some(h)) => write!(f, "-{h}"),
            (None, None) => f.write_str("-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_value() {
        assert_eq!("5".parse(), Ok(IntRange::new(Some(5), Some(5))));
    }

    #[test]
    fn parse_closed_and_open_ranges() {
        assert_eq!("9-17".parse(), Ok(IntRange::new(Some(9), Some(17))));
        assert_eq!("3-".parse(), Ok(IntRange::new(Some(3), None)));
        assert_eq!("-10".parse(), Ok(IntRange::new(None, Some(10))));
        assert_eq!(" 1 - 5 ".parse(), Ok(IntRange::new(Some(1), Some(5))));
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for bad in ["", "-", "abc", "1-2-3", "x-5", "5-y", "17-9", "1.5"] {
            assert!(bad.parse::<IntRange>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn position_matches_bounds() {
        let range = IntRange::new(Some(9), Some(17));
        for v in 0..30 {
            let expected = if v < 9 {
                RangePosition::Below
            } else if v > 17 {
                RangePosition::Above
            } else {
                RangePosition::Within
            };
            assert_eq!(range.position(v), expected, "value {v}");
        }
    }

    #[test]
    fn open_bounds_never_fail_their_side() {
        assert!(IntRange::new(None, Some(3)).contains(-1000));
        assert!(IntRange::new(Some(3), None).contains(i64::MAX));
    }

    #[test]
    fn display_matches_parse_syntax() {
        for text in ["5", "9-17", "3-", "-10"] {
            let range: IntRange = text.parse().unwrap();
            assert_eq!(range.to_string(), text);
        }
    }
}
