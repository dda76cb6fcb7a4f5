//! ISO 8601 date/time parsing and calendar arithmetic.
//!
//! All points in time are normalized to UTC. Text without an explicit offset
//! is taken to be UTC already.

use chrono::{
    DateTime, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, TimeZone, Utc,
};

use crate::error::{ParseError, ParseResult};

/// Formats carrying an explicit UTC offset (after `T`/`Z` normalization).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Formats without an offset, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Date-only formats (calendar, ordinal, ISO week), interpreted as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%j", "%G-W%V-%u"];

/// Parse a date/time string into a UTC timestamp.
///
/// Accepted forms:
/// - `2024-01-01 12:00:00`, `2024-01-01T12:00:00`, optionally with fractional
///   seconds and a `Z`, `+02:00` or `+0200` suffix
/// - `2024-01-01 12:00`
/// - `2024-01-01` (midnight)
/// - `2024-032` (ordinal date)
/// - `2024-W05-3` (ISO week date)
pub fn parse_datetime(text: &str) -> ParseResult<DateTime<Utc>> {
    let normalized = normalize(text);
    let normalized = normalized.as_str();

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(normalized, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(normalized, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(normalized, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }
    }

    Err(ParseError::InvalidTimestamp(text.to_string()))
}

/// Trim, replace the `T` date/time separator with a space, and expand a
/// trailing `Z` into an explicit zero offset.
fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    let mut out = match trimmed.find('T') {
        Some(pos) if pos == 10 => format!("{} {}", &trimmed[..pos], &trimmed[pos + 1..]),
        _ => trimmed.to_string(),
    };
    if out.ends_with('Z') || out.ends_with('z') {
        out.pop();
        out.push_str("+00:00");
    }
    out
}

/// Format a timestamp the way rule configuration writes them.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%SZ").to_string()
}

/// Calendar component that can be added to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeComponent {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeComponent {
    /// All components, in the order durations apply them.
    pub const ALL: [TimeComponent; 7] = [
        TimeComponent::Years,
        TimeComponent::Months,
        TimeComponent::Weeks,
        TimeComponent::Days,
        TimeComponent::Hours,
        TimeComponent::Minutes,
        TimeComponent::Seconds,
    ];

    /// Configuration attribute name for this component.
    pub fn attr(self) -> &'static str {
        match self {
            TimeComponent::Years => "years",
            TimeComponent::Months => "months",
            TimeComponent::Weeks => "weeks",
            TimeComponent::Days => "days",
            TimeComponent::Hours => "hours",
            TimeComponent::Minutes => "minutes",
            TimeComponent::Seconds => "seconds",
        }
    }

    /// Add `amount` of this component to `dt`.
    ///
    /// Month and year arithmetic keeps the day of month unless the target
    /// month is shorter, in which case it clamps to the month's last day.
    /// Returns `None` if the result is not representable.
    pub fn add_to(self, dt: &DateTime<Utc>, amount: i64) -> Option<DateTime<Utc>> {
        match self {
            TimeComponent::Years => add_months(dt, amount.checked_mul(12)?),
            TimeComponent::Months => add_months(dt, amount),
            TimeComponent::Weeks => dt.checked_add_signed(Duration::try_weeks(amount)?),
            TimeComponent::Days => dt.checked_add_signed(Duration::try_days(amount)?),
            TimeComponent::Hours => dt.checked_add_signed(Duration::try_hours(amount)?),
            TimeComponent::Minutes => dt.checked_add_signed(Duration::try_minutes(amount)?),
            TimeComponent::Seconds => add_seconds(dt, amount),
        }
    }
}

impl std::fmt::Display for TimeComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.attr())
    }
}

/// Add a signed number of seconds to `dt`.
pub fn add_seconds(dt: &DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    dt.checked_add_signed(Duration::try_seconds(seconds)?)
}

fn add_months(dt: &DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        dt.checked_add_months(magnitude)
    } else {
        dt.checked_sub_months(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parse_space_and_t_separators() {
        assert_eq!(parse_datetime("2024-01-01 00:00:00").unwrap(), utc(2024, 1, 1, 0, 0, 0));
        assert_eq!(parse_datetime("2024-01-15T12:30:45").unwrap(), utc(2024, 1, 15, 12, 30, 45));
    }

    #[test]
    fn parse_with_offsets() {
        assert_eq!(parse_datetime("2024-01-01T00:00:00Z").unwrap(), utc(2024, 1, 1, 0, 0, 0));
        assert_eq!(
            parse_datetime("2024-01-01T02:00:00+02:00").unwrap(),
            utc(2024, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            parse_datetime("2024-01-01 00:00:00-0130").unwrap(),
            utc(2024, 1, 1, 1, 30, 0)
        );
    }

    #[test]
    fn parse_fractional_seconds() {
        let dt = parse_datetime("2024-03-01T08:00:00.250").unwrap();
        assert_eq!(dt.second(), 0);
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn parse_date_only_forms() {
        assert_eq!(parse_datetime("2024-02-29").unwrap(), utc(2024, 2, 29, 0, 0, 0));
        assert_eq!(parse_datetime("2024-032").unwrap(), utc(2024, 2, 1, 0, 0, 0));
        // ISO week 1 of 2024 starts on Monday 2024-01-01
        assert_eq!(parse_datetime("2024-W01-3").unwrap(), utc(2024, 1, 3, 0, 0, 0));
    }

    #[test]
    fn parse_without_seconds() {
        assert_eq!(parse_datetime("2024-06-01 09:15").unwrap(), utc(2024, 6, 1, 9, 15, 0));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_datetime("").is_err());
        assert!(parse_datetime("yesterday").is_err());
        assert!(parse_datetime("2024-13-01").is_err());
        assert!(parse_datetime("2023-02-29 00:00:00").is_err());
    }

    #[test]
    fn add_months_clamps_day_of_month() {
        let jan31 = utc(2024, 1, 31, 10, 0, 0);
        assert_eq!(TimeComponent::Months.add_to(&jan31, 1), Some(utc(2024, 2, 29, 10, 0, 0)));
        assert_eq!(TimeComponent::Months.add_to(&jan31, -2), Some(utc(2023, 11, 30, 10, 0, 0)));
    }

    #[test]
    fn add_years_from_leap_day() {
        let leap = utc(2024, 2, 29, 0, 0, 0);
        assert_eq!(TimeComponent::Years.add_to(&leap, 1), Some(utc(2025, 2, 28, 0, 0, 0)));
        assert_eq!(TimeComponent::Years.add_to(&leap, 4), Some(utc(2028, 2, 29, 0, 0, 0)));
    }

    #[test]
    fn add_fixed_components() {
        let start = utc(2024, 12, 31, 23, 59, 59);
        assert_eq!(TimeComponent::Seconds.add_to(&start, 1), Some(utc(2025, 1, 1, 0, 0, 0)));
        assert_eq!(TimeComponent::Weeks.add_to(&start, -1), Some(utc(2024, 12, 24, 23, 59, 59)));
        assert_eq!(TimeComponent::Hours.add_to(&start, 25), Some(utc(2025, 1, 2, 0, 59, 59)));
    }

    #[test]
    fn add_out_of_range_returns_none() {
        let start = utc(2024, 1, 1, 0, 0, 0);
        assert_eq!(TimeComponent::Days.add_to(&start, i64::MAX), None);
        assert_eq!(TimeComponent::Years.add_to(&start, i64::MAX), None);
    }

    #[test]
    fn format_round_trips() {
        let dt = utc(2024, 2, 1, 0, 0, 1);
        assert_eq!(format_datetime(&dt), "2024-02-01 00:00:01Z");
        assert_eq!(parse_datetime(&format_datetime(&dt)).unwrap(), dt);
    }
}
