//! Recurring calendar specifications.

use chrono::{DateTime, Datelike, Timelike, Utc};
use crm_core::range::{IntRange, RangePosition};
use tracing::{error, trace, warn};

use crate::outcome::RuleOutcome;
use crate::schema::DateSpec;

impl DateSpec {
    /// Configured range fields paired with their attribute names, in
    /// evaluation order.
    fn fields(&self) -> [(&'static str, Option<&str>); 11] {
        [
            ("years", self.years.as_deref()),
            ("months", self.months.as_deref()),
            ("monthdays", self.monthdays.as_deref()),
            ("hours", self.hours.as_deref()),
            ("minutes", self.minutes.as_deref()),
            ("seconds", self.seconds.as_deref()),
            ("yeardays", self.yeardays.as_deref()),
            ("weekyears", self.weekyears.as_deref()),
            ("weeks", self.weeks.as_deref()),
            ("weekdays", self.weekdays.as_deref()),
            ("moon", self.moon.as_deref()),
        ]
    }
}

/// Calendar field values of `now`, in the same order as [`DateSpec::fields`].
fn field_values(now: &DateTime<Utc>) -> [i64; 11] {
    let iso = now.iso_week();
    [
        i64::from(now.year()),
        i64::from(now.month()),
        i64::from(now.day()),
        i64::from(now.hour()),
        i64::from(now.minute()),
        i64::from(now.second()),
        i64::from(now.ordinal()),
        i64::from(iso.year()),
        i64::from(iso.week()),
        i64::from(now.weekday().number_from_monday()),
        i64::from(phase_of_the_moon(now)),
    ]
}

/// Moon phase of `now`: 0 is the new moon and 7 the full moon.
///
/// Approximation from the year's golden number and epact.
pub fn phase_of_the_moon(now: &DateTime<Utc>) -> u32 {
    let goldn = i64::from(now.year()).rem_euclid(19) + 1;
    let mut epact = (11 * goldn + 18) % 30;
    if (epact == 25 && goldn > 11) || epact == 24 {
        epact += 1;
    }
    let doy = i64::from(now.ordinal());
    // Always in 0..=7 after the mask
    ((((doy + epact) * 6 + 11) % 177 / 22) & 7) as u32
}

/// Check `now` against every configured range of `spec`.
///
/// The first field outside its range decides the outcome. A malformed
/// range is logged and that field ignored. No fields, or all fields in
/// range, is [`RuleOutcome::Ok`].
pub fn evaluate_date_spec(spec: &DateSpec, now: &DateTime<Utc>) -> RuleOutcome {
    let id = spec.id.as_deref().unwrap_or_else(|| {
        warn!("date_spec has no id");
        "without ID"
    });

    if spec.moon.is_some() {
        warn!(id, "support for 'moon' in date_spec is deprecated and will be removed");
    }

    let values = field_values(now);
    for ((attribute, range), value) in spec.fields().into_iter().zip(values) {
        let outcome = check_range(id, attribute, range, value);
        if outcome != RuleOutcome::Ok {
            return outcome;
        }
    }
    RuleOutcome::Ok
}

fn check_range(id: &str, attribute: &str, range: Option<&str>, value: i64) -> RuleOutcome {
    let Some(text) = range else {
        return RuleOutcome::Ok;
    };

    let outcome = match text.parse::<IntRange>() {
        Ok(parsed) => match parsed.position(value) {
            RangePosition::Below => RuleOutcome::BeforeRange,
            RangePosition::Above => RuleOutcome::AfterRange,
            RangePosition::Within => RuleOutcome::Ok,
        },
        Err(e) => {
            error!(id, attribute, range = text, error = %e, "ignoring date_spec attribute with invalid range");
            RuleOutcome::Ok
        }
    };
    trace!(id, attribute, range = text, value, %outcome, "checked date_spec range");
    outcome
}
