//! Calendar-aware duration arithmetic.

use chrono::{DateTime, Utc};
use crm_core::iso8601::TimeComponent;
use crm_core::numeric::scan_ll;
use tracing::warn;

use crate::error::{Result, RuleError};
use crate::schema::DurationSpec;

impl DurationSpec {
    /// Raw text of one component, if configured.
    pub fn component(&self, component: TimeComponent) -> Option<&str> {
        match component {
            TimeComponent::Years => self.years.as_deref(),
            TimeComponent::Months => self.months.as_deref(),
            TimeComponent::Weeks => self.weeks.as_deref(),
            TimeComponent::Days => self.days.as_deref(),
            TimeComponent::Hours => self.hours.as_deref(),
            TimeComponent::Minutes => self.minutes.as_deref(),
            TimeComponent::Seconds => self.seconds.as_deref(),
        }
    }
}

/// Compute `start + duration` into `end`.
///
/// `end` must be empty on entry. Each configured component is added on its
/// own; an invalid one is logged and skipped while the rest still apply.
/// The first component error is returned, but `end` always holds the
/// best-effort result once the arguments are valid.
pub fn unpack_duration(
    duration: Option<&DurationSpec>,
    start: Option<&DateTime<Utc>>,
    end: &mut Option<DateTime<Utc>>,
) -> Result<()> {
    let (Some(duration), Some(start)) = (duration, start) else {
        return Err(RuleError::InvalidArgument(
            "duration and start time are required".to_string(),
        ));
    };
    if end.is_some() {
        return Err(RuleError::InvalidArgument(
            "duration end time is already set".to_string(),
        ));
    }

    let id = duration.id.as_deref().unwrap_or_else(|| {
        warn!("duration has no id");
        "without ID"
    });

    let mut result = *start;
    let mut first_error = None;

    for component in TimeComponent::ALL {
        let Some(value) = duration.component(component) else {
            continue;
        };
        match add_component(&result, component, value) {
            Ok(updated) => result = updated,
            Err(reason) => {
                warn!(id, attribute = component.attr(), value, %reason, "ignoring invalid duration component");
                if first_error.is_none() {
                    first_error = Some(RuleError::InvalidDuration {
                        id: id.to_string(),
                        component,
                        value: value.to_string(),
                        reason,
                    });
                }
            }
        }
    }

    *end = Some(result);
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn add_component(
    dt: &DateTime<Utc>,
    component: TimeComponent,
    value: &str,
) -> std::result::Result<DateTime<Utc>, String> {
    let amount = scan_ll(value).map_err(|e| e.to_string())?;
    if i32::try_from(amount).is_err() {
        return Err(format!("'{value}' is out of range"));
    }
    component
        .add_to(dt, amount)
        .ok_or_else(|| "result is not a representable time".to_string())
}
