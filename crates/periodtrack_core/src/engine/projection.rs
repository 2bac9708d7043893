//! Forward projection of upcoming period dates.

use chrono::{Days, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Projection input rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    /// A zero-day cycle cannot produce strictly ascending dates.
    InvalidCycleLength(u32),
    /// A projected date falls outside the supported calendar range.
    OutOfRange { step: usize },
}

impl Display for ProjectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCycleLength(days) => {
                write!(f, "cycle length must be at least 1 day, got {days}")
            }
            Self::OutOfRange { step } => {
                write!(f, "projected date {step} is outside the supported calendar range")
            }
        }
    }
}

impl Error for ProjectionError {}

/// Projects `count` period onsets after `start`, each `cycle_length_days`
/// after the previous one.
///
/// The first date is `start + cycle_length_days`; `start` itself is not
/// included. Output is strictly ascending and identical for identical inputs.
pub fn project_periods(
    start: NaiveDate,
    cycle_length_days: u32,
    count: usize,
) -> Result<Vec<NaiveDate>, ProjectionError> {
    if cycle_length_days == 0 {
        return Err(ProjectionError::InvalidCycleLength(cycle_length_days));
    }

    // Steps that still fit before the end of the calendar.
    let span_days = u64::try_from((NaiveDate::MAX - start).num_days()).unwrap_or(0);
    let fitting_steps =
        usize::try_from(span_days / u64::from(cycle_length_days)).unwrap_or(usize::MAX);
    if count > fitting_steps {
        return Err(ProjectionError::OutOfRange {
            step: fitting_steps + 1,
        });
    }

    let step = Days::new(u64::from(cycle_length_days));
    let mut cursor = start;
    let mut dates = Vec::with_capacity(count);
    for position in 0..count {
        cursor = cursor
            .checked_add_days(step)
            .ok_or(ProjectionError::OutOfRange { step: position + 1 })?;
        dates.push(cursor);
    }
    Ok(dates)
}
