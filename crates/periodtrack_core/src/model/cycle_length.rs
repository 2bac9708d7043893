//! Cycle length value and input coercion.
//!
//! # Responsibility
//! - Classify stored `cycleLength` values as valid, missing or invalid.
//! - Coerce free-form text input into a clamped day count with advisories.
//!
//! # Invariants
//! - `CycleLength::Days(n)` always satisfies `MIN_CYCLE_LENGTH_DAYS <= n <= MAX_CYCLE_LENGTH_DAYS`.
//! - `CycleLength::Invalid` keeps the raw stored value so re-saves are lossless.

use serde_json::Value;

/// Shortest cycle length accepted for aggregation.
pub const MIN_CYCLE_LENGTH_DAYS: u32 = 1;
/// Longest cycle length accepted for aggregation.
pub const MAX_CYCLE_LENGTH_DAYS: u32 = 120;

const SHORT_CYCLE_ADVISORY_BELOW: u32 = 21;
const SHORT_CYCLE_ADVISORY_ABOVE: u32 = 7;
const LONG_CYCLE_ADVISORY_ABOVE: u32 = 35;

/// User-entered cycle length attached to one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleLength {
    /// Valid day count in the accepted range.
    Days(u32),
    /// Absent, null or empty in storage. Callers apply the default length.
    Missing,
    /// Non-numeric or out-of-range value, kept verbatim for display and re-save.
    Invalid(Value),
}

impl CycleLength {
    /// Classifies a stored JSON value.
    ///
    /// Strings are accepted because the logging form historically stored the
    /// raw text field (`"28"`).
    pub fn from_raw(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return Self::Missing;
        };

        match value {
            Value::Null => Self::Missing,
            Value::String(text) if text.trim().is_empty() => Self::Missing,
            Value::String(text) => match text.trim().parse::<u64>() {
                Ok(days) => Self::from_day_count(days, value),
                Err(_) => Self::Invalid(value.clone()),
            },
            Value::Number(number) => match number.as_u64() {
                Some(days) => Self::from_day_count(days, value),
                None => match number.as_f64() {
                    Some(days) if days.fract() == 0.0 && days >= 0.0 => {
                        Self::from_day_count(days as u64, value)
                    }
                    _ => Self::Invalid(value.clone()),
                },
            },
            _ => Self::Invalid(value.clone()),
        }
    }

    fn from_day_count(days: u64, raw: &Value) -> Self {
        match u32::try_from(days) {
            Ok(days) if is_accepted_day_count(days) => Self::Days(days),
            _ => Self::Invalid(raw.clone()),
        }
    }

    /// Returns the day count when valid.
    pub fn days(&self) -> Option<u32> {
        match self {
            Self::Days(days) => Some(*days),
            Self::Missing | Self::Invalid(_) => None,
        }
    }

    /// Returns the day count, substituting `default_days` for missing values.
    ///
    /// Invalid values stay excluded and return `None`.
    pub fn days_or(&self, default_days: u32) -> Option<u32> {
        match self {
            Self::Days(days) => Some(*days),
            Self::Missing => Some(default_days),
            Self::Invalid(_) => None,
        }
    }

    /// Returns whether the stored value was rejected.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Returns the JSON value written back to storage, `None` when absent.
    pub fn to_raw(&self) -> Option<Value> {
        match self {
            Self::Days(days) => Some(Value::from(*days)),
            Self::Missing => None,
            Self::Invalid(raw) => Some(raw.clone()),
        }
    }
}

/// Returns whether `days` lies in the accepted cycle length range.
pub fn is_accepted_day_count(days: u32) -> bool {
    (MIN_CYCLE_LENGTH_DAYS..=MAX_CYCLE_LENGTH_DAYS).contains(&days)
}

/// Health advisory raised for unusual cycle lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleAdvisory {
    /// Shorter than 21 days; may indicate frequent ovulation or hormonal imbalance.
    ShortCycle,
    /// Longer than 35 days; may indicate a condition such as PCOS.
    LongCycle,
}

impl CycleAdvisory {
    /// Stable identifier used across the FFI boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShortCycle => "short_cycle",
            Self::LongCycle => "long_cycle",
        }
    }

    /// User-facing advisory text.
    pub fn message(self) -> &'static str {
        match self {
            Self::ShortCycle => {
                "A cycle length shorter than 21 days can be a sign of frequent ovulation or \
                 other hormonal imbalances. Please consult a doctor for advice."
            }
            Self::LongCycle => {
                "A cycle length greater than 35 days might indicate a condition like \
                 polycystic ovary syndrome (PCOS). Please consult a doctor for advice."
            }
        }
    }
}

/// Result of coercing cycle length text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleLengthInput {
    /// Clamped day count, `None` when the input holds no digits.
    pub days: Option<u32>,
    /// Advisory to show for the coerced value.
    pub advisory: Option<CycleAdvisory>,
}

/// Coerces free-form text into a cycle length.
///
/// Rules:
/// - Non-digit characters are discarded.
/// - No digits left means no value.
/// - The value is clamped to `1..=120`.
/// - `ShortCycle` is raised for `8..=20`, `LongCycle` above 35.
pub fn parse_cycle_length_input(text: &str) -> CycleLengthInput {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return CycleLengthInput {
            days: None,
            advisory: None,
        };
    }

    // Overlong digit strings saturate before clamping.
    let parsed = digits.parse::<u64>().unwrap_or(u64::MAX);
    let days = u32::try_from(parsed)
        .unwrap_or(MAX_CYCLE_LENGTH_DAYS)
        .clamp(MIN_CYCLE_LENGTH_DAYS, MAX_CYCLE_LENGTH_DAYS);

    let advisory = if days > SHORT_CYCLE_ADVISORY_ABOVE && days < SHORT_CYCLE_ADVISORY_BELOW {
        Some(CycleAdvisory::ShortCycle)
    } else if days > LONG_CYCLE_ADVISORY_ABOVE {
        Some(CycleAdvisory::LongCycle)
    } else {
        None
    };

    CycleLengthInput {
        days: Some(days),
        advisory,
    }
}
