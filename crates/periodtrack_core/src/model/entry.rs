//! Period entry domain model.
//!
//! # Responsibility
//! - Define the strict `Entry` record produced by normalization.
//! - Build new entries from logging form input, including the stored
//!   next-period prediction.
//! - Define the JSON wire shape written to the entry blob.
//!
//! # Invariants
//! - `date` is always present; records without a parseable date never become
//!   entries.
//! - `source_index` is the record position in the stored collection and is the
//!   only handle used for deletion.
//! - Wire keys match what the mobile app has always written
//!   (`date`, `lastPeriod`, `cycleLength`, `selectedSymptoms`, `notes`,
//!   `predictedNextPeriod`).

use crate::model::cycle_length::{is_accepted_day_count, CycleLength};
use crate::model::symptom::normalize_symptoms;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire key of the instant the entry was logged.
pub const FIELD_DATE: &str = "date";
/// Wire key of the period start instant.
pub const FIELD_LAST_PERIOD: &str = "lastPeriod";
/// Alternate wire key of the period start instant, accepted on read.
pub const FIELD_LAST_PERIOD_START: &str = "lastPeriodStart";
/// Wire key of the user-entered cycle length.
pub const FIELD_CYCLE_LENGTH: &str = "cycleLength";
/// Wire key of the selected symptom labels.
pub const FIELD_SELECTED_SYMPTOMS: &str = "selectedSymptoms";
/// Wire key of the free-form notes.
pub const FIELD_NOTES: &str = "notes";
/// Wire key of the prediction computed at log time.
pub const FIELD_PREDICTED_NEXT_PERIOD: &str = "predictedNextPeriod";

/// One logged period record after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Position of the raw record in the stored collection.
    pub source_index: usize,
    /// Instant the entry was logged. Canonical ordering key.
    pub date: DateTime<Utc>,
    /// Period start the entry pertains to.
    pub last_period_start: Option<DateTime<Utc>>,
    /// User-entered cycle length.
    pub cycle_length: CycleLength,
    /// Selected symptom labels; order irrelevant.
    pub selected_symptoms: BTreeSet<String>,
    /// Free-form notes, may be empty.
    pub notes: String,
    /// Prediction computed with the cycle length known at log time.
    pub predicted_next_period: Option<DateTime<Utc>>,
}

/// Logging form input for one new entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewEntry {
    /// Period start picked by the user.
    pub last_period_start: Option<DateTime<Utc>>,
    /// Cycle length in days, already coerced by the input layer.
    pub cycle_length_days: Option<u32>,
    /// Selected symptom labels.
    pub selected_symptoms: Vec<String>,
    /// Free-form notes.
    pub notes: String,
}

/// Validation failure for new entry input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// Cycle length outside `1..=120` days.
    CycleLengthOutOfRange(u32),
    /// Period start more than one calendar day after the logging day.
    PeriodStartInFuture {
        last_period_start: DateTime<Utc>,
        logged_at: DateTime<Utc>,
    },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CycleLengthOutOfRange(days) => {
                write!(f, "cycle length {days} must be between 1 and 120 days")
            }
            Self::PeriodStartInFuture {
                last_period_start,
                logged_at,
            } => write!(
                f,
                "period start ({}) must not be after the logging day ({})",
                last_period_start.to_rfc3339(),
                logged_at.to_rfc3339()
            ),
        }
    }
}

impl Error for EntryValidationError {}

impl NewEntry {
    /// Validates form input against entry invariants.
    ///
    /// Period starts are compared by UTC calendar day with one day of slack:
    /// a date picked as "today" east of UTC lands on the next UTC day.
    pub fn validate(&self, logged_at: DateTime<Utc>) -> Result<(), EntryValidationError> {
        if let Some(days) = self.cycle_length_days {
            if !is_accepted_day_count(days) {
                return Err(EntryValidationError::CycleLengthOutOfRange(days));
            }
        }
        if let Some(last_period_start) = self.last_period_start {
            let latest_day = logged_at
                .date_naive()
                .checked_add_days(Days::new(1))
                .unwrap_or(NaiveDate::MAX);
            if last_period_start.date_naive() > latest_day {
                return Err(EntryValidationError::PeriodStartInFuture {
                    last_period_start,
                    logged_at,
                });
            }
        }
        Ok(())
    }
}

impl Entry {
    /// Builds an entry from validated form input.
    ///
    /// # Contract
    /// - `date` is `logged_at`.
    /// - `predicted_next_period` is `last_period_start + cycle_length_days`
    ///   when both are known, otherwise absent.
    pub fn from_new(
        new_entry: NewEntry,
        logged_at: DateTime<Utc>,
        source_index: usize,
    ) -> Result<Self, EntryValidationError> {
        new_entry.validate(logged_at)?;

        let predicted_next_period = match (new_entry.last_period_start, new_entry.cycle_length_days)
        {
            (Some(start), Some(days)) => start.checked_add_days(Days::new(u64::from(days))),
            _ => None,
        };
        let cycle_length = new_entry
            .cycle_length_days
            .map_or(CycleLength::Missing, CycleLength::Days);

        Ok(Self {
            source_index,
            date: logged_at,
            last_period_start: new_entry.last_period_start,
            cycle_length,
            selected_symptoms: normalize_symptoms(new_entry.selected_symptoms),
            notes: new_entry.notes,
            predicted_next_period,
        })
    }

    /// Calendar day (UTC) the entry was logged.
    pub fn logged_on(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Encodes the entry in its stored JSON wire shape.
    pub fn to_record(&self) -> Value {
        let record = EntryRecord {
            date: self.date,
            last_period: self.last_period_start,
            cycle_length: self.cycle_length.to_raw(),
            selected_symptoms: &self.selected_symptoms,
            notes: &self.notes,
            predicted_next_period: self.predicted_next_period,
        };
        // Every field is a string, number, array or null; encoding cannot fail.
        serde_json::to_value(record).unwrap_or(Value::Null)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord<'a> {
    date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_period: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle_length: Option<Value>,
    selected_symptoms: &'a BTreeSet<String>,
    notes: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    predicted_next_period: Option<DateTime<Utc>>,
}

/// Parses a stored instant.
///
/// Accepts RFC 3339 instants, bare `YYYY-MM-DD` dates (UTC midnight) and
/// epoch milliseconds.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_instant_str(text),
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Parses an instant from text; see [`parse_instant`].
pub fn parse_instant_str(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::{parse_instant, parse_instant_str, Entry, EntryValidationError, NewEntry};
    use crate::model::cycle_length::CycleLength;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn parse_instant_accepts_iso_dates_and_epoch_millis() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 29, 0, 0, 0).single().expect("valid UTC instant");
        assert_eq!(parse_instant_str("2024-01-29T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_instant_str("2024-01-29"), Some(expected));
        assert_eq!(
            parse_instant(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(parse_instant_str("yesterday"), None);
        assert_eq!(parse_instant(&json!(true)), None);
    }

    #[test]
    fn from_new_computes_prediction_from_period_start() {
        let logged_at = Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).single().expect("valid UTC instant");
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single().expect("valid UTC instant");
        let entry = Entry::from_new(
            NewEntry {
                last_period_start: Some(start),
                cycle_length_days: Some(30),
                selected_symptoms: vec!["Cramps".to_string()],
                notes: "light".to_string(),
            },
            logged_at,
            4,
        )
        .expect("valid entry input");

        assert_eq!(entry.source_index, 4);
        assert_eq!(entry.date, logged_at);
        assert_eq!(entry.cycle_length, CycleLength::Days(30));
        assert_eq!(
            entry.predicted_next_period,
            Some(Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).single().expect("valid UTC instant"))
        );
    }

    #[test]
    fn from_new_without_cycle_length_has_no_prediction() {
        let logged_at = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).single().expect("valid UTC instant");
        let entry = Entry::from_new(
            NewEntry {
                last_period_start: Some(logged_at),
                ..NewEntry::default()
            },
            logged_at,
            0,
        )
        .expect("valid entry input");
        assert_eq!(entry.cycle_length, CycleLength::Missing);
        assert_eq!(entry.predicted_next_period, None);
    }

    #[test]
    fn validate_rejects_out_of_range_and_future_start() {
        let logged_at = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).single().expect("valid UTC instant");
        let too_long = NewEntry {
            cycle_length_days: Some(121),
            ..NewEntry::default()
        };
        assert_eq!(
            too_long.validate(logged_at),
            Err(EntryValidationError::CycleLengthOutOfRange(121))
        );

        let future = NewEntry {
            last_period_start: Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).single().expect("valid UTC instant")),
            ..NewEntry::default()
        };
        assert!(matches!(
            future.validate(logged_at),
            Err(EntryValidationError::PeriodStartInFuture { .. })
        ));
    }

    #[test]
    fn validate_accepts_local_today_ahead_of_utc() {
        // 2024-05-10 picked in a UTC+3 morning, logged at 22:00Z the day before.
        let logged_at = Utc
            .with_ymd_and_hms(2024, 5, 9, 22, 0, 0)
            .single()
            .expect("valid logging instant");
        let local_today = NewEntry {
            last_period_start: parse_instant_str("2024-05-10"),
            cycle_length_days: Some(28),
            ..NewEntry::default()
        };
        assert_eq!(local_today.validate(logged_at), Ok(()));

        let two_days_ahead = NewEntry {
            last_period_start: parse_instant_str("2024-05-11"),
            ..NewEntry::default()
        };
        assert!(matches!(
            two_days_ahead.validate(logged_at),
            Err(EntryValidationError::PeriodStartInFuture { .. })
        ));
    }

    #[test]
    fn to_record_uses_app_wire_keys() {
        let logged_at = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).single().expect("valid UTC instant");
        let entry = Entry::from_new(
            NewEntry {
                last_period_start: Some(logged_at),
                cycle_length_days: Some(28),
                selected_symptoms: vec!["Headache".to_string(), "Bloating".to_string()],
                notes: String::new(),
            },
            logged_at,
            0,
        )
        .expect("valid entry input");

        let record = entry.to_record();
        assert_eq!(record["date"], "2024-03-02T00:00:00Z");
        assert_eq!(record["lastPeriod"], "2024-03-02T00:00:00Z");
        assert_eq!(record["cycleLength"], 28);
        assert_eq!(record["selectedSymptoms"], json!(["Bloating", "Headache"]));
        assert_eq!(record["notes"], "");
        assert_eq!(record["predictedNextPeriod"], "2024-03-30T00:00:00Z");
    }
}
