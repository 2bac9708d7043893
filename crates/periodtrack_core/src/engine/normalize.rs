//! Raw record normalization.
//!
//! # Responsibility
//! - Coerce loosely typed stored records into strict `Entry` values.
//! - Report every dropped record and rejected field as a diagnostic issue.
//!
//! # Invariants
//! - Output entries are sorted ascending by `date`; the sort is stable, so
//!   entries sharing a `date` keep their stored order.
//! - Records that are not objects or lack a parseable `date` are dropped.
//! - Records with a rejected `cycleLength` are kept.

use crate::model::cycle_length::CycleLength;
use crate::model::entry::{
    parse_instant, Entry, FIELD_CYCLE_LENGTH, FIELD_DATE, FIELD_LAST_PERIOD,
    FIELD_LAST_PERIOD_START, FIELD_NOTES, FIELD_PREDICTED_NEXT_PERIOD, FIELD_SELECTED_SYMPTOMS,
};
use crate::repo::entry_store::RawPayload;
use log::warn;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Why a stored record was dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NotAnObject,
    MissingDate,
    UnparsableDate,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAnObject => "not_an_object",
            Self::MissingDate => "missing_date",
            Self::UnparsableDate => "unparsable_date",
        }
    }
}

/// Entry field rejected during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    LastPeriodStart,
    CycleLength,
    SelectedSymptoms,
    Notes,
    PredictedNextPeriod,
}

impl EntryField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastPeriodStart => "last_period_start",
            Self::CycleLength => "cycle_length",
            Self::SelectedSymptoms => "selected_symptoms",
            Self::Notes => "notes",
            Self::PredictedNextPeriod => "predicted_next_period",
        }
    }
}

/// Diagnostic raised while normalizing stored data. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeIssue {
    /// Stored payload is not a JSON array; treated as empty.
    MalformedStoreData { reason: String },
    /// Record skipped entirely.
    DroppedRecord {
        source_index: usize,
        reason: DropReason,
    },
    /// Record kept, but one field was rejected or coerced.
    InvalidFieldValue {
        source_index: usize,
        field: EntryField,
    },
}

/// Normalization output: ordered entries plus diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedEntries {
    /// Valid entries sorted ascending by `date`.
    pub entries: Vec<Entry>,
    /// Diagnostics in discovery order.
    pub issues: Vec<NormalizeIssue>,
}

impl NormalizedEntries {
    /// Returns whether the stored payload itself was unusable.
    pub fn is_malformed(&self) -> bool {
        has_malformed_store(&self.issues)
    }
}

/// Returns whether `issues` report an unusable stored payload.
pub fn has_malformed_store(issues: &[NormalizeIssue]) -> bool {
    issues
        .iter()
        .any(|issue| matches!(issue, NormalizeIssue::MalformedStoreData { .. }))
}

/// Normalizes a loaded payload.
///
/// Malformed payloads yield no entries and one `MalformedStoreData` issue.
pub fn normalize_payload(payload: &RawPayload) -> NormalizedEntries {
    match payload {
        RawPayload::Absent => NormalizedEntries::default(),
        RawPayload::Records(records) => normalize_records(records),
        RawPayload::Malformed { reason } => {
            warn!("event=entries_normalize module=engine status=malformed reason={reason}");
            NormalizedEntries {
                entries: Vec::new(),
                issues: vec![NormalizeIssue::MalformedStoreData {
                    reason: reason.clone(),
                }],
            }
        }
    }
}

/// Normalizes raw records in stored order.
pub fn normalize_records(records: &[Value]) -> NormalizedEntries {
    let mut normalized = NormalizedEntries::default();

    for (source_index, record) in records.iter().enumerate() {
        match normalize_record(source_index, record, &mut normalized.issues) {
            Ok(entry) => normalized.entries.push(entry),
            Err(reason) => normalized.issues.push(NormalizeIssue::DroppedRecord {
                source_index,
                reason,
            }),
        }
    }
    sort_canonical(&mut normalized.entries);

    if !normalized.issues.is_empty() {
        warn!(
            "event=entries_normalize module=engine status=degraded records={} entries={} issues={}",
            records.len(),
            normalized.entries.len(),
            normalized.issues.len()
        );
    }
    normalized
}

/// Sorts entries ascending by `date`, keeping stored order for equal dates.
pub fn sort_canonical(entries: &mut [Entry]) {
    entries.sort_by_key(|entry| entry.date);
}

fn normalize_record(
    source_index: usize,
    record: &Value,
    issues: &mut Vec<NormalizeIssue>,
) -> Result<Entry, DropReason> {
    let fields = record.as_object().ok_or(DropReason::NotAnObject)?;
    let date = match present(fields, FIELD_DATE) {
        Some(raw) => parse_instant(raw).ok_or(DropReason::UnparsableDate)?,
        None => return Err(DropReason::MissingDate),
    };

    let mut reject = |field: EntryField| {
        issues.push(NormalizeIssue::InvalidFieldValue {
            source_index,
            field,
        });
    };

    let last_period_start = optional_instant(
        present(fields, FIELD_LAST_PERIOD).or_else(|| present(fields, FIELD_LAST_PERIOD_START)),
        EntryField::LastPeriodStart,
        &mut reject,
    );
    let predicted_next_period = optional_instant(
        present(fields, FIELD_PREDICTED_NEXT_PERIOD),
        EntryField::PredictedNextPeriod,
        &mut reject,
    );

    let cycle_length = CycleLength::from_raw(fields.get(FIELD_CYCLE_LENGTH));
    if cycle_length.is_invalid() {
        reject(EntryField::CycleLength);
    }

    let selected_symptoms = match present(fields, FIELD_SELECTED_SYMPTOMS) {
        None => BTreeSet::new(),
        Some(Value::Array(items)) => {
            let labels: BTreeSet<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect();
            if items.iter().any(|item| !item.is_string()) {
                reject(EntryField::SelectedSymptoms);
            }
            labels
        }
        Some(_) => {
            reject(EntryField::SelectedSymptoms);
            BTreeSet::new()
        }
    };

    let notes = match present(fields, FIELD_NOTES) {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => {
            reject(EntryField::Notes);
            String::new()
        }
    };

    Ok(Entry {
        source_index,
        date,
        last_period_start,
        cycle_length,
        selected_symptoms,
        notes,
        predicted_next_period,
    })
}

/// Returns a field value unless it is absent or null.
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}

fn optional_instant(
    raw: Option<&Value>,
    field: EntryField,
    reject: &mut impl FnMut(EntryField),
) -> Option<chrono::DateTime<chrono::Utc>> {
    let raw = raw?;
    let parsed = parse_instant(raw);
    if parsed.is_none() {
        reject(field);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::{normalize_payload, normalize_records, DropReason, EntryField, NormalizeIssue};
    use crate::model::cycle_length::CycleLength;
    use crate::repo::entry_store::RawPayload;
    use serde_json::json;

    #[test]
    fn malformed_payload_yields_empty_entries_and_issue() {
        let normalized = normalize_payload(&RawPayload::from_value(json!({"date": "2024-01-01"})));
        assert!(normalized.entries.is_empty());
        assert!(normalized.is_malformed());
    }

    #[test]
    fn absent_payload_is_empty_without_issues() {
        let normalized = normalize_payload(&RawPayload::Absent);
        assert!(normalized.entries.is_empty());
        assert!(normalized.issues.is_empty());
    }

    #[test]
    fn records_are_sorted_ascending_and_keep_source_index() {
        let normalized = normalize_records(&[
            json!({"date": "2024-02-28T00:00:00.000Z", "cycleLength": "27"}),
            json!({"date": "2024-01-01T00:00:00.000Z", "cycleLength": "28"}),
            json!({"date": "2024-01-29T00:00:00.000Z", "cycleLength": "30"}),
        ]);

        let order: Vec<usize> = normalized.entries.iter().map(|e| e.source_index).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!(normalized.issues.is_empty());
    }

    #[test]
    fn equal_dates_keep_stored_order() {
        let normalized = normalize_records(&[
            json!({"date": "2024-01-01", "notes": "first"}),
            json!({"date": "2023-12-01", "notes": "older"}),
            json!({"date": "2024-01-01", "notes": "second"}),
        ]);
        let notes: Vec<&str> = normalized.entries.iter().map(|e| e.notes.as_str()).collect();
        assert_eq!(notes, vec!["older", "first", "second"]);
    }

    #[test]
    fn unusable_records_are_dropped_with_reasons() {
        let normalized = normalize_records(&[
            json!("2024-01-01"),
            json!({"notes": "no date"}),
            json!({"date": "not a date"}),
            json!({"date": "2024-01-01"}),
        ]);

        assert_eq!(normalized.entries.len(), 1);
        assert_eq!(
            normalized.issues,
            vec![
                NormalizeIssue::DroppedRecord {
                    source_index: 0,
                    reason: DropReason::NotAnObject
                },
                NormalizeIssue::DroppedRecord {
                    source_index: 1,
                    reason: DropReason::MissingDate
                },
                NormalizeIssue::DroppedRecord {
                    source_index: 2,
                    reason: DropReason::UnparsableDate
                },
            ]
        );
    }

    #[test]
    fn invalid_fields_are_coerced_and_record_kept() {
        let normalized = normalize_records(&[json!({
            "date": "2024-01-01",
            "lastPeriod": "someday",
            "cycleLength": "twenty",
            "selectedSymptoms": "Cramps",
            "notes": 42,
        })]);

        let entry = &normalized.entries[0];
        assert_eq!(entry.last_period_start, None);
        assert_eq!(entry.cycle_length, CycleLength::Invalid(json!("twenty")));
        assert!(entry.selected_symptoms.is_empty());
        assert!(entry.notes.is_empty());

        let fields: Vec<EntryField> = normalized
            .issues
            .iter()
            .filter_map(|issue| match issue {
                NormalizeIssue::InvalidFieldValue { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                EntryField::LastPeriodStart,
                EntryField::CycleLength,
                EntryField::SelectedSymptoms,
                EntryField::Notes,
            ]
        );
    }

    #[test]
    fn missing_cycle_length_is_not_an_issue() {
        let normalized = normalize_records(&[json!({"date": "2024-01-01", "cycleLength": null})]);
        assert_eq!(normalized.entries[0].cycle_length, CycleLength::Missing);
        assert!(normalized.issues.is_empty());
    }

    #[test]
    fn last_period_start_key_is_accepted() {
        let normalized = normalize_records(&[json!({
            "date": "2024-01-03",
            "lastPeriodStart": "2024-01-01",
            "selectedSymptoms": ["Cramps", 7, "Fatigue"],
        })]);
        let entry = &normalized.entries[0];
        assert!(entry.last_period_start.is_some());
        assert_eq!(entry.selected_symptoms.len(), 2);
        assert_eq!(
            normalized.issues,
            vec![NormalizeIssue::InvalidFieldValue {
                source_index: 0,
                field: EntryField::SelectedSymptoms
            }]
        );
    }
}
