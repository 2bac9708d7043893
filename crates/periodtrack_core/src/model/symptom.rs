//! Symptom labels offered by the logging form.

use std::collections::BTreeSet;

/// Symptom labels offered by the logging form, in display order.
pub const KNOWN_SYMPTOMS: &[&str] = &[
    "Cramps",
    "Bloating",
    "Headache",
    "Fatigue",
    "Mood Swings",
    "Tender Breasts",
];

/// Adds `label` to the selection, or removes it when already selected.
///
/// Returns `true` when the label is selected after the call.
pub fn toggle_symptom(selection: &mut BTreeSet<String>, label: &str) -> bool {
    if selection.remove(label) {
        return false;
    }
    selection.insert(label.to_string());
    true
}

/// Trims labels and drops blanks; duplicates collapse in the set.
pub fn normalize_symptoms<I, S>(labels: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|label| {
            let trimmed = label.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}
