//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose screen-level functions (log, delete, history, insights,
//!   upcoming periods) to Dart via FRB.
//! - Flatten core types into plain envelopes: dates as ISO strings,
//!   `N/A` and `NoData` as `None`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported through `ok = false` envelopes with a message.

use chrono::{NaiveDate, Utc};
use log::warn;
use periodtrack_core::db::open_db;
use periodtrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    parse_cycle_length_input, parse_instant_str, ping as ping_inner, project_periods,
    BlobEntryStore, CycleLength, CycleService, Entry, NewEntry, Prediction,
    ServiceError, SqliteBlobStore, DEFAULT_PROJECTION_COUNT, KNOWN_SYMPTOMS,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const PERIOD_DB_FILE_NAME: &str = "periodtrack.sqlite3";
const PERIOD_DB_PATH_ENV: &str = "PERIODTRACK_DB_PATH";
const UPCOMING_COUNT_MAX: u32 = 12;
static PERIOD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope for log/delete flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl PeriodActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// One entry row for the history screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodEntryItem {
    /// Stored position; pass back to `period_delete`.
    pub index: u32,
    /// RFC 3339 logging instant.
    pub date: String,
    pub last_period_start: Option<String>,
    /// Valid cycle length in days.
    pub cycle_length_days: Option<u32>,
    /// Raw stored text when the cycle length was rejected.
    pub cycle_length_invalid: Option<String>,
    pub selected_symptoms: Vec<String>,
    pub notes: String,
    pub predicted_next_period: Option<String>,
}

/// History screen response, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodHistoryResponse {
    pub ok: bool,
    pub items: Vec<PeriodEntryItem>,
    pub message: String,
}

/// One point of the cycle length chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSampleItem {
    pub index: u32,
    pub length_days: u32,
}

/// Insights screen response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodInsightsResponse {
    pub ok: bool,
    /// `None` renders as `N/A`.
    pub average_cycle_length_days: Option<u32>,
    /// `YYYY-MM-DD`; `None` when nothing is logged.
    pub next_predicted_date: Option<String>,
    pub prediction_source: Option<String>,
    pub samples: Vec<CycleSampleItem>,
    pub sample_policy: String,
    /// Count of normalization diagnostics (dropped records, rejected fields).
    pub issue_count: u32,
    /// Whether the stored payload was unusable and treated as empty.
    pub store_malformed: bool,
    pub message: String,
}

/// Home screen upcoming periods response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodUpcomingResponse {
    pub ok: bool,
    /// `YYYY-MM-DD`, ascending.
    pub dates: Vec<String>,
    pub message: String,
}

/// Cycle length text field coercion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleLengthInputResponse {
    /// Clamped value; `None` clears the field.
    pub days: Option<u32>,
    /// `short_cycle|long_cycle` when an advisory applies.
    pub advisory: Option<String>,
    pub advisory_message: Option<String>,
}

/// Logs one period entry at the current instant.
///
/// # FFI contract
/// - `last_period_start`: RFC 3339 instant or `YYYY-MM-DD`.
/// - `cycle_length_days`: already coerced by `cycle_length_input`.
#[flutter_rust_bridge::frb(sync)]
pub fn period_log(
    last_period_start: String,
    cycle_length_days: Option<u32>,
    selected_symptoms: Vec<String>,
    notes: String,
) -> PeriodActionResponse {
    let Some(start) = parse_instant_str(&last_period_start) else {
        return PeriodActionResponse::failure(format!(
            "period_log failed: invalid last_period_start `{}`",
            last_period_start.trim()
        ));
    };
    let new_entry = NewEntry {
        last_period_start: Some(start),
        cycle_length_days,
        selected_symptoms,
        notes,
    };

    match with_cycle_service(|service| service.log_entry(new_entry, Utc::now())) {
        Ok(_) => PeriodActionResponse::success("Your period start has been logged."),
        Err(err) => PeriodActionResponse::failure(format!("period_log failed: {err}")),
    }
}

/// Deletes the entry at stored position `index`.
#[flutter_rust_bridge::frb(sync)]
pub fn period_delete(index: u32) -> PeriodActionResponse {
    match with_cycle_service(|service| service.delete_entry(index as usize)) {
        Ok(()) => PeriodActionResponse::success("Entry deleted."),
        Err(err) => PeriodActionResponse::failure(format!(
            "period_delete failed: {err}. Please try again."
        )),
    }
}

/// Lists logged entries, most recent first.
#[flutter_rust_bridge::frb(sync)]
pub fn period_history() -> PeriodHistoryResponse {
    match with_cycle_service(|service| service.history()) {
        Ok(entries) => {
            let items = entries.iter().map(to_entry_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No entries logged.".to_string()
            } else {
                format!("Loaded {} entr(ies).", items.len())
            };
            PeriodHistoryResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => PeriodHistoryResponse {
            ok: false,
            items: Vec::new(),
            message: format!("period_history failed: {err}"),
        },
    }
}

/// Recomputes insights from stored entries.
///
/// Store failures degrade to an `N/A` envelope with `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn period_insights() -> PeriodInsightsResponse {
    match with_cycle_service(|service| service.refresh()) {
        Ok(snapshot) => {
            let statistics = &snapshot.statistics;
            let store_malformed = snapshot.store_malformed();
            PeriodInsightsResponse {
                ok: true,
                average_cycle_length_days: statistics.average_cycle_length.days(),
                next_predicted_date: statistics.next_predicted.date().map(format_date),
                prediction_source: match statistics.next_predicted {
                    Prediction::Date { source, .. } => {
                        Some(source.as_str().to_string())
                    }
                    Prediction::NoData => None,
                },
                samples: statistics
                    .cycle_samples
                    .iter()
                    .map(|sample| CycleSampleItem {
                        index: saturating_u32(sample.index),
                        length_days: sample.length_days,
                    })
                    .collect(),
                sample_policy: statistics.sample_policy.as_str().to_string(),
                issue_count: saturating_u32(snapshot.issues.len()),
                store_malformed,
                message: format!("Analyzed {} entr(ies).", snapshot.entries.len()),
            }
        }
        Err(err) => PeriodInsightsResponse {
            ok: false,
            average_cycle_length_days: None,
            next_predicted_date: None,
            prediction_source: None,
            samples: Vec::new(),
            sample_policy: String::new(),
            issue_count: 0,
            store_malformed: false,
            message: format!("period_insights failed: {err}"),
        },
    }
}

/// Projects upcoming periods from a period start date.
///
/// # FFI contract
/// - Pure computation; does not open the store.
/// - `count` defaults to 3 and is capped at 12.
#[flutter_rust_bridge::frb(sync)]
pub fn period_upcoming(
    last_period_start: String,
    cycle_length_days: u32,
    count: Option<u32>,
) -> PeriodUpcomingResponse {
    let Some(start) = parse_instant_str(&last_period_start) else {
        return PeriodUpcomingResponse {
            ok: false,
            dates: Vec::new(),
            message: format!(
                "period_upcoming failed: invalid last_period_start `{}`",
                last_period_start.trim()
            ),
        };
    };

    let count = normalize_upcoming_count(count);
    match project_periods(start.date_naive(), cycle_length_days, count) {
        Ok(dates) => PeriodUpcomingResponse {
            ok: true,
            dates: dates.into_iter().map(format_date).collect(),
            message: String::new(),
        },
        Err(err) => PeriodUpcomingResponse {
            ok: false,
            dates: Vec::new(),
            message: format!("period_upcoming failed: {err}"),
        },
    }
}

/// Coerces cycle length text input.
#[flutter_rust_bridge::frb(sync)]
pub fn cycle_length_input(text: String) -> CycleLengthInputResponse {
    let input = parse_cycle_length_input(&text);
    CycleLengthInputResponse {
        days: input.days,
        advisory: input.advisory.map(|advisory| advisory.as_str().to_string()),
        advisory_message: input.advisory.map(|advisory| advisory.message().to_string()),
    }
}

/// Symptom labels offered by the logging form, in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn known_symptoms() -> Vec<String> {
    KNOWN_SYMPTOMS.iter().map(|label| (*label).to_string()).collect()
}

fn normalize_upcoming_count(count: Option<u32>) -> usize {
    match count {
        None | Some(0) => DEFAULT_PROJECTION_COUNT,
        Some(value) => value.min(UPCOMING_COUNT_MAX) as usize,
    }
}

fn resolve_period_db_path() -> PathBuf {
    PERIOD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(PERIOD_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(PERIOD_DB_FILE_NAME)
        })
        .clone()
}

fn with_cycle_service<T>(
    f: impl FnOnce(&CycleService<BlobEntryStore<SqliteBlobStore<'_>>>) -> Result<T, ServiceError>,
) -> Result<T, String> {
    let db_path = resolve_period_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        warn!("event=ffi_store_open module=ffi status=error error={err}");
        format!("entry store open failed: {err}")
    })?;
    let service = CycleService::new(BlobEntryStore::new(SqliteBlobStore::new(&conn)));
    f(&service).map_err(|err| err.to_string())
}

fn to_entry_item(entry: &Entry) -> PeriodEntryItem {
    PeriodEntryItem {
        index: saturating_u32(entry.source_index),
        date: entry.date.to_rfc3339(),
        last_period_start: entry.last_period_start.map(|start| start.to_rfc3339()),
        cycle_length_days: entry.cycle_length.days(),
        cycle_length_invalid: match &entry.cycle_length {
            CycleLength::Invalid(raw) => Some(raw.to_string()),
            _ => None,
        },
        selected_symptoms: entry.selected_symptoms.iter().cloned().collect(),
        notes: entry.notes.clone(),
        predicted_next_period: entry
            .predicted_next_period
            .map(|predicted| predicted.to_rfc3339()),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
