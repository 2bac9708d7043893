//! Cycle tracking use-case service.
//!
//! # Responsibility
//! - Log new entries and delete stored ones (read-modify-write of the blob).
//! - Recompute insights on demand for history/insights screens.
//! - Project upcoming periods for the home screen.
//!
//! # Invariants
//! - Writes always persist the full collection; untouched records are saved
//!   byte-for-byte as loaded.
//! - A failed save leaves no partial state behind; the caller may retry.
//! - Deletion addresses records by stored position, not display position.
//! - Writes never replace a malformed stored payload.
//! - Log lines carry counts and codes only, never notes or symptoms.

use crate::config::EngineConfig;
use crate::engine::normalize::{has_malformed_store, normalize_payload, NormalizeIssue};
use crate::engine::projection::{project_periods, ProjectionError};
use crate::engine::stats::{recompute_statistics, CycleStatistics};
use crate::model::entry::{Entry, EntryValidationError, NewEntry};
use crate::repo::blob_store::StoreError;
use crate::repo::entry_store::{EntryStore, RawPayload};
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for cycle tracking use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// New entry input violates entry invariants.
    InvalidEntry(EntryValidationError),
    /// No stored record at the requested position.
    EntryNotFound { index: usize, len: usize },
    /// Loading the collection failed.
    StoreRead(StoreError),
    /// Saving the collection failed; nothing was changed.
    StoreWrite(StoreError),
    /// Stored payload is not an entry array; writes are refused to keep it intact.
    MalformedStore { reason: String },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEntry(err) => write!(f, "invalid entry: {err}"),
            Self::EntryNotFound { index, len } => {
                write!(f, "entry index {index} out of range for {len} stored entries")
            }
            Self::StoreRead(err) => write!(f, "failed to load entries: {err}"),
            Self::StoreWrite(err) => write!(f, "failed to save entries: {err}"),
            Self::MalformedStore { reason } => {
                write!(f, "stored entries are unreadable, refusing to overwrite: {reason}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEntry(err) => Some(err),
            Self::EntryNotFound { .. } | Self::MalformedStore { .. } => None,
            Self::StoreRead(err) | Self::StoreWrite(err) => Some(err),
        }
    }
}

impl From<EntryValidationError> for ServiceError {
    fn from(value: EntryValidationError) -> Self {
        Self::InvalidEntry(value)
    }
}

/// Result of one explicit recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsSnapshot {
    /// Normalized entries, ascending by `date`.
    pub entries: Vec<Entry>,
    pub statistics: CycleStatistics,
    /// Normalization diagnostics.
    pub issues: Vec<NormalizeIssue>,
}

impl InsightsSnapshot {
    /// Returns whether the stored payload was unusable.
    pub fn store_malformed(&self) -> bool {
        has_malformed_store(&self.issues)
    }
}

/// Cycle tracking facade over an entry store.
pub struct CycleService<S: EntryStore> {
    store: S,
    config: EngineConfig,
}

impl<S: EntryStore> CycleService<S> {
    /// Creates a service with default engine configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Appends one entry logged at `logged_at` and saves the collection.
    ///
    /// # Contract
    /// - A malformed stored payload fails with `MalformedStore`; nothing is saved.
    /// - Returns the created entry, with `source_index` set to its stored position.
    pub fn log_entry(&self, new_entry: NewEntry, logged_at: DateTime<Utc>) -> ServiceResult<Entry> {
        let mut records = self.load_records("entry_log")?;

        let entry = Entry::from_new(new_entry, logged_at, records.len())?;
        records.push(entry.to_record());
        self.save(&records)?;

        info!(
            "event=entry_log module=service status=ok stored={} has_prediction={}",
            records.len(),
            entry.predicted_next_period.is_some()
        );
        Ok(entry)
    }

    /// Removes the record at stored position `index` and saves the rest.
    pub fn delete_entry(&self, index: usize) -> ServiceResult<()> {
        let mut records = self.load_records("entry_delete")?;
        if index >= records.len() {
            return Err(ServiceError::EntryNotFound {
                index,
                len: records.len(),
            });
        }

        records.remove(index);
        self.save(&records)?;

        info!(
            "event=entry_delete module=service status=ok index={index} remaining={}",
            records.len()
        );
        Ok(())
    }

    /// Returns normalized entries, most recent first.
    pub fn history(&self) -> ServiceResult<Vec<Entry>> {
        let mut entries = normalize_payload(&self.load()?).entries;
        entries.reverse();
        Ok(entries)
    }

    /// Loads, normalizes and recomputes statistics.
    ///
    /// Called on every screen focus; the result is never cached.
    pub fn refresh(&self) -> ServiceResult<InsightsSnapshot> {
        let normalized = normalize_payload(&self.load()?);
        let statistics = recompute_statistics(&normalized.entries, &self.config);

        info!(
            "event=insights_refresh module=service status=ok entries={} samples={} issues={}",
            normalized.entries.len(),
            statistics.cycle_samples.len(),
            normalized.issues.len()
        );
        Ok(InsightsSnapshot {
            entries: normalized.entries,
            statistics,
            issues: normalized.issues,
        })
    }

    /// Projects the configured number of upcoming periods.
    pub fn upcoming_periods(
        &self,
        last_period_start: NaiveDate,
        cycle_length_days: u32,
    ) -> Result<Vec<NaiveDate>, ProjectionError> {
        project_periods(
            last_period_start,
            cycle_length_days,
            self.config.projection_count,
        )
    }

    fn load(&self) -> ServiceResult<RawPayload> {
        self.store.load().map_err(|err| {
            error!("event=entries_load module=service status=error error={err}");
            ServiceError::StoreRead(err)
        })
    }

    /// Loads the raw collection for a read-modify-write.
    fn load_records(&self, event: &str) -> ServiceResult<Vec<serde_json::Value>> {
        match self.load()? {
            RawPayload::Records(records) => Ok(records),
            RawPayload::Absent => Ok(Vec::new()),
            RawPayload::Malformed { reason } => {
                warn!("event={event} module=service status=rejected error_code=malformed_store");
                Err(ServiceError::MalformedStore { reason })
            }
        }
    }

    fn save(&self, records: &[serde_json::Value]) -> ServiceResult<()> {
        self.store.save(records).map_err(|err| {
            error!("event=entries_save module=service status=error error_code=store_write_failed error={err}");
            ServiceError::StoreWrite(err)
        })
    }
}
