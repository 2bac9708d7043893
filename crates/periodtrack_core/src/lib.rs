//! Core domain logic for the period tracker.
//! This crate is the single source of truth for entry validation, cycle
//! statistics and next-period prediction.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{EngineConfig, SamplePolicy, DEFAULT_CYCLE_LENGTH_DAYS, DEFAULT_PROJECTION_COUNT};
pub use engine::normalize::{
    has_malformed_store, normalize_payload, normalize_records, DropReason, EntryField,
    NormalizeIssue, NormalizedEntries,
};
pub use engine::predict::{predict_next_period, Prediction, PredictionSource};
pub use engine::projection::{project_periods, ProjectionError};
pub use engine::stats::{
    average_cycle_length, cycle_samples, recompute_statistics, AverageCycleLength, CycleSample,
    CycleStatistics,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cycle_length::{
    parse_cycle_length_input, CycleAdvisory, CycleLength, CycleLengthInput,
};
pub use model::entry::{parse_instant_str, Entry, EntryValidationError, NewEntry};
pub use model::symptom::{toggle_symptom, KNOWN_SYMPTOMS};
pub use repo::blob_store::{BlobStore, MemoryBlobStore, SqliteBlobStore, StoreError, StoreResult};
pub use repo::entry_store::{BlobEntryStore, EntryStore, RawPayload, ENTRY_STORE_KEY};
pub use service::cycle_service::{CycleService, InsightsSnapshot, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
