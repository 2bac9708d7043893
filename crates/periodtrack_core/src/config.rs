//! Engine configuration.
//!
//! # Responsibility
//! - Hold the tunables shared by statistics, prediction and projection.
//!
//! # Invariants
//! - `EngineConfig::default()` reproduces the app's observed behavior:
//!   date-gap samples, 28-day fallback, three projected periods.

/// Cycle length used when neither an average nor an entered value exists.
pub const DEFAULT_CYCLE_LENGTH_DAYS: u32 = 28;
/// Number of upcoming periods shown on the home screen.
pub const DEFAULT_PROJECTION_COUNT: usize = 3;

/// Source of cycle-length samples for aggregation.
///
/// Only one policy is ever applied to a computation; samples are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplePolicy {
    /// Whole-day gaps between consecutive entry dates. Canonical policy.
    #[default]
    DateGap,
    /// Each entry's user-entered cycle length.
    EnteredLength,
}

impl SamplePolicy {
    /// Stable identifier used in logs and across the FFI boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateGap => "date_gap",
            Self::EnteredLength => "entered_length",
        }
    }
}

/// Tunables for the cycle statistics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Fallback cycle length in days.
    pub default_cycle_length_days: u32,
    /// Number of dates produced by forward projection.
    pub projection_count: usize,
    /// Cycle-length sample policy.
    pub sample_policy: SamplePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_cycle_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
            projection_count: DEFAULT_PROJECTION_COUNT,
            sample_policy: SamplePolicy::default(),
        }
    }
}
