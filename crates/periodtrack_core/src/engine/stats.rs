//! Cycle-length samples and aggregate statistics.
//!
//! # Responsibility
//! - Compute per-cycle samples under one `SamplePolicy`.
//! - Compute the rounded average cycle length.
//! - Bundle samples, average and prediction into one recomputation result.
//!
//! # Invariants
//! - Fewer than `MIN_ENTRIES_FOR_STATISTICS` entries never produce samples.
//! - An empty sample set yields `AverageCycleLength::NotAvailable`, never `0`.
//! - Samples are computed over the canonical (ascending `date`) order.

use crate::config::{EngineConfig, SamplePolicy};
use crate::engine::normalize::sort_canonical;
use crate::engine::predict::{predict_next_period, Prediction};
use crate::model::entry::Entry;
use log::debug;

/// Minimum number of entries before any statistic is reported.
pub const MIN_ENTRIES_FOR_STATISTICS: usize = 2;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// One cycle-length data point, as plotted on the insights chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSample {
    /// 1-based cycle number in canonical order.
    pub index: usize,
    /// Cycle length in whole days.
    pub length_days: u32,
}

/// Average cycle length, or the explicit absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageCycleLength {
    Days(u32),
    /// Insufficient data; rendered as `N/A`.
    NotAvailable,
}

impl AverageCycleLength {
    pub fn days(self) -> Option<u32> {
        match self {
            Self::Days(days) => Some(days),
            Self::NotAvailable => None,
        }
    }
}

/// Statistics recomputed on every screen focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStatistics {
    pub average_cycle_length: AverageCycleLength,
    pub next_predicted: Prediction,
    pub cycle_samples: Vec<CycleSample>,
    /// Policy the samples were computed with.
    pub sample_policy: SamplePolicy,
}

/// Computes cycle-length samples from canonically ordered entries.
///
/// - `DateGap`: sample `i` is the rounded whole-day gap between entry `i` and
///   entry `i - 1`, giving `n - 1` samples.
/// - `EnteredLength`: one sample per entry with a usable cycle length.
///   Missing lengths count as `config.default_cycle_length_days`; invalid
///   lengths are skipped.
pub fn cycle_samples(entries: &[Entry], config: &EngineConfig) -> Vec<CycleSample> {
    if entries.len() < MIN_ENTRIES_FOR_STATISTICS {
        return Vec::new();
    }

    match config.sample_policy {
        SamplePolicy::DateGap => entries
            .windows(2)
            .enumerate()
            .map(|(position, pair)| CycleSample {
                index: position + 1,
                length_days: gap_in_days(&pair[0], &pair[1]),
            })
            .collect(),
        SamplePolicy::EnteredLength => entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                entry
                    .cycle_length
                    .days_or(config.default_cycle_length_days)
                    .map(|length_days| CycleSample {
                        index: position + 1,
                        length_days,
                    })
            })
            .collect(),
    }
}

fn gap_in_days(previous: &Entry, current: &Entry) -> u32 {
    let millis = (current.date - previous.date).num_milliseconds();
    let days = (millis as f64 / MILLIS_PER_DAY).round();
    // Float-to-int casts saturate; canonical order keeps gaps non-negative.
    days.max(0.0) as u32
}

/// Rounds the arithmetic mean of the samples to the nearest whole day.
pub fn average_cycle_length(samples: &[CycleSample]) -> AverageCycleLength {
    if samples.is_empty() {
        return AverageCycleLength::NotAvailable;
    }
    let total: u64 = samples
        .iter()
        .map(|sample| u64::from(sample.length_days))
        .sum();
    let mean = total as f64 / samples.len() as f64;
    AverageCycleLength::Days(mean.round() as u32)
}

/// Recomputes all statistics from entries in any order.
pub fn recompute_statistics(entries: &[Entry], config: &EngineConfig) -> CycleStatistics {
    let mut ordered = entries.to_vec();
    sort_canonical(&mut ordered);

    let cycle_samples = cycle_samples(&ordered, config);
    let average_cycle_length = average_cycle_length(&cycle_samples);
    let next_predicted = predict_next_period(
        &ordered,
        average_cycle_length,
        config.default_cycle_length_days,
    );

    debug!(
        "event=stats_recompute module=engine status=ok entries={} samples={} policy={}",
        ordered.len(),
        cycle_samples.len(),
        config.sample_policy.as_str()
    );

    CycleStatistics {
        average_cycle_length,
        next_predicted,
        cycle_samples,
        sample_policy: config.sample_policy,
    }
}
