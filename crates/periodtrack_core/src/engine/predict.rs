//! Next-period prediction.
//!
//! # Invariants
//! - Zero entries always yield `Prediction::NoData`, never a guessed date.
//! - A prediction stored at log time wins over any recomputation.

use crate::engine::stats::AverageCycleLength;
use crate::model::entry::Entry;
use chrono::{Days, NaiveDate};
use log::warn;

/// Where a predicted date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    /// `predictedNextPeriod` stored on the most recent entry.
    StoredPrediction,
    /// Most recent entry date plus the average cycle length.
    AverageCycleLength,
    /// Most recent entry date plus its own entered cycle length.
    EntryCycleLength,
    /// Most recent entry date plus the configured default length.
    DefaultCycleLength,
}

impl PredictionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StoredPrediction => "stored_prediction",
            Self::AverageCycleLength => "average_cycle_length",
            Self::EntryCycleLength => "entry_cycle_length",
            Self::DefaultCycleLength => "default_cycle_length",
        }
    }
}

/// Predicted onset of the next period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Date {
        date: NaiveDate,
        source: PredictionSource,
    },
    /// No entries logged.
    NoData,
}

impl Prediction {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Self::Date { date, .. } => Some(date),
            Self::NoData => None,
        }
    }
}

/// Predicts the next period from the most recent entry.
///
/// The most recent entry is the one with the greatest `date`; among equal
/// dates the last one in slice order wins, matching canonical ordering.
///
/// Resolution order:
/// 1. its stored `predicted_next_period`, verbatim (UTC calendar day);
/// 2. its `date` plus `average` when available and non-zero;
/// 3. its `date` plus its own valid cycle length;
/// 4. its `date` plus `default_days`.
pub fn predict_next_period(
    entries: &[Entry],
    average: AverageCycleLength,
    default_days: u32,
) -> Prediction {
    let Some(latest) = entries.iter().max_by_key(|entry| entry.date) else {
        return Prediction::NoData;
    };

    if let Some(stored) = latest.predicted_next_period {
        return Prediction::Date {
            date: stored.date_naive(),
            source: PredictionSource::StoredPrediction,
        };
    }

    let (days, source) = match (average.days(), latest.cycle_length.days()) {
        (Some(days), _) if days > 0 => (days, PredictionSource::AverageCycleLength),
        (_, Some(days)) => (days, PredictionSource::EntryCycleLength),
        _ => (default_days, PredictionSource::DefaultCycleLength),
    };

    match latest
        .logged_on()
        .checked_add_days(Days::new(u64::from(days)))
    {
        Some(date) => Prediction::Date { date, source },
        None => {
            warn!(
                "event=predict_next module=engine status=error error_code=date_overflow days={days}"
            );
            Prediction::NoData
        }
    }
}
