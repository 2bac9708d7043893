//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `periodtrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use periodtrack_core::{
    normalize_records, project_periods, recompute_statistics, EngineConfig,
    DEFAULT_CYCLE_LENGTH_DAYS, DEFAULT_PROJECTION_COUNT,
};

// Fixed sample so output never depends on the clock or local storage.
const SAMPLE_ENTRIES: &str = r#"[
    {"date": "2024-01-01T00:00:00.000Z", "cycleLength": "28"},
    {"date": "2024-01-29T00:00:00.000Z", "cycleLength": "30"},
    {"date": "2024-02-28T00:00:00.000Z", "cycleLength": "27"}
]"#;

fn main() {
    println!("periodtrack_core ping={}", periodtrack_core::ping());
    println!("periodtrack_core version={}", periodtrack_core::core_version());

    let records: Vec<serde_json::Value> = match serde_json::from_str(SAMPLE_ENTRIES) {
        Ok(records) => records,
        Err(err) => {
            eprintln!("sample entries invalid: {err}");
            std::process::exit(1);
        }
    };
    let entries = normalize_records(&records).entries;
    let stats = recompute_statistics(&entries, &EngineConfig::default());
    let average = stats
        .average_cycle_length
        .days()
        .map_or_else(|| "N/A".to_string(), |days| days.to_string());
    println!("sample average_cycle_length={average}");

    if let Some(next) = stats.next_predicted.date() {
        println!("sample next_period={next}");
        match project_periods(next, DEFAULT_CYCLE_LENGTH_DAYS, DEFAULT_PROJECTION_COUNT) {
            Ok(dates) => {
                let joined = dates
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                println!("sample upcoming={joined}");
            }
            Err(err) => eprintln!("sample projection failed: {err}"),
        }
    }
}
