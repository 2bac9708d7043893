//! Domain model for logged period entries.
//!
//! # Responsibility
//! - Define the strict `Entry` record consumed by the statistics engine.
//! - Coerce user input (cycle length text, symptom toggles) into valid values.
//!
//! # Invariants
//! - Entries are immutable once created; deletion removes whole records.
//! - Cycle lengths accepted as valid always lie in `1..=120` days.

pub mod cycle_length;
pub mod entry;
pub mod symptom;
