//! Cycle statistics engine.
//!
//! # Responsibility
//! - Turn raw stored records into a canonically ordered entry sequence.
//! - Derive cycle-length samples, the average cycle length and the next
//!   period prediction.
//! - Project a fixed run of upcoming period dates.
//!
//! # Invariants
//! - Every function here is pure and synchronous; none touches storage.
//! - No input makes the engine panic; unusable data degrades to
//!   `NotAvailable` / `NoData` results.

pub mod normalize;
pub mod predict;
pub mod projection;
pub mod stats;
