//! Storage contracts for the entry collection.
//!
//! # Responsibility
//! - Define the key-value blob contract the app persists through.
//! - Encode/decode the entry collection at the store boundary.
//!
//! # Invariants
//! - The whole entry collection lives in one blob under `ENTRY_STORE_KEY`.
//! - Reads never fail on malformed payloads; they report them as `RawPayload::Malformed`.

pub mod blob_store;
pub mod entry_store;
