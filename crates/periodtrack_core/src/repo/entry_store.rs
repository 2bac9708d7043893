//! Entry collection store over a key-value blob.
//!
//! # Responsibility
//! - Load the raw entry collection and classify the stored payload.
//! - Save the full collection as one JSON array.
//!
//! # Invariants
//! - Absent blobs load as `RawPayload::Absent`, never as an error.
//! - Unparseable or non-array blobs load as `RawPayload::Malformed`.
//! - `save` always replaces the entire collection.

use crate::repo::blob_store::{BlobStore, StoreResult};
use serde_json::Value;

/// Fixed key of the blob holding the JSON-encoded entry array.
pub const ENTRY_STORE_KEY: &str = "periodEntries";

/// Raw stored entry collection before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Nothing stored yet.
    Absent,
    /// A JSON array of raw records (records are not validated here).
    Records(Vec<Value>),
    /// Stored text is not a JSON array.
    Malformed { reason: String },
}

impl RawPayload {
    /// Classifies stored blob text.
    pub fn from_json_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(value),
            Err(err) => Self::Malformed {
                reason: format!("stored entries are not valid JSON: {err}"),
            },
        }
    }

    /// Classifies an already decoded JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(records) => Self::Records(records),
            other => Self::Malformed {
                reason: format!("stored entries are a JSON {}, expected an array", json_kind(&other)),
            },
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Load/save contract consumed by the cycle service.
pub trait EntryStore {
    fn load(&self) -> StoreResult<RawPayload>;
    fn save(&self, records: &[Value]) -> StoreResult<()>;
}

/// Entry store persisting the collection as one JSON blob.
pub struct BlobEntryStore<B: BlobStore> {
    blobs: B,
}

impl<B: BlobStore> BlobEntryStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    /// Returns the underlying blob store.
    pub fn blobs(&self) -> &B {
        &self.blobs
    }
}

impl<B: BlobStore> EntryStore for BlobEntryStore<B> {
    fn load(&self) -> StoreResult<RawPayload> {
        Ok(match self.blobs.get(ENTRY_STORE_KEY)? {
            Some(text) => RawPayload::from_json_text(&text),
            None => RawPayload::Absent,
        })
    }

    fn save(&self, records: &[Value]) -> StoreResult<()> {
        let text = serde_json::to_string(records)?;
        self.blobs.set(ENTRY_STORE_KEY, &text)
    }
}
