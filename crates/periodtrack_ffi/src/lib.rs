//! Flutter-facing FFI surface for period tracker core.

pub mod api;
