//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls and engine recomputation into screen-level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod cycle_service;
