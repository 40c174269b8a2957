//! Deterministic JSON output.
//!
//! Settings files and CLI output use the same layout: 2-space indentation
//! and a trailing newline, so saved files diff cleanly.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
