//! Clock port

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Envelopes the client builds itself (transport faults, request contexts)
/// are stamped through this port so tests can pin the time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
