//! Clock port for the `now` system variable

use chrono::{DateTime, Utc};

/// Port for reading the current instant.
///
/// Layered resolution asks the clock once per call and exposes the result as
/// the `now` variable, so tests can pin it with a fixed implementation.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}

