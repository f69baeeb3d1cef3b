//! Wall-clock abstraction.
//!
//! Ingestion stamps documents and the orchestrator falls back to "now" for
//! documents that lost their timestamp. Both go through [`Clock`] so tests
//! can pin time.

use chrono::{DateTime, SubsecRound, Utc};

/// Source of the current UTC instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Render an instant as ISO-8601 UTC with second precision, e.g.
/// `2026-03-01T09:30:00Z`. This is the `issued_at` wire format.
pub fn isoformat_utc(instant: &DateTime<Utc>) -> String {
    instant
        .trunc_subsecs(0)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
