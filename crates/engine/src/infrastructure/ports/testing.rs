//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Uniform index in `0..len`. `len` is never zero.
    fn gen_index(&self, len: usize) -> usize;
    /// Uniform value in `[0, 1)`.
    fn gen_unit(&self) -> f64;
    fn gen_uuid(&self) -> Uuid;
}
