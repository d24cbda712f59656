//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Roster and prize persistence (could swap the JSON file for a database)
//! - Clock/Random (for testing)

mod error;
mod store;
mod testing;

// =============================================================================
// Storage Port
// =============================================================================
pub use store::{LotterySnapshot, LotteryStore, WinnerRecord};

#[cfg(test)]
pub use store::MockLotteryStore;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::StoreError;
