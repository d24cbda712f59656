//! Aggregate roots - domain objects that own their related data
//!
//! # Rustic DDD Principles
//!
//! | Concern | Rustic Equivalent |
//! |---------|-------------------|
//! | Private fields + getters | Newtypes valid by construction |
//! | Aggregate root guards | Ownership (borrow checker enforces) |
//! | Factory pattern | `::new()` + builder methods |
//! | Repairing stored data | `#[serde(from = ...)]` through a record type |

pub mod participant;
pub mod prize;
pub mod prize_book;
pub mod roster;

pub use participant::{Participant, PrizeAward};
pub use prize::{Prize, PrizeCommit, PrizeRecord, QuotaPartition};
pub use prize_book::PrizeBook;
pub use roster::Roster;
