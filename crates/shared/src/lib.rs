//! LuckyDraw Protocol - wire types shared by the engine and its collaborators
//!
//! - Registration feed messages (`FeedMessage`)
//! - Status broadcast for operator surfaces (`StatusMessage`, `WireStatus`)
//! - Operator commands and their text form (`OperatorCommand`)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, uuid, serde_json, and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain IDs** - use raw `uuid::Uuid` on the wire

pub mod commands;
pub mod messages;

pub use commands::{CommandParseError, OperatorCommand};
pub use messages::{FeedMessage, NoticeLevel, StatusMessage, WireStatus};
