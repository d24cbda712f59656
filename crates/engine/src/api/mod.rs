//! API layer - the show's entry points.
//!
//! The live registration feed comes in over a WebSocket; operator commands
//! come in on the console.

pub mod console;
pub mod feed;

pub use feed::{FeedClient, FeedError, RECONNECT_DELAY};
