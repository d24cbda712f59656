//! Wire messages exchanged with the registration feed and operator surfaces
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Renaming variants is a breaking change
//! - Unknown `type` tags deserialize to `Unknown` so newer feeds do not break
//!   older engines

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Registration feed (Feed → Engine)
// =============================================================================

/// Messages pushed by the live registration feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    /// Someone just registered for the draw
    NewPerson { name: String, phone: String },

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl FeedMessage {
    /// Parse one text frame from the feed.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// =============================================================================
// Status broadcast (Engine → operator surfaces)
// =============================================================================

/// Lifecycle status as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireStatus {
    Init,
    Ready,
    Running,
    End,
}

impl WireStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Init => 0,
            Self::Ready => 1,
            Self::Running => 2,
            Self::End => 3,
        }
    }
}

/// Messages the engine publishes for operator surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusMessage {
    /// Lifecycle status changed
    StatusChanged {
        status: WireStatus,
        code: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prize_id: Option<Uuid>,
    },
    /// Something the operator should see (guard failure, round summary)
    Notice { level: NoticeLevel, message: String },

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
}

impl StatusMessage {
    pub fn status(status: WireStatus, prize_id: Option<Uuid>) -> Self {
        Self::StatusChanged {
            status,
            code: status.code(),
            prize_id,
        }
    }
}
