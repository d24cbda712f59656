//! Lifecycle notifications and the observer interface.
//!
//! Anything outside the engine that cares about the show (operator surfaces,
//! logging, a status broadcaster) registers a `DrawObserver` and receives
//! typed events. There is no ambient shared status.

use tokio::sync::mpsc::UnboundedSender;

use luckydraw_domain::{DrawStatus, ParticipantId, PrizeId};
use luckydraw_shared::{NoticeLevel, StatusMessage, WireStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    StatusChanged {
        from: DrawStatus,
        to: DrawStatus,
        prize_id: Option<PrizeId>,
    },
    /// Operator-facing message, e.g. a rejected start
    Notice { level: NoticeLevel, message: String },
    ParticipantJoined {
        participant_id: ParticipantId,
        name: String,
        card_index: usize,
    },
}

impl LifecycleEvent {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Wire form for operator surfaces. Joins are not broadcast.
    pub fn to_wire(&self) -> Option<StatusMessage> {
        match self {
            Self::StatusChanged { to, prize_id, .. } => Some(StatusMessage::status(
                wire_status(*to),
                prize_id.map(|id| id.to_uuid()),
            )),
            Self::Notice { level, message } => Some(StatusMessage::Notice {
                level: *level,
                message: message.clone(),
            }),
            Self::ParticipantJoined { .. } => None,
        }
    }
}

pub fn wire_status(status: DrawStatus) -> WireStatus {
    match status {
        DrawStatus::Init => WireStatus::Init,
        DrawStatus::Ready => WireStatus::Ready,
        DrawStatus::Running => WireStatus::Running,
        DrawStatus::End => WireStatus::End,
    }
}

/// Receives every event emitted by the engine, in order.
pub trait DrawObserver: Send {
    fn on_event(&mut self, event: &LifecycleEvent);
}

impl DrawObserver for UnboundedSender<LifecycleEvent> {
    fn on_event(&mut self, event: &LifecycleEvent) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.send(event.clone());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(super) u64);
