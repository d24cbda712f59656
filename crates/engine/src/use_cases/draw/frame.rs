//! Render frames and the sinks that consume them.
//!
//! The engine never draws anything. After each tick that changed the scene it
//! hands a `Frame` to every attached sink; a sink may be a real renderer, a
//! network broadcaster, or the tracing sink the binary uses.

use luckydraw_domain::{DrawStatus, ParticipantId, Transform};

use crate::entities::{CardFace, CardRegistry, CardStyle, Millis};

#[derive(Debug, Clone, PartialEq)]
pub struct CardFrame {
    pub index: usize,
    pub participant_id: ParticipantId,
    pub face: CardFace,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub at: Millis,
    pub status: DrawStatus,
    /// Rotation of the whole ensemble around the vertical axis
    pub scene_rotation: f64,
    pub cards: Vec<CardFrame>,
}

impl Frame {
    pub(super) fn capture(
        at: Millis,
        status: DrawStatus,
        scene_rotation: f64,
        cards: &CardRegistry,
    ) -> Self {
        let cards = (0..cards.len())
            .filter_map(|index| {
                Some(CardFrame {
                    index,
                    participant_id: cards.participant_at(index)?,
                    face: cards.face(index)?,
                    transform: cards.transform(index)?,
                })
            })
            .collect();
        Self {
            at,
            status,
            scene_rotation,
            cards,
        }
    }
}

pub trait FrameSink: Send {
    fn render(&mut self, frame: &Frame);
}

/// Logs a one-line summary every `every` frames at debug level.
pub struct TracingFrameSink {
    every: u64,
    rendered: u64,
}

impl TracingFrameSink {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            rendered: 0,
        }
    }

    pub fn rendered(&self) -> u64 {
        self.rendered
    }
}

impl FrameSink for TracingFrameSink {
    fn render(&mut self, frame: &Frame) {
        if self.rendered % self.every == 0 {
            let lucky = frame
                .cards
                .iter()
                .filter(|c| matches!(c.face.style, CardStyle::Lucky { .. }))
                .count();
            tracing::debug!(
                at = frame.at,
                status = %frame.status,
                cards = frame.cards.len(),
                lucky,
                scene_rotation = frame.scene_rotation,
                "Frame"
            );
        }
        self.rendered += 1;
    }
}
