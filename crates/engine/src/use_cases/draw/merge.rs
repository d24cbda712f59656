//! Live merge - registrations arriving from the feed while the show runs
//!
//! A newcomer joins the roster and gets a card without disturbing the
//! lifecycle. On the table the whole grid is rebuilt and the new card flies in
//! from the side; on the sphere one card is inserted at a random position and
//! everything not held by a winner redistributes around it.
//!
//! Merges never run while the lock is held. They wait in a queue and are
//! applied on the first tick after the lock is released.

use std::sync::Arc;

use luckydraw_domain::{
    DrawStatus, Participant, ParticipantId, ParticipantName, PhoneNumber, Transform, Vec3,
};
use luckydraw_shared::FeedMessage;

use super::error::DrawError;
use super::events::LifecycleEvent;
use super::round::{Completion, StoreRequest};
use super::DrawEngine;
use crate::entities::{Easing, Segment};

/// Off-stage position new grid cards fly in from.
const GRID_ENTRY_X: f64 = 3000.0;
const GRID_ENTRY_SPREAD: f64 = 1000.0;
/// How far from its sphere target a new card starts.
const SPHERE_ENTRY_SPREAD: f64 = 3000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// On the roster with a card
    Applied(ParticipantId),
    /// Waiting for the lock to be released
    Queued(ParticipantId),
    /// Phone number already registered
    Duplicate,
    /// Feed message of a type the engine does not handle
    Ignored,
}

impl DrawEngine {
    /// Handle one raw text frame from the registration feed.
    ///
    /// # Errors
    ///
    /// `MalformedEvent` for payloads that do not parse or carry an invalid
    /// name. The event is dropped and the engine is unchanged.
    pub fn receive_feed(&mut self, text: &str) -> Result<MergeOutcome, DrawError> {
        if self.torn_down {
            return Err(DrawError::ResourceTeardown);
        }
        match FeedMessage::parse(text) {
            Ok(FeedMessage::NewPerson { name, phone }) => self.merge_participant(&name, &phone),
            Ok(FeedMessage::Unknown) => {
                tracing::debug!("Ignoring feed message of unknown type");
                Ok(MergeOutcome::Ignored)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed feed event");
                Err(DrawError::malformed(e.to_string()))
            }
        }
    }

    /// Register a newcomer, deduplicated by phone number.
    pub fn merge_participant(
        &mut self,
        name: &str,
        phone: &str,
    ) -> Result<MergeOutcome, DrawError> {
        if self.torn_down {
            return Err(DrawError::ResourceTeardown);
        }
        let name = ParticipantName::new(name).map_err(|e| {
            tracing::warn!(error = %e, "Dropping registration with invalid name");
            DrawError::malformed(e.to_string())
        })?;
        let phone = PhoneNumber::new(phone);

        let queued_twice =
            !phone.is_empty() && self.merge_queue.iter().any(|p| p.phone() == &phone);
        if self.roster.contains_phone(&phone) || queued_twice {
            tracing::info!(%phone, "Ignoring duplicate registration");
            return Ok(MergeOutcome::Duplicate);
        }

        let participant = Participant::draft(
            ParticipantId::from_uuid(self.random.gen_uuid()),
            name,
            phone,
            self.clock.now(),
        );
        let id = participant.id();

        if self.round.locked {
            tracing::info!(
                participant_id = %id,
                queued = self.merge_queue.len() + 1,
                "Merge deferred until unlocked"
            );
            self.merge_queue.push_back(participant);
            return Ok(MergeOutcome::Queued(id));
        }
        self.apply_merge(participant)?;
        Ok(MergeOutcome::Applied(id))
    }

    /// Apply queued merges, in arrival order, while the lock stays free.
    pub(super) fn drain_merge_queue(&mut self) {
        while !self.round.locked {
            let Some(participant) = self.merge_queue.pop_front() else {
                break;
            };
            if let Err(e) = self.apply_merge(participant) {
                tracing::warn!(error = %e, "Queued merge failed");
            }
        }
    }

    fn apply_merge(&mut self, participant: Participant) -> Result<(), DrawError> {
        let id = participant.id();
        let name = participant.name().to_string();
        self.roster.push(participant.clone())?;
        self.outbox.push(StoreRequest::AddParticipant(participant));

        let card_index = if self.round.status.uses_sphere() {
            self.merge_into_sphere(id)
        } else {
            self.merge_into_grid(id)
        };

        tracing::info!(
            participant_id = %id,
            card_index,
            roster = self.roster.len(),
            status = %self.round.status,
            "Participant merged"
        );
        self.emit(LifecycleEvent::ParticipantJoined {
            participant_id: id,
            name,
            card_index,
        });
        self.dirty = true;
        Ok(())
    }

    /// Rebuild every card in roster order and re-lay the table.
    fn merge_into_grid(&mut self, id: ParticipantId) -> usize {
        self.cancel_in_flight();
        let random = Arc::clone(&self.random);
        self.cards.rebuild(self.roster.iter().map(|p| p.id()), |_| {
            Transform::at(Vec3::new(
                GRID_ENTRY_X,
                (random.gen_unit() - 0.5) * GRID_ENTRY_SPREAD,
                (random.gen_unit() - 0.5) * GRID_ENTRY_SPREAD,
            ))
        });
        let count = self.cards.len();
        self.choreographer.resize(count);
        self.round.reservations.reset(count);

        let duration = self.settings.timing.merge_grid_ms;
        let transition = self.choreographer.begin(Completion::Merge);
        for (index, target) in self.grid().targets(count).into_iter().enumerate() {
            self.choreographer.animate_to(
                transition,
                index,
                target,
                Segment::new(target.position, duration, Easing::ExponentialInOut),
                Segment::new(target.rotation, duration, Easing::ExponentialInOut),
                self.now,
            );
        }
        self.cards.index_of(id).unwrap_or(count.saturating_sub(1))
    }

    /// Insert one card into the sphere and retarget every card still on it.
    fn merge_into_sphere(&mut self, id: ParticipantId) -> usize {
        self.cancel_in_flight();
        let appended = self.cards.len();
        let targets = self.sphere().targets(appended + 1);
        let home = targets.get(appended).copied().unwrap_or_default();
        let jitter = Vec3::new(
            (self.random.gen_unit() - 0.5) * SPHERE_ENTRY_SPREAD,
            (self.random.gen_unit() - 0.5) * SPHERE_ENTRY_SPREAD,
            (self.random.gen_unit() - 0.5) * SPHERE_ENTRY_SPREAD,
        );
        let mut index = self
            .cards
            .push(id, Transform::new(home.position + jitter, home.rotation));
        self.choreographer.resize(self.cards.len());
        self.round.reservations.grow_to(self.cards.len());

        // Scatter arrivals across the sphere instead of always filling the end
        let swap_with = self.random.gen_index(appended + 1);
        if swap_with != index && !self.round.reservations.contains(swap_with) {
            self.cards.swap(index, swap_with);
            self.choreographer.swap(index, swap_with);
            index = swap_with;
        }

        // Winners only leave the sphere once revealed
        let on_podium = self.round.status == DrawStatus::End;
        let duration = self.settings.timing.merge_retarget_ms;
        let transition = self.choreographer.begin(Completion::Merge);
        for (slot, target) in targets.into_iter().enumerate() {
            if on_podium && self.round.reservations.contains(slot) {
                continue;
            }
            self.choreographer.animate_to(
                transition,
                slot,
                target,
                Segment::new(target.position, duration, Easing::ThreePhase),
                Segment::new(target.rotation, duration, Easing::ThreePhase),
                self.now,
            );
        }
        index
    }
}
