//! Ambient randomizer - cosmetic re-skinning of a few cards per tick
//!
//! Only faces are touched. Card bindings and participant records are never
//! modified, and slots reserved for winners are always skipped.

use luckydraw_domain::{ParticipantId, SlotReservations};

use super::cards::{CardFace, CardRegistry, CardStyle};
use super::choreographer::Millis;
use crate::infrastructure::ports::RandomPort;

pub struct AmbientRandomizer {
    batch: usize,
    interval: Millis,
    next_tick: Option<Millis>,
}

impl AmbientRandomizer {
    pub fn new(batch: usize, interval: Millis) -> Self {
        Self {
            batch,
            interval: interval.max(1),
            next_tick: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Arm the tick timer. Restarting an armed timer pushes the next tick out.
    pub fn start(&mut self, now: Millis) {
        self.next_tick = Some(now.saturating_add(self.interval));
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    /// Whether a tick is due at `now`. Schedules the following tick.
    ///
    /// Several missed intervals collapse into one tick.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.next_tick {
            Some(due) if now >= due => {
                let missed = (now - due) / self.interval;
                self.next_tick = Some(due + (missed + 1) * self.interval);
                true
            }
            _ => false,
        }
    }

    /// Overlay up to `batch` random unreserved cards with random participants.
    ///
    /// Returns how many cards were re-skinned.
    pub fn shuffle(
        &self,
        cards: &mut CardRegistry,
        pool: &[ParticipantId],
        reserved: &SlotReservations,
        random: &dyn RandomPort,
    ) -> usize {
        if cards.is_empty() || pool.is_empty() {
            return 0;
        }
        let mut changed = 0;
        for _ in 0..self.batch {
            let index = random.gen_index(cards.len());
            let shown = pool[random.gen_index(pool.len())];
            if reserved.contains(index) {
                continue;
            }
            cards.set_face(
                index,
                CardFace {
                    shown,
                    style: CardStyle::Shuffle,
                },
            );
            changed += 1;
        }
        changed
    }
}
