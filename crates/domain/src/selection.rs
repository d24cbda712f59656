//! Winner selection and display-slot reservation
//!
//! Winners are sampled uniformly without replacement. Each winner is then
//! given a card slot derived from its id, so replaying a selection lands the
//! same winners on the same cards. Collisions probe forward one slot at a time.

use std::collections::BTreeSet;

use crate::error::DomainError;
use crate::ids::ParticipantId;

/// One selected winner and the card slot reserved for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinnerSlot {
    pub participant_id: ParticipantId,
    pub slot: usize,
}

/// Card slots held by winners of the round in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotReservations {
    reserved: BTreeSet<usize>,
    card_count: usize,
}

impl SlotReservations {
    pub fn new(card_count: usize) -> Self {
        Self {
            reserved: BTreeSet::new(),
            card_count,
        }
    }

    pub fn card_count(&self) -> usize {
        self.card_count
    }

    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    pub fn free(&self) -> usize {
        self.card_count.saturating_sub(self.reserved.len())
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.reserved.contains(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.reserved.iter().copied()
    }

    /// Drop every reservation and resize for a new card count.
    pub fn reset(&mut self, card_count: usize) {
        self.reserved.clear();
        self.card_count = card_count;
    }

    /// Reserve the slot derived from `id`, probing forward past taken slots.
    ///
    /// Returns `None` when every slot is already reserved.
    pub fn reserve(&mut self, id: ParticipantId) -> Option<usize> {
        if self.free() == 0 {
            return None;
        }
        let start = preferred_slot(id, self.card_count);
        let slot = (0..self.card_count)
            .map(|step| (start + step) % self.card_count)
            .find(|slot| !self.reserved.contains(slot))?;
        self.reserved.insert(slot);
        Some(slot)
    }

    /// Grow the slot range after a card was appended.
    pub fn grow_to(&mut self, card_count: usize) {
        self.card_count = self.card_count.max(card_count);
    }
}

/// Stable slot candidate for a participant: FNV-1a over the id bytes.
pub fn preferred_slot(id: ParticipantId, card_count: usize) -> usize {
    if card_count == 0 {
        return 0;
    }
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    let hash = id
        .as_uuid()
        .as_bytes()
        .iter()
        .fold(OFFSET, |h, b| (h ^ u64::from(*b)).wrapping_mul(PRIME));
    (hash % card_count as u64) as usize
}

/// Draw `k` distinct winners from `pool` and reserve a slot for each.
///
/// `pick(n)` must return an index in `0..n`. Winners are removed from `pool`
/// as they are drawn, so the pool left behind holds only the losers.
///
/// # Errors
///
/// Returns `DomainError::Capacity` without touching `pool` or
/// `reservations` if there are fewer than `k` candidates or free slots.
pub fn select_winners(
    pool: &mut Vec<ParticipantId>,
    k: usize,
    reservations: &mut SlotReservations,
    pick: &mut dyn FnMut(usize) -> usize,
) -> Result<Vec<WinnerSlot>, DomainError> {
    if pool.len() < k {
        return Err(DomainError::capacity(pool.len(), k));
    }
    if reservations.free() < k {
        return Err(DomainError::capacity(reservations.free(), k));
    }

    let mut winners = Vec::with_capacity(k);
    for _ in 0..k {
        let index = pick(pool.len()).min(pool.len() - 1);
        let participant_id = pool.swap_remove(index);
        let slot = reservations
            .reserve(participant_id)
            .ok_or_else(|| DomainError::capacity(0, 1))?;
        winners.push(WinnerSlot {
            participant_id,
            slot,
        });
    }
    Ok(winners)
}
