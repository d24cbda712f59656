//! Per-round bookkeeping and the engine's store outbox.

use luckydraw_domain::{
    DrawStatus, Participant, ParticipantId, Prize, PrizeId, SlotReservations, WinnerSlot,
};

use crate::infrastructure::ports::WinnerRecord;

/// What happens when a transition finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Grid or sphere formation change; releases the lock and clears winners
    Formation,
    /// Winners arrived on the podium; the round ends
    Reveal,
    /// Cards redistributed after a live merge; holds no lock
    Merge,
}

/// Lifecycle status plus the provisional round in flight.
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    pub(super) status: DrawStatus,
    pub(super) locked: bool,
    pub(super) prize_id: Option<PrizeId>,
    /// Eligible participants not drawn this round
    pub(super) pool: Vec<ParticipantId>,
    pub(super) winners: Vec<WinnerSlot>,
    pub(super) reservations: SlotReservations,
}

impl RoundState {
    pub(super) fn new(card_count: usize) -> Self {
        Self {
            reservations: SlotReservations::new(card_count),
            ..Self::default()
        }
    }

    pub fn status(&self) -> DrawStatus {
        self.status
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn prize_id(&self) -> Option<PrizeId> {
        self.prize_id
    }

    pub fn pool(&self) -> &[ParticipantId] {
        &self.pool
    }

    pub fn winners(&self) -> &[WinnerSlot] {
        &self.winners
    }

    pub fn reservations(&self) -> &SlotReservations {
        &self.reservations
    }

    /// Forget the provisional round. Reservations stay until the cards that
    /// hold them have left the podium.
    pub(super) fn discard(&mut self) {
        self.prize_id = None;
        self.pool.clear();
        self.winners.clear();
    }
}

/// A write the runner must perform against the `LotteryStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    AddParticipant(Participant),
    RecordWinners(Vec<WinnerRecord>),
    SavePrize(Prize),
}
