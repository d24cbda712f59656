//! Roster - the ordered list of everyone taking part
//!
//! Order is registration order and is the source of truth for the grid
//! layout. Phones are the natural dedup key; empty phones never collide.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregates::{Participant, Prize};
use crate::error::DomainError;
use crate::ids::{ParticipantId, PrizeId};
use crate::value_objects::PhoneNumber;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Participant>", into = "Vec<Participant>")]
pub struct Roster {
    participants: Vec<Participant>,
    by_id: HashMap<ParticipantId, usize>,
}

impl Roster {
    /// Build a roster, keeping the first record for any repeated id or phone.
    ///
    /// Use [`Roster::load`] when the skipped records need reporting.
    pub fn new(participants: Vec<Participant>) -> Self {
        Self::load(participants).0
    }

    /// Build a roster from stored records, returning why each skipped record
    /// was rejected. Duplicates in imported data are skipped, not fatal.
    pub fn load(participants: Vec<Participant>) -> (Self, Vec<DomainError>) {
        let mut roster = Self::default();
        let mut rejected = Vec::new();
        for participant in participants {
            if let Err(e) = roster.push(participant) {
                rejected.push(e);
            }
        }
        (roster, rejected)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.by_id.get(&id).map(|i| &self.participants[*i])
    }

    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        match self.by_id.get(&id) {
            Some(i) => self.participants.get_mut(*i),
            None => None,
        }
    }

    pub fn at(&self, index: usize) -> Option<&Participant> {
        self.participants.get(index)
    }

    pub fn position(&self, id: ParticipantId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn contains_phone(&self, phone: &PhoneNumber) -> bool {
        !phone.is_empty() && self.participants.iter().any(|p| p.phone() == phone)
    }

    /// Append a participant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if the id or (non-empty) phone is
    /// already on the roster.
    pub fn push(&mut self, participant: Participant) -> Result<usize, DomainError> {
        if self.by_id.contains_key(&participant.id()) {
            return Err(DomainError::constraint(format!(
                "Participant {} already on roster",
                participant.id()
            )));
        }
        if self.contains_phone(participant.phone()) {
            return Err(DomainError::constraint(format!(
                "Phone {} already registered",
                participant.phone()
            )));
        }
        let index = self.participants.len();
        self.by_id.insert(participant.id(), index);
        self.participants.push(participant);
        Ok(index)
    }

    /// Participants who have not won anything yet.
    pub fn not_won(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|p| !p.is_win())
            .map(|p| p.id())
            .collect()
    }

    /// Participants who do not already hold `prize_id`.
    pub fn not_holding(&self, prize_id: PrizeId) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|p| !p.has_prize(prize_id))
            .map(|p| p.id())
            .collect()
    }

    /// Eligible pool for a round of `prize`.
    ///
    /// Draw-from-all prizes accept winners of other prizes; everything else is
    /// drawn only from people who have not won yet.
    pub fn eligible_for(&self, prize: &Prize) -> Vec<ParticipantId> {
        if prize.draw_from_all() {
            self.not_holding(prize.id())
        } else {
            self.not_won()
        }
    }
}

impl From<Vec<Participant>> for Roster {
    fn from(participants: Vec<Participant>) -> Self {
        Self::new(participants)
    }
}

impl From<Roster> for Vec<Participant> {
    fn from(roster: Roster) -> Self {
        roster.participants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{ParticipantName, PrizeName};
    use chrono::{TimeZone, Utc};

    fn person(name: &str, phone: &str) -> Participant {
        Participant::new(
            ParticipantId::new(),
            "U0",
            ParticipantName::new(name).unwrap(),
            PhoneNumber::new(phone),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
    }

    #[test]
    fn push_rejects_duplicate_phone() {
        let mut roster = Roster::default();
        roster.push(person("A", "13800000001")).unwrap();
        let err = roster.push(person("B", "13800000001")).unwrap_err();
        assert!(matches!(err, DomainError::Constraint(_)));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn empty_phones_never_collide() {
        let mut roster = Roster::default();
        roster.push(person("A", "")).unwrap();
        roster.push(person("B", "")).unwrap();
        assert_eq!(roster.len(), 2);
        assert!(!roster.contains_phone(&PhoneNumber::new("")));
    }

    #[test]
    fn new_skips_duplicates_and_keeps_order() {
        let roster = Roster::new(vec![
            person("A", "1"),
            person("B", "2"),
            person("C", "1"),
        ]);
        let names: Vec<_> = roster.iter().map(|p| p.name().as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn load_reports_skipped_records() {
        let first = person("A", "1");
        let same_id = first.clone();
        let (roster, rejected) =
            Roster::load(vec![first, person("B", "1"), same_id, person("C", "")]);
        assert_eq!(roster.len(), 2);
        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().all(|e| matches!(e, DomainError::Constraint(_))));
    }

    #[test]
    fn eligible_pool_respects_draw_from_all() {
        let at = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
        let first = Prize::new(PrizeId::new(), PrizeName::new("First").unwrap(), 1).unwrap();
        let open = Prize::new(PrizeId::new(), PrizeName::new("Open").unwrap(), 3)
            .unwrap()
            .with_draw_from_all(true);

        let mut roster = Roster::new(vec![person("A", "1"), person("B", "2"), person("C", "3")]);
        let winner = roster.at(0).unwrap().id();
        roster
            .get_mut(winner)
            .unwrap()
            .record_award(first.id(), first.name().clone(), at);

        let exclusive = roster.eligible_for(&first);
        assert_eq!(exclusive.len(), 2);
        assert!(!exclusive.contains(&winner));

        let inclusive = roster.eligible_for(&open);
        assert_eq!(inclusive.len(), 3);
    }

    #[test]
    fn serde_roundtrip_rebuilds_index() {
        let roster = Roster::new(vec![person("A", "1"), person("B", "2")]);
        let id = roster.at(1).unwrap().id();
        let json = serde_json::to_string(&roster).unwrap();
        let back: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position(id), Some(1));
    }
}
