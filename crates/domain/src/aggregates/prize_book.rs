//! Prize book - the ordered prize configuration plus the current selection

use serde::{Deserialize, Serialize};

use crate::aggregates::Prize;
use crate::error::DomainError;
use crate::ids::PrizeId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeBook {
    prizes: Vec<Prize>,
    #[serde(default)]
    current: Option<PrizeId>,
}

impl PrizeBook {
    /// Build a book selecting the first prize that still has slots.
    pub fn new(prizes: Vec<Prize>) -> Self {
        let current = prizes.iter().find(|p| !p.is_exhausted()).map(Prize::id);
        Self { prizes, current }
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    pub fn get(&self, id: PrizeId) -> Option<&Prize> {
        self.prizes.iter().find(|p| p.id() == id)
    }

    pub fn current_id(&self) -> Option<PrizeId> {
        self.current
    }

    pub fn current(&self) -> Option<&Prize> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut Prize> {
        let id = self.current?;
        self.prizes.iter_mut().find(|p| p.id() == id)
    }

    /// Make `id` the prize for upcoming rounds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown prize.
    pub fn select(&mut self, id: PrizeId) -> Result<&Prize, DomainError> {
        let index = self
            .prizes
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| DomainError::not_found("Prize", id.to_string()))?;
        self.current = Some(id);
        Ok(&self.prizes[index])
    }

    /// If the current prize is used up, move to the next one with slots left.
    ///
    /// Looks forward from the current position first, then wraps around.
    /// Returns the new selection when it changed.
    pub fn advance_past_exhausted(&mut self) -> Option<PrizeId> {
        let start = match self.current {
            Some(id) => {
                let index = self.prizes.iter().position(|p| p.id() == id)?;
                if !self.prizes[index].is_exhausted() {
                    return None;
                }
                index + 1
            }
            None => 0,
        };
        let len = self.prizes.len();
        let next = (0..len)
            .map(|offset| (start + offset) % len.max(1))
            .find(|i| self.prizes.get(*i).is_some_and(|p| !p.is_exhausted()))
            .map(|i| self.prizes[i].id());
        if next.is_some() {
            self.current = next;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::PrizeName;

    fn prize(name: &str, count: u32) -> Prize {
        Prize::new(PrizeId::new(), PrizeName::new(name).unwrap(), count).unwrap()
    }

    #[test]
    fn defaults_to_first_open_prize() {
        let mut first = prize("First", 1);
        first.commit_round(1).unwrap();
        let second = prize("Second", 2);
        let second_id = second.id();

        let book = PrizeBook::new(vec![first, second]);
        assert_eq!(book.current_id(), Some(second_id));
    }

    #[test]
    fn select_unknown_prize_fails() {
        let mut book = PrizeBook::new(vec![prize("Only", 1)]);
        let err = book.select(PrizeId::new()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn advance_moves_to_next_open_prize() {
        let first = prize("First", 1);
        let second = prize("Second", 1);
        let (first_id, second_id) = (first.id(), second.id());
        let mut book = PrizeBook::new(vec![first, second]);

        assert_eq!(book.advance_past_exhausted(), None);
        book.current_mut().unwrap().commit_round(1).unwrap();
        assert_eq!(book.advance_past_exhausted(), Some(second_id));
        assert_ne!(book.current_id(), Some(first_id));
    }

    #[test]
    fn advance_keeps_selection_when_everything_exhausted() {
        let only = prize("Only", 1);
        let id = only.id();
        let mut book = PrizeBook::new(vec![only]);
        book.current_mut().unwrap().commit_round(1).unwrap();
        assert_eq!(book.advance_past_exhausted(), None);
        assert_eq!(book.current_id(), Some(id));
    }
}
