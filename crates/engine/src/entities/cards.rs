//! Card registry - visual cards bound one-to-one to roster participants
//!
//! A card's *binding* is the participant it represents and never changes
//! except through `rebuild` or `swap`. Its *face* is what is currently shown,
//! which cosmetic effects may overwrite and `reset_face` restores.

use std::collections::HashMap;

use luckydraw_domain::{ParticipantId, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CardStyle {
    #[default]
    Default,
    /// Temporarily showing someone else during the ambient shuffle
    Shuffle,
    /// Revealed winner, drawn at `scale`
    Lucky { scale: f64 },
}

/// What a card currently displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardFace {
    pub shown: ParticipantId,
    pub style: CardStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Card {
    participant_id: ParticipantId,
    face: CardFace,
}

impl Card {
    fn new(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            face: CardFace {
                shown: participant_id,
                style: CardStyle::Default,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardRegistry {
    cards: Vec<Card>,
    /// Kept apart from `cards` so the choreographer can write a plain slice
    transforms: Vec<Transform>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn participant_at(&self, index: usize) -> Option<ParticipantId> {
        self.cards.get(index).map(|c| c.participant_id)
    }

    pub fn index_of(&self, id: ParticipantId) -> Option<usize> {
        self.cards.iter().position(|c| c.participant_id == id)
    }

    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.cards.iter().map(|c| c.participant_id)
    }

    pub fn face(&self, index: usize) -> Option<CardFace> {
        self.cards.get(index).map(|c| c.face)
    }

    pub fn transform(&self, index: usize) -> Option<Transform> {
        self.transforms.get(index).copied()
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut [Transform] {
        &mut self.transforms
    }

    pub fn set_transform(&mut self, index: usize, transform: Transform) {
        if let Some(slot) = self.transforms.get_mut(index) {
            *slot = transform;
        }
    }

    /// Recreate every card in `ids` order.
    ///
    /// Participants that already had a card keep its current transform;
    /// new ones start at `spawn(index)`. All faces are reset.
    pub fn rebuild(
        &mut self,
        ids: impl IntoIterator<Item = ParticipantId>,
        mut spawn: impl FnMut(usize) -> Transform,
    ) {
        let previous: HashMap<ParticipantId, Transform> = self
            .cards
            .iter()
            .zip(self.transforms.iter())
            .map(|(card, transform)| (card.participant_id, *transform))
            .collect();

        self.cards.clear();
        self.transforms.clear();
        for id in ids {
            let index = self.cards.len();
            let transform = previous.get(&id).copied().unwrap_or_else(|| spawn(index));
            self.cards.push(Card::new(id));
            self.transforms.push(transform);
        }
    }

    /// Append a card and return its index.
    pub fn push(&mut self, id: ParticipantId, transform: Transform) -> usize {
        self.cards.push(Card::new(id));
        self.transforms.push(transform);
        self.cards.len() - 1
    }

    /// Exchange two cards, binding and transform together.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a < self.cards.len() && b < self.cards.len() {
            self.cards.swap(a, b);
            self.transforms.swap(a, b);
        }
    }

    pub fn set_face(&mut self, index: usize, face: CardFace) {
        if let Some(card) = self.cards.get_mut(index) {
            card.face = face;
        }
    }

    /// Show the bound participant again in the default style.
    pub fn reset_face(&mut self, index: usize) {
        if let Some(card) = self.cards.get_mut(index) {
            *card = Card::new(card.participant_id);
        }
    }

    pub fn reset_faces(&mut self) {
        for card in &mut self.cards {
            *card = Card::new(card.participant_id);
        }
    }
}
