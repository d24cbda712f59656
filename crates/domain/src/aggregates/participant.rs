//! Participant aggregate - one person on the draw roster
//!
//! Participants are created by registration (or a live merge), mutated only
//! when they win a prize, and never deleted while a show is running.
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: All fields are encapsulated
//! - **Valid by construction**: `new()` takes pre-validated types
//! - **Domain behavior**: `record_award()`, `has_prize()`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ParticipantId, PrizeId};
use crate::value_objects::{ParticipantName, PhoneNumber, PrizeName};

/// One prize won by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeAward {
    pub prize_id: PrizeId,
    pub prize_name: PrizeName,
    pub won_at: DateTime<Utc>,
}

/// A person on the roster
///
/// # Invariants
///
/// - `is_win` is true exactly when `awards` is non-empty
/// - `updated_at >= created_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: ParticipantId,
    /// Short id shown on the card (e.g. `U1718000000000`)
    display_id: String,
    name: ParticipantName,
    phone: PhoneNumber,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    is_win: bool,
    #[serde(default)]
    awards: Vec<PrizeAward>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        display_id: impl Into<String>,
        name: ParticipantName,
        phone: PhoneNumber,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_id: display_id.into(),
            name,
            phone,
            avatar: None,
            is_win: false,
            awards: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Draft record for someone who just registered through the live feed.
    ///
    /// The display id is derived from the registration instant so that two
    /// drafts created in different milliseconds never share one.
    pub fn draft(
        id: ParticipantId,
        name: ParticipantName,
        phone: PhoneNumber,
        now: DateTime<Utc>,
    ) -> Self {
        let display_id = format!("U{}", now.timestamp_millis());
        Self::new(id, display_id, name, phone, now)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn display_id(&self) -> &str {
        &self.display_id
    }

    pub fn name(&self) -> &ParticipantName {
        &self.name
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn is_win(&self) -> bool {
        self.is_win
    }

    pub fn awards(&self) -> &[PrizeAward] {
        &self.awards
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_prize(&self, prize_id: PrizeId) -> bool {
        self.awards.iter().any(|a| a.prize_id == prize_id)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a won prize to this participant's record.
    pub fn record_award(&mut self, prize_id: PrizeId, prize_name: PrizeName, at: DateTime<Utc>) {
        self.awards.push(PrizeAward {
            prize_id,
            prize_name,
            won_at: at,
        });
        self.is_win = true;
        if at > self.updated_at {
            self.updated_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn create_participant() -> Participant {
        Participant::new(
            ParticipantId::new(),
            "U1",
            ParticipantName::new("Li Na").unwrap(),
            PhoneNumber::new("13800000001"),
            fixed_time(),
        )
    }

    #[test]
    fn new_participant_has_not_won() {
        let p = create_participant();
        assert!(!p.is_win());
        assert!(p.awards().is_empty());
        assert_eq!(p.created_at(), p.updated_at());
        assert!(p.avatar().is_none());
    }

    #[test]
    fn draft_display_id_uses_millis() {
        let p = Participant::draft(
            ParticipantId::new(),
            ParticipantName::new("Wang Qiang").unwrap(),
            PhoneNumber::new("13900000000"),
            fixed_time(),
        );
        assert_eq!(p.display_id(), "U1700000000000");
    }

    #[test]
    fn record_award_marks_winner() {
        let mut p = create_participant();
        let prize_id = PrizeId::new();
        let later = fixed_time() + chrono::Duration::seconds(30);

        p.record_award(prize_id, PrizeName::new("First Prize").unwrap(), later);

        assert!(p.is_win());
        assert!(p.has_prize(prize_id));
        assert!(!p.has_prize(PrizeId::new()));
        assert_eq!(p.awards().len(), 1);
        assert_eq!(p.updated_at(), later);
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = serde_json::json!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "display_id": "U7",
            "name": "Chen Jie",
            "phone": "13700000000",
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:30:00Z"
        });
        let p: Participant = serde_json::from_value(json).unwrap();
        assert_eq!(p.name().as_str(), "Chen Jie");
        assert!(!p.is_win());
    }
}
