//! Roster and prize persistence port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use luckydraw_domain::{Participant, ParticipantId, Prize, PrizeId, PrizeName};

use super::StoreError;

/// Everything the engine needs to (re)start a show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotterySnapshot {
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub prizes: Vec<Prize>,
}

/// One committed win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub participant_id: ParticipantId,
    pub prize_id: PrizeId,
    pub prize_name: PrizeName,
    pub won_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LotteryStore: Send + Sync {
    async fn load_snapshot(&self) -> Result<LotterySnapshot, StoreError>;
    /// Append a participant who registered while the show was running.
    async fn add_participant(&self, participant: &Participant) -> Result<(), StoreError>;
    /// Append win records to the participants they belong to.
    async fn record_winners(&self, records: &[WinnerRecord]) -> Result<(), StoreError>;
    /// Persist a prize's usage counters.
    async fn save_prize(&self, prize: &Prize) -> Result<(), StoreError>;
}
