//! JSON file implementation of the lottery store.
//!
//! The whole snapshot lives in one file that is rewritten on every change.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use luckydraw_domain::{Participant, Prize};

use crate::infrastructure::ports::{LotterySnapshot, LotteryStore, StoreError, WinnerRecord};

pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<LotterySnapshot, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(LotterySnapshot::default()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StoreError::serialization),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LotterySnapshot::default()),
            Err(e) => Err(StoreError::io("read_snapshot", e)),
        }
    }

    async fn write(&self, snapshot: &LotterySnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(snapshot).map_err(StoreError::serialization)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io("write_snapshot", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io("write_snapshot", e))
    }
}

#[async_trait]
impl LotteryStore for JsonFileStore {
    async fn load_snapshot(&self) -> Result<LotterySnapshot, StoreError> {
        let _guard = self.write_lock.lock().await;
        self.read().await
    }

    async fn add_participant(&self, participant: &Participant) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.read().await?;
        if snapshot.participants.iter().any(|p| p.id() == participant.id()) {
            return Ok(());
        }
        snapshot.participants.push(participant.clone());
        self.write(&snapshot).await
    }

    async fn record_winners(&self, records: &[WinnerRecord]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.read().await?;
        for record in records {
            let participant = snapshot
                .participants
                .iter_mut()
                .find(|p| p.id() == record.participant_id)
                .ok_or_else(|| StoreError::not_found("Participant", record.participant_id))?;
            if !participant.has_prize(record.prize_id) {
                participant.record_award(record.prize_id, record.prize_name.clone(), record.won_at);
            }
        }
        self.write(&snapshot).await
    }

    async fn save_prize(&self, prize: &Prize) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.read().await?;
        match snapshot.prizes.iter_mut().find(|p| p.id() == prize.id()) {
            Some(existing) => *existing = prize.clone(),
            None => snapshot.prizes.push(prize.clone()),
        }
        self.write(&snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use luckydraw_domain::{ParticipantId, ParticipantName, PhoneNumber, PrizeId, PrizeName};

    fn person(name: &str, phone: &str) -> Participant {
        Participant::new(
            ParticipantId::new(),
            "U1",
            ParticipantName::new(name).unwrap(),
            PhoneNumber::new(phone),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
    }

    fn store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("luckydraw.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn missing_file_is_empty_snapshot() {
        let (_dir, store) = store();
        let snapshot = store.load_snapshot().await.unwrap();
        assert!(snapshot.participants.is_empty());
        assert!(snapshot.prizes.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_serialization_error() {
        let (_dir, store) = store();
        tokio::fs::write(store.path(), b"{ nope").await.unwrap();
        let err = store.load_snapshot().await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn add_participant_persists_once() {
        let (_dir, store) = store();
        let p = person("Li Na", "13800000001");
        store.add_participant(&p).await.unwrap();
        store.add_participant(&p).await.unwrap();

        let snapshot = store.load_snapshot().await.unwrap();
        assert_eq!(snapshot.participants, vec![p]);
    }

    #[tokio::test]
    async fn record_winners_appends_awards() {
        let (_dir, store) = store();
        let p = person("Li Na", "13800000001");
        store.add_participant(&p).await.unwrap();

        let record = WinnerRecord {
            participant_id: p.id(),
            prize_id: PrizeId::new(),
            prize_name: PrizeName::new("First Prize").unwrap(),
            won_at: Utc.timestamp_opt(1_700_000_500, 0).unwrap(),
        };
        store.record_winners(std::slice::from_ref(&record)).await.unwrap();
        // Replaying the same commit does not duplicate the award
        store.record_winners(std::slice::from_ref(&record)).await.unwrap();

        let snapshot = store.load_snapshot().await.unwrap();
        let saved = &snapshot.participants[0];
        assert!(saved.is_win());
        assert_eq!(saved.awards().len(), 1);
        assert!(saved.has_prize(record.prize_id));
    }

    #[tokio::test]
    async fn record_winners_for_unknown_participant_fails() {
        let (_dir, store) = store();
        let record = WinnerRecord {
            participant_id: ParticipantId::new(),
            prize_id: PrizeId::new(),
            prize_name: PrizeName::new("Ghost").unwrap(),
            won_at: Utc.timestamp_opt(1_700_000_500, 0).unwrap(),
        };
        let err = store.record_winners(&[record]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn save_prize_upserts() {
        let (_dir, store) = store();
        let mut prize = Prize::new(PrizeId::new(), PrizeName::new("Grand").unwrap(), 2).unwrap();
        store.save_prize(&prize).await.unwrap();
        prize.commit_round(2).unwrap();
        store.save_prize(&prize).await.unwrap();

        let snapshot = store.load_snapshot().await.unwrap();
        assert_eq!(snapshot.prizes.len(), 1);
        assert!(snapshot.prizes[0].is_exhausted());
        assert_eq!(snapshot.prizes[0].used(), 2);
    }
}
