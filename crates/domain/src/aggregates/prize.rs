//! Prize aggregate - quota bookkeeping for one prize tier
//!
//! A prize has a total slot count that is consumed round by round. It may be
//! split into ordered partitions (sub-quotas) that are consumed front to back,
//! so a tier of 30 can be drawn as 10 + 10 + 10 on stage.
//!
//! # Invariants
//!
//! - `used <= count`
//! - `exhausted` is true exactly when `used == count`
//! - each partition's `used <= count`
//!
//! Deserialization goes through [`PrizeRecord`] so stored snapshots that
//! violate these are repaired on load instead of leaking into the engine.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::PrizeId;
use crate::value_objects::PrizeName;

/// A sub-allocation of a prize's total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPartition {
    pub count: u32,
    #[serde(default)]
    pub used: u32,
}

impl QuotaPartition {
    pub fn new(count: u32) -> Self {
        Self { count, used: 0 }
    }

    pub fn remaining(&self) -> u32 {
        self.count.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.count
    }
}

/// Outcome of committing a round against a prize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrizeCommit {
    pub drawn: u32,
    pub used: u32,
    pub exhausted: bool,
    /// Index of the partition the round was charged to, if any
    pub partition: Option<usize>,
}

/// Serialized shape of a prize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeRecord {
    pub id: PrizeId,
    pub name: PrizeName,
    pub count: u32,
    #[serde(default)]
    pub used: u32,
    #[serde(default)]
    pub exhausted: bool,
    /// Winners of other prizes stay eligible for this one
    #[serde(default)]
    pub draw_from_all: bool,
    #[serde(default)]
    pub partitions: Vec<QuotaPartition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PrizeRecord", into = "PrizeRecord")]
pub struct Prize {
    id: PrizeId,
    name: PrizeName,
    count: u32,
    used: u32,
    exhausted: bool,
    draw_from_all: bool,
    partitions: Vec<QuotaPartition>,
}

impl Prize {
    /// Create a prize with `count` total slots.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `count` is zero.
    pub fn new(id: PrizeId, name: PrizeName, count: u32) -> Result<Self, DomainError> {
        if count == 0 {
            return Err(DomainError::validation("Prize count must be at least 1"));
        }
        Ok(Self {
            id,
            name,
            count,
            used: 0,
            exhausted: false,
            draw_from_all: false,
            partitions: Vec::new(),
        })
    }

    pub fn with_draw_from_all(mut self, draw_from_all: bool) -> Self {
        self.draw_from_all = draw_from_all;
        self
    }

    /// Split the prize into ordered partitions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a partition is empty or the
    /// partitions add up to more than the prize count.
    pub fn with_partitions(mut self, counts: &[u32]) -> Result<Self, DomainError> {
        if counts.iter().any(|c| *c == 0) {
            return Err(DomainError::validation("Partition count must be at least 1"));
        }
        let total: u64 = counts.iter().map(|c| u64::from(*c)).sum();
        if total > u64::from(self.count) {
            return Err(DomainError::validation(format!(
                "Partitions sum to {} but prize only has {} slots",
                total, self.count
            )));
        }
        self.partitions = counts.iter().map(|c| QuotaPartition::new(*c)).collect();
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> PrizeId {
        self.id
    }

    pub fn name(&self) -> &PrizeName {
        &self.name
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn draw_from_all(&self) -> bool {
        self.draw_from_all
    }

    pub fn partitions(&self) -> &[QuotaPartition] {
        &self.partitions
    }

    pub fn remaining(&self) -> u32 {
        self.count.saturating_sub(self.used)
    }

    /// First partition that still has room.
    pub fn active_partition(&self) -> Option<(usize, &QuotaPartition)> {
        self.partitions
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_exhausted())
    }

    /// How many winners the next round should draw.
    ///
    /// The active partition's remaining count takes precedence over the
    /// prize's remaining total; the result never exceeds either, and is capped
    /// by `max_per_draw`. Zero when the prize is exhausted.
    pub fn round_quota(&self, max_per_draw: u32) -> u32 {
        if self.exhausted {
            return 0;
        }
        let leftover = match self.active_partition() {
            Some((_, partition)) => partition.remaining().min(self.remaining()),
            None => self.remaining(),
        };
        leftover.min(max_per_draw)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Charge `drawn` winners to this prize and its active partition(s).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::QuotaExceeded` (and leaves the prize untouched)
    /// if the round would push `used` past `count`.
    pub fn commit_round(&mut self, drawn: u32) -> Result<PrizeCommit, DomainError> {
        let used = self.used.saturating_add(drawn);
        if used > self.count {
            return Err(DomainError::quota_exceeded(used, self.count));
        }

        let charged = self.active_partition().map(|(index, _)| index);
        let mut left = drawn;
        for partition in self.partitions.iter_mut().filter(|p| !p.is_exhausted()) {
            if left == 0 {
                break;
            }
            let take = left.min(partition.remaining());
            partition.used += take;
            left -= take;
        }

        self.used = used;
        self.exhausted = self.used == self.count;

        Ok(PrizeCommit {
            drawn,
            used: self.used,
            exhausted: self.exhausted,
            partition: charged,
        })
    }
}

impl From<PrizeRecord> for Prize {
    fn from(record: PrizeRecord) -> Self {
        let count = record.count;
        let used = if record.exhausted {
            count
        } else {
            record.used.min(count)
        };
        let partitions = record
            .partitions
            .into_iter()
            .map(|p| QuotaPartition {
                count: p.count,
                used: p.used.min(p.count),
            })
            .collect();
        Self {
            id: record.id,
            name: record.name,
            count,
            used,
            exhausted: used == count,
            draw_from_all: record.draw_from_all,
            partitions,
        }
    }
}

impl From<Prize> for PrizeRecord {
    fn from(prize: Prize) -> Self {
        Self {
            id: prize.id,
            name: prize.name,
            count: prize.count,
            used: prize.used,
            exhausted: prize.exhausted,
            draw_from_all: prize.draw_from_all,
            partitions: prize.partitions,
        }
    }
}
