//! Lucky draw domain model
//!
//! Participants, prizes with quota bookkeeping, the roster, and the pure
//! algorithms the draw engine is built on: formation geometry, winner
//! sampling with slot reservation, and the winner podium layout.
//!
//! This crate has no I/O and no RNG dependency. Anything random is passed in
//! as a closure so the engine decides where randomness comes from.

pub mod aggregates;
pub mod error;
pub mod formation;
pub mod ids;
pub mod podium;
pub mod selection;
pub mod value_objects;

pub use aggregates::{
    Participant, Prize, PrizeAward, PrizeBook, PrizeCommit, PrizeRecord, QuotaPartition, Roster,
};
pub use error::DomainError;
pub use formation::{
    compute_grid_targets, compute_sphere_targets, compute_sphere_targets_with_radius, Formation,
    DEFAULT_SPHERE_RADIUS,
};
pub use ids::{ParticipantId, PrizeId};
pub use podium::{winner_display_targets, PodiumSlot, Viewport, PODIUM_DEPTH, PODIUM_ROW_LEN};
pub use selection::{preferred_slot, select_winners, SlotReservations, WinnerSlot};
pub use value_objects::{
    CardSize, DrawStatus, ParticipantName, PhoneNumber, PrizeName, Transform, Vec3,
};
