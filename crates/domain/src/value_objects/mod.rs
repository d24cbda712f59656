//! Value objects - immutable, validated building blocks

mod draw_status;
mod geometry;
mod names;

pub use draw_status::DrawStatus;
pub use geometry::{CardSize, Transform, Vec3};
pub use names::{ParticipantName, PhoneNumber, PrizeName};
