//! Entity modules - the building blocks the draw use case orchestrates.
//!
//! Each module owns one concern of the show (cards, animation, ambient
//! shuffle) and knows nothing about the lifecycle that drives it.

pub mod ambient;
pub mod cards;
pub mod choreographer;
pub mod easing;

pub use ambient::AmbientRandomizer;
pub use cards::{CardFace, CardRegistry, CardStyle};
pub use choreographer::{Channel, Choreographer, Millis, Segment, TransitionId};
pub use easing::Easing;
