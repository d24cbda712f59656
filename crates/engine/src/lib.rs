//! LuckyDraw Engine library.
//!
//! Runs a live prize-draw show: participant cards move between a table grid
//! and a spinning sphere, winners are drawn against prize quotas, and people
//! who register mid-show are merged into the display without interrupting it.
//!
//! ## Structure
//!
//! - `entities/` - Card registry, choreographer, easing and ambient shuffle
//! - `use_cases/` - The draw lifecycle state machine and live merge
//! - `infrastructure/` - Ports, settings, clocks and the JSON store
//! - `api/` - Registration feed client and console operator surface
//! - `app` - Application composition and the show loop

pub mod api;
pub mod app;
pub mod entities;
pub mod infrastructure;
pub mod use_cases;


pub use app::App;
