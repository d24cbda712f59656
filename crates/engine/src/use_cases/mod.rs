//! Use cases - User story orchestration.
//!
//! Use cases orchestrate across entity modules to fulfill user stories. The
//! show has one: running the draw.

pub mod draw;

pub use draw::{
    CommandOutcome, Completion, DrawEngine, DrawError, DrawObserver, Frame, FrameSink,
    IgnoredReason, LifecycleEvent, MergeOutcome, StoreRequest, SubscriptionId, TracingFrameSink,
};
