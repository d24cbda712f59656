//! Draw use case - the lifecycle state machine behind the show
//!
//! `DrawEngine` owns the roster, the prize book, the card registry and the
//! choreographer, and moves the show through INIT, READY, RUNNING and END.
//!
//! The engine is driven from a single task. Commands return immediately; any
//! state change that depends on an animation (releasing the lock, flipping to
//! END) happens inside `tick` when the choreographer reports the transition
//! complete. Side effects leave the engine in two ways only:
//!
//! - `LifecycleEvent`s delivered to subscribed `DrawObserver`s
//! - `StoreRequest`s collected in an outbox the runner drains into the store
//!
//! # Re-entrancy
//!
//! One lock guards formation changes and the winner reveal. Commands issued
//! while it is held are dropped (`CommandOutcome::Ignored`), except `quit`,
//! which cancels whatever is in flight. Live merges arriving while locked are
//! queued and applied on the first tick after the lock is released.

mod error;
mod events;
mod frame;
mod lifecycle;
mod merge;
mod round;

use std::collections::VecDeque;
use std::sync::Arc;

use luckydraw_domain::{
    DrawStatus, Formation, Participant, ParticipantId, PrizeBook, Roster, Transform, Vec3,
};

use crate::entities::{
    AmbientRandomizer, CardRegistry, Choreographer, Easing, Millis, Segment,
};
use crate::infrastructure::ports::{ClockPort, LotterySnapshot, RandomPort};
use crate::infrastructure::settings::EngineSettings;

pub use error::{CommandOutcome, DrawError, IgnoredReason};
pub use events::{wire_status, DrawObserver, LifecycleEvent, SubscriptionId};
pub use frame::{CardFrame, Frame, FrameSink, TracingFrameSink};
pub use merge::MergeOutcome;
pub use round::{Completion, RoundState, StoreRequest};

/// Half-width of the cube cards fly in from at boot.
const BOOT_SCATTER: f64 = 2000.0;

pub struct DrawEngine {
    settings: EngineSettings,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,

    roster: Roster,
    prizes: PrizeBook,
    cards: CardRegistry,
    choreographer: Choreographer<Completion>,
    ambient: AmbientRandomizer,
    round: RoundState,

    auto_stop_at: Option<Millis>,
    merge_queue: VecDeque<Participant>,

    observers: Vec<(SubscriptionId, Box<dyn DrawObserver>)>,
    next_subscription: u64,
    sinks: Vec<Box<dyn FrameSink>>,
    outbox: Vec<StoreRequest>,

    now: Millis,
    dirty: bool,
    torn_down: bool,
}

impl DrawEngine {
    /// Build the show from a snapshot and start the boot fly-in at time zero.
    pub fn new(
        settings: EngineSettings,
        snapshot: LotterySnapshot,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let (roster, rejected) = Roster::load(snapshot.participants);
        for e in &rejected {
            tracing::warn!(error = %e, "Skipping stored participant");
        }
        let prizes = PrizeBook::new(snapshot.prizes);

        let mut cards = CardRegistry::new();
        let scatter = |random: &dyn RandomPort| {
            Transform::at(Vec3::new(
                (random.gen_unit() * 2.0 - 1.0) * BOOT_SCATTER,
                (random.gen_unit() * 2.0 - 1.0) * BOOT_SCATTER,
                (random.gen_unit() * 2.0 - 1.0) * BOOT_SCATTER,
            ))
        };
        cards.rebuild(roster.iter().map(|p| p.id()), |_| scatter(random.as_ref()));

        let ambient = AmbientRandomizer::new(
            settings.ambient_batch,
            settings.ambient_tick.as_millis() as Millis,
        );

        let mut engine = Self {
            choreographer: Choreographer::new(cards.len()),
            round: RoundState::new(cards.len()),
            settings,
            clock,
            random,
            roster,
            prizes,
            cards,
            ambient,
            auto_stop_at: None,
            merge_queue: VecDeque::new(),
            observers: Vec::new(),
            next_subscription: 0,
            sinks: Vec::new(),
            outbox: Vec::new(),
            now: 0,
            dirty: true,
            torn_down: false,
        };
        engine.boot();
        engine
    }

    fn boot(&mut self) {
        self.round.locked = true;
        let grid = self.grid();
        self.start_formation(grid, self.settings.timing.boot_ms);
        self.ambient.start(self.now);
        tracing::info!(
            participants = self.roster.len(),
            prizes = self.prizes.prizes().len(),
            "Draw engine booted"
        );
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn status(&self) -> DrawStatus {
        self.round.status
    }

    pub fn is_locked(&self) -> bool {
        self.round.locked
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn prizes(&self) -> &PrizeBook {
        &self.prizes
    }

    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn scene_rotation(&self) -> f64 {
        self.choreographer.scene_rotation()
    }

    /// Tags of transitions still in flight, oldest first.
    pub fn active_transitions(&self) -> Vec<Completion> {
        self.choreographer.active_tags()
    }

    pub fn queued_merges(&self) -> usize {
        self.merge_queue.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Whether any timer or animation could still fire.
    pub fn has_pending_work(&self) -> bool {
        self.ambient.is_running()
            || self.auto_stop_at.is_some()
            || self.choreographer.is_animating()
            || !self.merge_queue.is_empty()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    pub fn subscribe(&mut self, observer: impl DrawObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn attach_sink(&mut self, sink: impl FrameSink + 'static) {
        self.sinks.push(Box::new(sink));
        self.dirty = true;
    }

    /// Hand over the store writes collected since the last call.
    pub fn take_outbox(&mut self) -> Vec<StoreRequest> {
        std::mem::take(&mut self.outbox)
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Advance the show to `now` (milliseconds since the engine was built).
    ///
    /// Runs animation, completion handling, the auto-stop deadline, the
    /// ambient shuffle and queued merges, then renders if anything moved.
    /// Time never runs backwards; an earlier `now` is treated as a repeat.
    pub fn tick(&mut self, now: Millis) {
        if self.torn_down {
            return;
        }
        self.now = self.now.max(now);
        let now = self.now;

        let animating = self.choreographer.is_animating();
        let completed = self.choreographer.advance(now, self.cards.transforms_mut());
        for tag in completed {
            self.on_transition_complete(tag);
        }

        if self.auto_stop_at.is_some_and(|deadline| now >= deadline) {
            self.auto_stop_at = None;
            tracing::info!("Auto-stop deadline reached");
            if let Err(e) = self.stop() {
                tracing::warn!(error = %e, "Auto-stop failed");
            }
        }

        if self.ambient.poll(now) {
            let pool: Vec<ParticipantId> = self.roster.iter().map(|p| p.id()).collect();
            let changed = self.ambient.shuffle(
                &mut self.cards,
                &pool,
                &self.round.reservations,
                self.random.as_ref(),
            );
            self.dirty |= changed > 0;
        }

        self.drain_merge_queue();

        if animating || self.dirty {
            self.render();
            self.dirty = false;
        }
    }

    fn on_transition_complete(&mut self, tag: Completion) {
        tracing::debug!(?tag, at = self.now, "Transition complete");
        match tag {
            Completion::Formation => {
                self.round.reservations.reset(self.cards.len());
                self.cards.reset_faces();
                self.round.locked = false;
            }
            Completion::Reveal => {
                self.round.locked = false;
                self.set_status(DrawStatus::End);
            }
            Completion::Merge => {}
        }
        self.dirty = true;
    }

    fn render(&mut self) {
        if self.sinks.is_empty() {
            return;
        }
        let frame = Frame::capture(
            self.now,
            self.round.status,
            self.choreographer.scene_rotation(),
            &self.cards,
        );
        for sink in &mut self.sinks {
            sink.render(&frame);
        }
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release timers, in-flight animation, queued merges and subscribers.
    ///
    /// Safe to call more than once; later calls do nothing. Any command issued
    /// afterwards fails with `DrawError::ResourceTeardown`.
    pub fn teardown(&mut self) {
        if self.torn_down {
            tracing::debug!("Teardown requested again, nothing to release");
            return;
        }
        self.clear_timers();
        self.choreographer.cancel_all(self.cards.transforms_mut());
        self.choreographer.stop_spin();
        let dropped = self.merge_queue.len();
        self.merge_queue.clear();
        self.observers.clear();
        self.sinks.clear();
        self.round.locked = true;
        self.torn_down = true;
        tracing::info!(dropped_merges = dropped, "Draw engine torn down");
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    fn grid(&self) -> Formation {
        Formation::grid(self.settings.row_count, self.settings.card_size)
    }

    fn sphere(&self) -> Formation {
        Formation::sphere(self.settings.sphere_radius)
    }

    /// A duration between `nominal` and twice `nominal`.
    fn jittered(&self, nominal: Millis) -> Millis {
        nominal + (self.random.gen_unit() * nominal as f64) as Millis
    }

    /// Move every card into `formation` as one lock-holding transition.
    fn start_formation(&mut self, formation: Formation, nominal: Millis) {
        let targets = formation.targets(self.cards.len());
        let transition = self.choreographer.begin(Completion::Formation);
        for (index, target) in targets.into_iter().enumerate() {
            let position = Segment::new(
                target.position,
                self.jittered(nominal),
                Easing::ExponentialInOut,
            );
            let rotation = Segment::new(
                target.rotation,
                self.jittered(nominal),
                Easing::ExponentialInOut,
            );
            self.choreographer
                .animate_to(transition, index, target, position, rotation, self.now);
        }
        self.dirty = true;
    }

    /// Supersede everything in flight; cards snap to where they were headed.
    fn cancel_in_flight(&mut self) {
        let dropped = self.choreographer.cancel_all(self.cards.transforms_mut());
        if !dropped.is_empty() {
            tracing::debug!(?dropped, "Cancelled in-flight transitions");
        }
    }

    fn clear_timers(&mut self) {
        self.ambient.stop();
        self.auto_stop_at = None;
    }

    fn set_status(&mut self, to: DrawStatus) {
        let from = self.round.status;
        self.round.status = to;
        self.dirty = true;
        tracing::info!(%from, %to, "Draw status changed");
        self.emit(LifecycleEvent::StatusChanged {
            from,
            to,
            prize_id: self.prizes.current_id(),
        });
    }

    fn emit(&mut self, event: LifecycleEvent) {
        for (_, observer) in &mut self.observers {
            observer.on_event(&event);
        }
    }

    /// Report a guard failure to the operator and hand the error back.
    fn reject(&mut self, error: DrawError) -> DrawError {
        tracing::warn!(error = %error, status = %self.round.status, "Command rejected");
        self.emit(LifecycleEvent::warning(error.to_string()));
        error
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::entities::CardStyle;
    use std::sync::Mutex;

    #[test]
    fn boots_into_grid_with_lock_held() {
        let mut engine = engine(participants(6), vec![prize("Phone", 2)]);
        assert_eq!(engine.status(), DrawStatus::Init);
        assert!(engine.is_locked());
        assert_eq!(engine.cards().len(), 6);
        assert_eq!(engine.active_transitions(), vec![Completion::Formation]);

        settle(&mut engine);
        assert!(!engine.is_locked());
        let grid = Formation::grid(17, engine.settings().card_size).targets(6);
        assert_eq!(engine.cards().transforms(), grid.as_slice());
    }

    #[test]
    fn empty_roster_boots_and_unlocks() {
        let mut engine = engine(Vec::new(), Vec::new());
        engine.tick(0);
        assert!(!engine.is_locked());
        assert!(engine.cards().is_empty());
    }

    #[test]
    fn duplicate_stored_participants_get_no_card() {
        let mut people = participants(4);
        people.push(people[1].clone());
        let engine = engine(people, vec![prize("Phone", 1)]);
        assert_eq!(engine.roster().len(), 4);
        assert_eq!(engine.cards().len(), 4);
    }

    #[test]
    fn ambient_shuffle_runs_in_init() {
        let mut engine = engine(participants(20), vec![prize("Phone", 2)]);
        settle(&mut engine);
        engine.tick(engine.now() + 200);
        let shuffled = (0..20)
            .filter(|i| engine.cards().face(*i).unwrap().style == CardStyle::Shuffle)
            .count();
        assert!(shuffled > 0);
    }

    #[test]
    fn subscribers_receive_status_changes_until_unsubscribed() {
        let mut engine = engine(participants(3), vec![prize("Phone", 1)]);
        settle(&mut engine);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sub = engine.subscribe(tx);

        engine.enter().unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            LifecycleEvent::StatusChanged {
                from: DrawStatus::Init,
                to: DrawStatus::Ready,
                ..
            }
        ));

        assert!(engine.unsubscribe(sub));
        assert!(!engine.unsubscribe(sub));
        settle(&mut engine);
        engine.back_to_table().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<Frame>>>);

    impl FrameSink for RecordingSink {
        fn render(&mut self, frame: &Frame) {
            self.0.lock().unwrap().push(frame.clone());
        }
    }

    #[test]
    fn frames_stop_once_idle() {
        let mut engine = engine(participants(4), vec![prize("Phone", 1)]);
        // Stop the ambient shuffle so only animation produces frames
        engine.ambient.stop();
        let sink = RecordingSink::default();
        engine.attach_sink(sink.clone());

        engine.tick(16);
        engine.tick(32);
        settle(&mut engine);
        let rendered = sink.0.lock().unwrap().len();
        assert!(rendered >= 3);

        engine.tick(engine.now() + 16);
        engine.tick(engine.now() + 16);
        assert_eq!(sink.0.lock().unwrap().len(), rendered);
    }

    #[test]
    fn teardown_is_idempotent_and_clears_timers() {
        let mut engine = ready(participants(5), vec![prize("Phone", 2)]);
        engine.start().unwrap();
        assert!(engine.has_pending_work());

        engine.teardown();
        engine.teardown();

        assert!(engine.is_torn_down());
        assert!(!engine.has_pending_work());
        assert_eq!(engine.start(), Err(DrawError::ResourceTeardown));
        engine.tick(engine.now() + 10_000);
        assert_eq!(engine.status(), DrawStatus::Running);
    }

    #[test]
    fn time_never_runs_backwards() {
        let mut engine = engine(participants(2), Vec::new());
        engine.tick(500);
        engine.tick(100);
        assert_eq!(engine.now(), 500);
    }
}
