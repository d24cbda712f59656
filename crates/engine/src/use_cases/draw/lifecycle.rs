//! Lifecycle commands: enter, start, stop, continue, quit, back-to-table.

use std::f64::consts::TAU;
use std::sync::Arc;

use luckydraw_domain::{
    select_winners, winner_display_targets, DomainError, DrawStatus, PrizeId, SlotReservations,
    Vec3,
};
use luckydraw_shared::OperatorCommand;

use super::error::{CommandOutcome, DrawError, IgnoredReason};
use super::events::LifecycleEvent;
use super::round::{Completion, StoreRequest};
use super::DrawEngine;
use crate::entities::{CardFace, CardStyle, Channel, Easing, Millis, Segment};
use crate::infrastructure::ports::WinnerRecord;

/// How far cards burst outwards before regrouping on the table.
const BURST_SPREAD: f64 = 1800.0;
const BURST_DEPTH: f64 = 1400.0;

impl DrawEngine {
    /// Dispatch an operator command.
    pub fn handle(&mut self, command: OperatorCommand) -> Result<CommandOutcome, DrawError> {
        tracing::debug!(%command, status = %self.round.status, "Operator command");
        match command {
            OperatorCommand::Enter => self.enter(),
            OperatorCommand::Start => self.start(),
            OperatorCommand::Stop => self.stop(),
            OperatorCommand::Continue => self.continue_round(),
            OperatorCommand::Quit => self.quit(),
            OperatorCommand::BackToTable => self.back_to_table(),
            OperatorCommand::Advance => self.advance(),
            OperatorCommand::Escape => self.escape(),
            OperatorCommand::SelectPrize { prize_id } => {
                self.select_prize(PrizeId::from_uuid(prize_id))
            }
        }
    }

    /// Returns why the command must be dropped, if it must.
    fn guard(
        &self,
        action: &'static str,
        allowed: &[DrawStatus],
        respect_lock: bool,
    ) -> Result<Option<IgnoredReason>, DrawError> {
        if self.torn_down {
            return Err(DrawError::ResourceTeardown);
        }
        let reason = if !allowed.contains(&self.round.status) {
            Some(IgnoredReason::WrongState(self.round.status))
        } else if respect_lock && self.round.locked {
            Some(IgnoredReason::Locked)
        } else {
            None
        };
        if let Some(reason) = reason {
            tracing::debug!(action, ?reason, "Command ignored");
        }
        Ok(reason)
    }

    // =========================================================================
    // INIT -> READY
    // =========================================================================

    pub fn enter(&mut self) -> Result<CommandOutcome, DrawError> {
        if let Some(reason) = self.guard("enter", &[DrawStatus::Init], true)? {
            return Ok(CommandOutcome::Ignored(reason));
        }
        self.enter_sphere();
        Ok(CommandOutcome::Applied)
    }

    /// Shared by `enter` and `continue`: lock, fly into the sphere, spin slowly.
    fn enter_sphere(&mut self) {
        self.round.locked = true;
        self.clear_timers();
        self.cancel_in_flight();
        let sphere = self.sphere();
        self.start_formation(sphere, self.settings.timing.formation_ms);
        self.ambient.start(self.now);
        self.choreographer
            .spin(self.settings.timing.ready_spin, self.now);
        self.set_status(DrawStatus::Ready);
    }

    // =========================================================================
    // READY -> RUNNING
    // =========================================================================

    /// Draw this round's winners and start the fast spin.
    ///
    /// # Errors
    ///
    /// - `NoPrizeSelected` when the prize book is empty
    /// - `Exhausted` when the current prize has no slots left
    /// - `Capacity` when fewer eligible people than the round needs
    ///
    /// Each is also reported as a warning notice. Nothing changes on error.
    pub fn start(&mut self) -> Result<CommandOutcome, DrawError> {
        if let Some(reason) = self.guard("start", &[DrawStatus::Ready], true)? {
            return Ok(CommandOutcome::Ignored(reason));
        }
        let Some(prize) = self.prizes.current().cloned() else {
            return Err(self.reject(DrawError::NoPrizeSelected));
        };
        let quota = prize.round_quota(self.settings.max_per_draw) as usize;
        if prize.is_exhausted() || quota == 0 {
            return Err(self.reject(DrawError::exhausted(prize.name().as_str())));
        }

        let mut pool = self.roster.eligible_for(&prize);
        let mut reservations = SlotReservations::new(self.cards.len());
        let random = Arc::clone(&self.random);
        let mut pick = |len: usize| random.gen_index(len);
        let winners = match select_winners(&mut pool, quota, &mut reservations, &mut pick) {
            Ok(winners) => winners,
            Err(DomainError::Capacity {
                available,
                required,
            }) => return Err(self.reject(DrawError::capacity(available, required))),
            Err(other) => return Err(self.reject(other.into())),
        };

        tracing::info!(
            prize = %prize.name(),
            drawn = winners.len(),
            remaining_pool = pool.len(),
            "Draw started"
        );
        for winner in &winners {
            self.cards.reset_face(winner.slot);
        }
        self.round.prize_id = Some(prize.id());
        self.round.pool = pool;
        self.round.winners = winners;
        self.round.reservations = reservations;

        self.choreographer
            .spin(self.settings.timing.running_spin, self.now);
        self.auto_stop_at = self
            .settings
            .auto_stop
            .map(|after| self.now.saturating_add(after.as_millis() as Millis));
        self.set_status(DrawStatus::Running);
        Ok(CommandOutcome::Applied)
    }

    // =========================================================================
    // RUNNING -> END
    // =========================================================================

    /// Fly the winners onto the podium. The status flips to END when they land.
    pub fn stop(&mut self) -> Result<CommandOutcome, DrawError> {
        if let Some(reason) = self.guard("stop", &[DrawStatus::Running], true)? {
            return Ok(CommandOutcome::Ignored(reason));
        }
        self.round.locked = true;
        self.clear_timers();
        self.choreographer.stop_spin();
        self.cancel_in_flight();

        let timing = self.settings.timing;
        let podium = winner_display_targets(
            self.round.winners.len(),
            self.settings.card_size,
            self.settings.viewport,
        );
        let reveal = self.choreographer.begin(Completion::Reveal);
        for (winner, place) in self.round.winners.iter().zip(podium) {
            self.cards.set_face(
                winner.slot,
                CardFace {
                    shown: winner.participant_id,
                    style: CardStyle::Lucky { scale: place.scale },
                },
            );
            self.choreographer.animate_to(
                reveal,
                winner.slot,
                place.transform,
                Segment::new(
                    place.transform.position,
                    timing.reveal_position_ms,
                    Easing::ThreePhase,
                ),
                Segment::new(
                    place.transform.rotation,
                    timing.reveal_rotation_ms,
                    Easing::ThreePhase,
                ),
                self.now,
            );
        }
        self.dirty = true;
        tracing::info!(winners = self.round.winners.len(), "Revealing winners");
        Ok(CommandOutcome::Applied)
    }

    // =========================================================================
    // END -> READY
    // =========================================================================

    /// Commit the round's winners to the prize and participants, then return
    /// to the sphere for the next round.
    pub fn continue_round(&mut self) -> Result<CommandOutcome, DrawError> {
        if let Some(reason) = self.guard("continue", &[DrawStatus::End], true)? {
            return Ok(CommandOutcome::Ignored(reason));
        }
        let Some(prize_id) = self.round.prize_id else {
            return Err(self.reject(DrawError::NoPrizeSelected));
        };
        let drawn = self.round.winners.len() as u32;

        let committed = match self.prizes.current_mut() {
            Some(prize) if prize.id() == prize_id => prize
                .commit_round(drawn)
                .map(|commit| (commit, prize.clone())),
            _ => Err(DomainError::not_found("Prize", prize_id.to_string())),
        };
        let (commit, prize) = match committed {
            Ok(done) => done,
            Err(e) => return Err(self.reject(e.into())),
        };

        let won_at = self.clock.now();
        let mut records = Vec::with_capacity(self.round.winners.len());
        for winner in &self.round.winners {
            let Some(participant) = self.roster.get_mut(winner.participant_id) else {
                tracing::warn!(participant_id = %winner.participant_id, "Winner left the roster");
                continue;
            };
            participant.record_award(prize_id, prize.name().clone(), won_at);
            records.push(WinnerRecord {
                participant_id: winner.participant_id,
                prize_id,
                prize_name: prize.name().clone(),
                won_at,
            });
        }
        tracing::info!(
            prize = %prize.name(),
            drawn = commit.drawn,
            used = commit.used,
            exhausted = commit.exhausted,
            "Round committed"
        );
        self.outbox.push(StoreRequest::RecordWinners(records));
        self.outbox.push(StoreRequest::SavePrize(prize.clone()));

        if commit.exhausted {
            match self.prizes.advance_past_exhausted() {
                Some(next) => {
                    let name = self
                        .prizes
                        .get(next)
                        .map(|p| p.name().to_string())
                        .unwrap_or_default();
                    self.emit(LifecycleEvent::info(format!(
                        "{} is all drawn, next up: {name}",
                        prize.name()
                    )));
                }
                None => self.emit(LifecycleEvent::info("Every prize has been drawn")),
            }
        }

        self.round.discard();
        self.enter_sphere();
        Ok(CommandOutcome::Applied)
    }

    // =========================================================================
    // RUNNING | END -> INIT
    // =========================================================================

    /// Abandon the round and go back to the table.
    ///
    /// Allowed during the winner reveal; the reveal is cancelled. Prize usage
    /// and win records are left alone.
    pub fn quit(&mut self) -> Result<CommandOutcome, DrawError> {
        if let Some(reason) =
            self.guard("quit", &[DrawStatus::Running, DrawStatus::End], false)?
        {
            return Ok(CommandOutcome::Ignored(reason));
        }
        self.round.locked = true;
        self.clear_timers();
        self.choreographer.stop_spin();
        self.cancel_in_flight();
        self.round.discard();
        let grid = self.grid();
        self.start_formation(grid, self.settings.timing.formation_ms);
        self.ambient.start(self.now);
        self.set_status(DrawStatus::Init);
        Ok(CommandOutcome::Applied)
    }

    // =========================================================================
    // READY -> INIT
    // =========================================================================

    /// Burst the sphere outwards, then regroup on the table in staggered waves.
    pub fn back_to_table(&mut self) -> Result<CommandOutcome, DrawError> {
        if let Some(reason) = self.guard("back_to_table", &[DrawStatus::Ready], true)? {
            return Ok(CommandOutcome::Ignored(reason));
        }
        self.round.locked = true;
        self.clear_timers();
        self.cancel_in_flight();
        let timing = self.settings.timing;
        self.choreographer.settle(self.now, timing.settle_ms);

        let targets = self.grid().targets(self.cards.len());
        let transition = self.choreographer.begin(Completion::Formation);
        for (index, target) in targets.into_iter().enumerate() {
            let current = self.cards.transform(index).unwrap_or_default();
            let outward = current.position.normalized();
            let burst = current.position
                + Vec3::new(
                    outward.x * BURST_SPREAD,
                    outward.y * BURST_SPREAD,
                    outward.z * BURST_DEPTH,
                );
            let spin = Vec3::new(
                self.random.gen_unit() * TAU,
                self.random.gen_unit() * TAU,
                self.random.gen_unit() * TAU,
            );
            let group = self.random.gen_index(timing.stagger_groups.max(1)) as Millis;
            let delay = group * timing.stagger_step_ms;

            let out = Segment::new(burst, timing.burst_ms, Easing::ThreePhase).delayed(delay);
            self.choreographer
                .animate(transition, index, Channel::Position, out, self.now);
            self.choreographer.animate(
                transition,
                index,
                Channel::Rotation,
                Segment { to: spin, ..out },
                self.now,
            );
            let home = Segment::new(target.position, timing.converge_ms, Easing::ThreePhase);
            self.choreographer
                .animate(transition, index, Channel::Position, home, self.now);
            self.choreographer.animate(
                transition,
                index,
                Channel::Rotation,
                Segment {
                    to: target.rotation,
                    ..home
                },
                self.now,
            );
        }
        self.dirty = true;
        self.ambient.start(self.now);
        self.set_status(DrawStatus::Init);
        Ok(CommandOutcome::Applied)
    }

    // =========================================================================
    // Single-key operation
    // =========================================================================

    /// The one-button flow: whatever comes next in the current status.
    pub fn advance(&mut self) -> Result<CommandOutcome, DrawError> {
        match self.round.status {
            DrawStatus::Init => self.enter(),
            DrawStatus::Ready => self.start(),
            DrawStatus::Running => self.stop(),
            DrawStatus::End => self.continue_round(),
        }
    }

    /// Bail out of a running draw.
    pub fn escape(&mut self) -> Result<CommandOutcome, DrawError> {
        if let Some(reason) = self.guard("escape", &[DrawStatus::Running], false)? {
            return Ok(CommandOutcome::Ignored(reason));
        }
        self.quit()
    }

    /// Choose the prize for upcoming rounds. Only between rounds.
    pub fn select_prize(&mut self, prize_id: PrizeId) -> Result<CommandOutcome, DrawError> {
        if let Some(reason) =
            self.guard("select_prize", &[DrawStatus::Init, DrawStatus::Ready], false)?
        {
            return Ok(CommandOutcome::Ignored(reason));
        }
        let name = match self.prizes.select(prize_id) {
            Ok(prize) => prize.name().to_string(),
            Err(e) => return Err(self.reject(e.into())),
        };
        tracing::info!(prize = %name, "Prize selected");
        self.emit(LifecycleEvent::info(format!("Now drawing: {name}")));
        Ok(CommandOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::super::testing::*;
    use super::*;
    use crate::infrastructure::settings::EngineSettings;
    use luckydraw_domain::{Formation, Prize, PODIUM_DEPTH};

    #[test]
    fn enter_is_dropped_while_booting() {
        let mut engine = engine(participants(5), vec![prize("Phone", 2)]);
        assert_eq!(
            engine.enter().unwrap(),
            CommandOutcome::Ignored(IgnoredReason::Locked)
        );
        assert_eq!(engine.status(), DrawStatus::Init);
    }

    #[test]
    fn enter_spins_into_the_sphere() {
        let mut engine = engine(participants(8), vec![prize("Phone", 2)]);
        settle(&mut engine);
        assert!(engine.enter().unwrap().is_applied());
        assert_eq!(engine.status(), DrawStatus::Ready);
        assert!(engine.is_locked());

        settle(&mut engine);
        assert!(!engine.is_locked());
        let sphere = Formation::sphere(engine.settings().sphere_radius).targets(8);
        assert_eq!(engine.cards().transforms(), sphere.as_slice());
        assert!(engine.scene_rotation() > 0.0);
    }

    #[test]
    fn commands_in_wrong_state_are_ignored() {
        let mut engine = engine(participants(5), vec![prize("Phone", 2)]);
        settle(&mut engine);
        assert_eq!(
            engine.stop().unwrap(),
            CommandOutcome::Ignored(IgnoredReason::WrongState(DrawStatus::Init))
        );
        assert_eq!(
            engine.continue_round().unwrap(),
            CommandOutcome::Ignored(IgnoredReason::WrongState(DrawStatus::Init))
        );
        assert_eq!(
            engine.escape().unwrap(),
            CommandOutcome::Ignored(IgnoredReason::WrongState(DrawStatus::Init))
        );
    }

    #[test]
    fn start_reserves_distinct_slots() {
        let mut engine = ready(participants(12), vec![prize("Phone", 4)]);
        engine.start().unwrap();

        assert_eq!(engine.status(), DrawStatus::Running);
        assert!(!engine.is_locked());
        let winners = engine.round().winners();
        assert_eq!(winners.len(), 4);
        let slots: HashSet<_> = winners.iter().map(|w| w.slot).collect();
        assert_eq!(slots.len(), 4);
        assert!(slots.iter().all(|s| *s < 12));
        assert_eq!(engine.round().pool().len(), 8);
    }

    #[test]
    fn start_caps_round_by_max_per_draw() {
        let settings = EngineSettings {
            max_per_draw: 3,
            ..EngineSettings::default()
        };
        let mut engine = engine_with(settings, participants(10), vec![prize("Pen", 8)]);
        settle(&mut engine);
        engine.enter().unwrap();
        settle(&mut engine);
        engine.start().unwrap();
        assert_eq!(engine.round().winners().len(), 3);
    }

    fn partitioned(name: &str, count: u32, parts: &[u32]) -> Prize {
        prize(name, count).with_partitions(parts).unwrap()
    }

    fn draw_round(engine: &mut DrawEngine) -> usize {
        engine.start().unwrap();
        let drawn = engine.round().winners().len();
        engine.stop().unwrap();
        settle(engine);
        engine.continue_round().unwrap();
        settle(engine);
        drawn
    }

    #[test]
    fn partitions_size_each_round_in_order() {
        let settings = EngineSettings {
            max_per_draw: 3,
            ..EngineSettings::default()
        };
        let trip = partitioned("Trip", 6, &[2, 4]);
        let mut engine = engine_with(settings, participants(10), vec![trip]);
        settle(&mut engine);
        engine.enter().unwrap();
        settle(&mut engine);

        assert_eq!(draw_round(&mut engine), 2);
        let prize = &engine.prizes().prizes()[0];
        assert_eq!(prize.used(), 2);
        assert_eq!(prize.partitions()[0].used, 2);
        assert_eq!(prize.partitions()[1].used, 0);
        assert!(!prize.is_exhausted());

        // Second partition still capped by max_per_draw
        assert_eq!(draw_round(&mut engine), 3);
        assert_eq!(draw_round(&mut engine), 1);
        let prize = &engine.prizes().prizes()[0];
        assert_eq!(prize.partitions()[1].used, 4);
        assert_eq!(prize.used(), 6);
        assert!(prize.is_exhausted());
    }

    #[test]
    fn capacity_is_checked_against_the_active_partition() {
        let mut engine = ready(participants(2), vec![partitioned("Trip", 5, &[3, 2])]);
        assert_eq!(
            engine.start(),
            Err(DrawError::Capacity {
                available: 2,
                required: 3
            })
        );
        assert_eq!(engine.status(), DrawStatus::Ready);
        assert_eq!(engine.prizes().prizes()[0].partitions()[0].used, 0);

        // Two people are enough once the partition only needs two
        let mut engine = ready(participants(2), vec![partitioned("Trip", 5, &[2, 3])]);
        assert_eq!(draw_round(&mut engine), 2);
        assert_eq!(engine.prizes().prizes()[0].partitions()[0].used, 2);
    }

    #[test]
    fn start_without_prize_is_rejected_with_notice() {
        let mut engine = ready(participants(3), Vec::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        engine.subscribe(tx);

        assert_eq!(engine.start(), Err(DrawError::NoPrizeSelected));
        assert_eq!(engine.status(), DrawStatus::Ready);
        assert!(matches!(
            rx.try_recv().unwrap(),
            LifecycleEvent::Notice { .. }
        ));
    }

    #[test]
    fn start_on_exhausted_prize_is_rejected() {
        let mut used_up = prize("Car", 1);
        used_up.commit_round(1).unwrap();
        let mut engine = ready(participants(3), vec![used_up]);
        // An all-exhausted book still points at nothing
        assert_eq!(engine.start(), Err(DrawError::NoPrizeSelected));

        let id = engine.prizes().prizes()[0].id();
        engine.select_prize(id).unwrap();
        assert!(matches!(engine.start(), Err(DrawError::Exhausted { .. })));
        assert_eq!(engine.status(), DrawStatus::Ready);
    }

    #[test]
    fn stop_reveals_then_ends() {
        let mut engine = ready(participants(6), vec![prize("Phone", 2)]);
        engine.start().unwrap();
        engine.tick(engine.now() + 500);
        engine.stop().unwrap();

        assert!(engine.is_locked());
        assert_eq!(engine.status(), DrawStatus::Running);
        assert_eq!(engine.scene_rotation(), 0.0);
        assert_eq!(engine.active_transitions(), vec![Completion::Reveal]);
        // Dropped while the reveal holds the lock
        assert_eq!(
            engine.stop().unwrap(),
            CommandOutcome::Ignored(IgnoredReason::Locked)
        );

        settle(&mut engine);
        assert_eq!(engine.status(), DrawStatus::End);
        assert!(!engine.is_locked());
        for winner in engine.round().winners() {
            let face = engine.cards().face(winner.slot).unwrap();
            assert_eq!(face.shown, winner.participant_id);
            assert!(matches!(face.style, CardStyle::Lucky { .. }));
            let transform = engine.cards().transform(winner.slot).unwrap();
            assert_eq!(transform.position.z, PODIUM_DEPTH);
        }
    }

    #[test]
    fn continue_commits_and_returns_to_ready() {
        let mut engine = ready(participants(6), vec![prize("Phone", 3)]);
        engine.start().unwrap();
        engine.stop().unwrap();
        settle(&mut engine);
        let winners: Vec<_> = engine
            .round()
            .winners()
            .iter()
            .map(|w| w.participant_id)
            .collect();

        engine.continue_round().unwrap();

        assert_eq!(engine.status(), DrawStatus::Ready);
        let prize = &engine.prizes().prizes()[0];
        assert_eq!(prize.used(), 3);
        assert!(prize.is_exhausted());
        for id in &winners {
            let participant = engine.roster().get(*id).unwrap();
            assert!(participant.is_win());
            assert!(participant.has_prize(prize.id()));
        }
        let outbox = engine.take_outbox();
        assert!(matches!(&outbox[0], StoreRequest::RecordWinners(r) if r.len() == 3));
        assert!(matches!(&outbox[1], StoreRequest::SavePrize(p) if p.used() == 3));

        // Winner slots are released once the cards are back in the sphere
        assert!(!engine.round().reservations().is_empty());
        settle(&mut engine);
        assert!(engine.round().reservations().is_empty());
    }

    #[test]
    fn exhausting_a_prize_moves_to_the_next() {
        let first = prize("First", 1);
        let second = prize("Second", 1);
        let second_id = second.id();
        let mut engine = ready(participants(4), vec![first, second]);
        engine.start().unwrap();
        engine.stop().unwrap();
        settle(&mut engine);
        engine.continue_round().unwrap();
        assert_eq!(engine.prizes().current_id(), Some(second_id));
    }

    #[test]
    fn previous_winners_leave_the_pool() {
        let mut engine = ready(participants(4), vec![prize("Mug", 4)]);
        engine.start().unwrap();
        engine.stop().unwrap();
        settle(&mut engine);
        engine.continue_round().unwrap();
        settle(&mut engine);
        assert_eq!(engine.roster().not_won().len(), 0);

        // The second prize only draws from people who have not won yet
        let mut engine = ready(participants(2), vec![prize("Mug", 1), prize("Hat", 1)]);
        engine.start().unwrap();
        engine.stop().unwrap();
        settle(&mut engine);
        let first_winner = engine.round().winners()[0].participant_id;
        engine.continue_round().unwrap();
        settle(&mut engine);
        engine.start().unwrap();
        assert_ne!(engine.round().winners()[0].participant_id, first_winner);
    }

    #[test]
    fn quit_cancels_reveal_without_committing() {
        let mut engine = ready(participants(6), vec![prize("Phone", 2)]);
        engine.start().unwrap();
        engine.stop().unwrap();
        engine.tick(engine.now() + 100);

        assert!(engine.quit().unwrap().is_applied());
        assert_eq!(engine.status(), DrawStatus::Init);
        assert_eq!(engine.active_transitions(), vec![Completion::Formation]);
        assert!(engine.round().winners().is_empty());

        settle(&mut engine);
        assert_eq!(engine.status(), DrawStatus::Init);
        assert!(!engine.is_locked());
        assert_eq!(engine.prizes().prizes()[0].used(), 0);
        assert!(engine.roster().iter().all(|p| !p.is_win()));
        assert!(engine.take_outbox().is_empty());
        let grid = Formation::grid(17, engine.settings().card_size).targets(6);
        assert_eq!(engine.cards().transforms(), grid.as_slice());
    }

    #[test]
    fn escape_quits_only_while_running() {
        let mut engine = ready(participants(6), vec![prize("Phone", 2)]);
        assert_eq!(
            engine.escape().unwrap(),
            CommandOutcome::Ignored(IgnoredReason::WrongState(DrawStatus::Ready))
        );
        engine.start().unwrap();
        engine.escape().unwrap();
        assert_eq!(engine.status(), DrawStatus::Init);
    }

    #[test]
    fn back_to_table_bursts_then_lands_on_grid() {
        let mut engine = ready(participants(10), vec![prize("Phone", 2)]);
        let before = engine.cards().transforms().to_vec();
        engine.back_to_table().unwrap();
        assert_eq!(engine.status(), DrawStatus::Init);
        assert!(engine.is_locked());

        // Mid-burst every card is further from the centre than it started
        engine.tick(engine.now() + 160 + 500);
        for (index, start) in before.iter().enumerate() {
            let now = engine.cards().transform(index).unwrap();
            assert!(now.position.length() > start.position.length());
        }

        settle(&mut engine);
        assert!(!engine.is_locked());
        assert_eq!(engine.scene_rotation(), 0.0);
        let grid = Formation::grid(17, engine.settings().card_size).targets(10);
        assert_eq!(engine.cards().transforms(), grid.as_slice());
    }

    #[test]
    fn advance_walks_the_whole_round() {
        let mut engine = engine(participants(5), vec![prize("Phone", 1)]);
        settle(&mut engine);
        let mut seen = vec![engine.status()];
        for _ in 0..4 {
            engine.advance().unwrap();
            settle(&mut engine);
            seen.push(engine.status());
        }
        assert_eq!(
            seen,
            vec![
                DrawStatus::Init,
                DrawStatus::Ready,
                DrawStatus::Running,
                DrawStatus::End,
                DrawStatus::Ready,
            ]
        );
    }

    #[test]
    fn auto_stop_fires_after_deadline() {
        let settings = EngineSettings {
            auto_stop: Some(Duration::from_secs(3)),
            ..EngineSettings::default()
        };
        let mut engine = engine_with(settings, participants(5), vec![prize("Phone", 1)]);
        settle(&mut engine);
        engine.enter().unwrap();
        settle(&mut engine);
        engine.start().unwrap();

        engine.tick(engine.now() + 2_999);
        assert!(engine.active_transitions().is_empty());
        engine.tick(engine.now() + 1);
        assert_eq!(engine.active_transitions(), vec![Completion::Reveal]);
        settle(&mut engine);
        assert_eq!(engine.status(), DrawStatus::End);
    }

    #[test]
    fn select_prize_only_between_rounds() {
        let other = prize("Other", 1);
        let other_id = other.id();
        let mut engine = ready(participants(4), vec![prize("First", 1), other]);
        engine.select_prize(other_id).unwrap();
        assert_eq!(engine.prizes().current_id(), Some(other_id));

        assert!(matches!(
            engine.select_prize(PrizeId::new()),
            Err(DrawError::Domain(DomainError::NotFound { .. }))
        ));

        engine.start().unwrap();
        assert_eq!(
            engine.handle(OperatorCommand::SelectPrize {
                prize_id: uuid::Uuid::new_v4()
            })
            .unwrap(),
            CommandOutcome::Ignored(IgnoredReason::WrongState(DrawStatus::Running))
        );
    }
}
