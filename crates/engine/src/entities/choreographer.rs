//! Choreographer - per-card transform interpolation with completion tracking
//!
//! The choreographer owns only *targets and timing*. It never touches a scene
//! graph: each `advance` writes interpolated values into the transform slice
//! it is handed, and renderers read those transforms afterwards.
//!
//! Work is grouped into transitions. A transition is opened with a tag,
//! segments are attached to it, and the tag is returned from `advance` exactly
//! once, on the tick where its last segment finishes.
//!
//! Segments on the same card channel run back to back, so a two-phase move
//! (burst out, then converge) is just two `animate` calls.

use std::collections::VecDeque;

use luckydraw_domain::{Transform, Vec3};

use super::easing::Easing;

/// Milliseconds on the engine timeline.
pub type Millis = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Position,
    Rotation,
}

/// One interpolation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub to: Vec3,
    /// Wait after the previous segment on this channel (or after now)
    pub delay: Millis,
    pub duration: Millis,
    pub easing: Easing,
}

impl Segment {
    pub fn new(to: Vec3, duration: Millis, easing: Easing) -> Self {
        Self {
            to,
            delay: 0,
            duration,
            easing,
        }
    }

    pub fn delayed(mut self, delay: Millis) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    transition: TransitionId,
    start: Millis,
    duration: Millis,
    to: Vec3,
    easing: Easing,
    /// Captured when the segment first becomes active
    from: Option<Vec3>,
}

impl Scheduled {
    fn end(&self) -> Millis {
        self.start.saturating_add(self.duration)
    }
}

#[derive(Debug, Clone, Default)]
struct CardTracks {
    position: VecDeque<Scheduled>,
    rotation: VecDeque<Scheduled>,
}

impl CardTracks {
    fn channel_mut(&mut self, channel: Channel) -> &mut VecDeque<Scheduled> {
        match channel {
            Channel::Position => &mut self.position,
            Channel::Rotation => &mut self.rotation,
        }
    }

    fn is_empty(&self) -> bool {
        self.position.is_empty() && self.rotation.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TransitionId,
    tag: T,
    remaining: usize,
}

/// Rotation of the whole card ensemble around the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SceneMode {
    Still,
    Spin {
        rate: f64,
        since: Millis,
        base: f64,
    },
    Settle {
        from: f64,
        start: Millis,
        duration: Millis,
    },
}

pub struct Choreographer<T> {
    tracks: Vec<CardTracks>,
    transitions: Vec<Pending<T>>,
    next_id: u64,
    scene_rotation: f64,
    scene_mode: SceneMode,
}

impl<T: Copy> Choreographer<T> {
    pub fn new(card_count: usize) -> Self {
        Self {
            tracks: vec![CardTracks::default(); card_count],
            transitions: Vec::new(),
            next_id: 0,
            scene_rotation: 0.0,
            scene_mode: SceneMode::Still,
        }
    }

    pub fn card_count(&self) -> usize {
        self.tracks.len()
    }

    /// Match the number of cards. Removed cards lose their tracks.
    pub fn resize(&mut self, card_count: usize) {
        self.tracks.resize_with(card_count, CardTracks::default);
    }

    /// Keep tracks attached to their cards after the registry swaps two slots.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a < self.tracks.len() && b < self.tracks.len() {
            self.tracks.swap(a, b);
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Open a transition. Its tag is reported once all attached segments end.
    pub fn begin(&mut self, tag: T) -> TransitionId {
        let id = TransitionId(self.next_id);
        self.next_id += 1;
        self.transitions.push(Pending {
            id,
            tag,
            remaining: 0,
        });
        id
    }

    /// Queue a segment on one card channel, after anything already queued.
    ///
    /// Ignored for unknown transitions or out-of-range cards.
    pub fn animate(
        &mut self,
        transition: TransitionId,
        index: usize,
        channel: Channel,
        segment: Segment,
        now: Millis,
    ) {
        let Some(pending) = self.transitions.iter_mut().find(|p| p.id == transition) else {
            return;
        };
        let Some(tracks) = self.tracks.get_mut(index) else {
            return;
        };
        let queue = tracks.channel_mut(channel);
        let after = queue.back().map_or(now, |last| last.end().max(now));
        queue.push_back(Scheduled {
            transition,
            start: after.saturating_add(segment.delay),
            duration: segment.duration,
            to: segment.to,
            easing: segment.easing,
            from: None,
        });
        pending.remaining += 1;
    }

    /// Convenience: move a card to `target` on both channels.
    pub fn animate_to(
        &mut self,
        transition: TransitionId,
        index: usize,
        target: Transform,
        position: Segment,
        rotation: Segment,
        now: Millis,
    ) {
        self.animate(
            transition,
            index,
            Channel::Position,
            Segment {
                to: target.position,
                ..position
            },
            now,
        );
        self.animate(
            transition,
            index,
            Channel::Rotation,
            Segment {
                to: target.rotation,
                ..rotation
            },
            now,
        );
    }

    /// Drop every in-flight transition, snapping cards to their final targets.
    ///
    /// Returns the tags that will now never complete.
    pub fn cancel_all(&mut self, transforms: &mut [Transform]) -> Vec<T> {
        for (index, tracks) in self.tracks.iter_mut().enumerate() {
            if let Some(transform) = transforms.get_mut(index) {
                if let Some(last) = tracks.position.back() {
                    transform.position = last.to;
                }
                if let Some(last) = tracks.rotation.back() {
                    transform.rotation = last.to;
                }
            }
            tracks.position.clear();
            tracks.rotation.clear();
        }
        self.transitions.drain(..).map(|p| p.tag).collect()
    }

    pub fn active_tags(&self) -> Vec<T> {
        self.transitions.iter().map(|p| p.tag).collect()
    }

    pub fn has_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }

    // =========================================================================
    // Scene motion
    // =========================================================================

    pub fn scene_rotation(&self) -> f64 {
        self.scene_rotation
    }

    /// Spin continuously at `rate` radians per second, starting from zero.
    pub fn spin(&mut self, rate: f64, now: Millis) {
        self.scene_rotation = 0.0;
        self.scene_mode = SceneMode::Spin {
            rate,
            since: now,
            base: 0.0,
        };
    }

    /// Stop spinning and face front immediately.
    pub fn stop_spin(&mut self) {
        self.scene_rotation = 0.0;
        self.scene_mode = SceneMode::Still;
    }

    /// Ease the scene rotation back to zero.
    pub fn settle(&mut self, now: Millis, duration: Millis) {
        self.scene_mode = SceneMode::Settle {
            from: self.scene_rotation,
            start: now,
            duration,
        };
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Whether another frame would change anything.
    pub fn is_animating(&self) -> bool {
        !self.transitions.is_empty()
            || self.tracks.iter().any(|t| !t.is_empty())
            || !matches!(self.scene_mode, SceneMode::Still)
    }

    /// Advance everything to `now`, writing card transforms in place.
    ///
    /// Returns the tags of transitions that finished on this tick, in the
    /// order they were opened.
    pub fn advance(&mut self, now: Millis, transforms: &mut [Transform]) -> Vec<T> {
        let mut finished: Vec<TransitionId> = Vec::new();

        for (index, tracks) in self.tracks.iter_mut().enumerate() {
            let Some(transform) = transforms.get_mut(index) else {
                continue;
            };
            advance_queue(&mut tracks.position, &mut transform.position, now, &mut finished);
            advance_queue(&mut tracks.rotation, &mut transform.rotation, now, &mut finished);
        }

        for id in finished {
            if let Some(pending) = self.transitions.iter_mut().find(|p| p.id == id) {
                pending.remaining = pending.remaining.saturating_sub(1);
            }
        }

        self.advance_scene(now);

        let mut completed = Vec::new();
        self.transitions.retain(|p| {
            if p.remaining == 0 {
                completed.push(p.tag);
                false
            } else {
                true
            }
        });
        completed
    }

    fn advance_scene(&mut self, now: Millis) {
        match self.scene_mode {
            SceneMode::Still => {}
            SceneMode::Spin { rate, since, base } => {
                let elapsed = now.saturating_sub(since) as f64 / 1000.0;
                self.scene_rotation = base + rate * elapsed;
            }
            SceneMode::Settle {
                from,
                start,
                duration,
            } => {
                let progress = progress(now, start, duration);
                let eased = Easing::ExponentialInOut.apply(progress);
                self.scene_rotation = from * (1.0 - eased);
                if progress >= 1.0 {
                    self.scene_rotation = 0.0;
                    self.scene_mode = SceneMode::Still;
                }
            }
        }
    }
}

fn progress(now: Millis, start: Millis, duration: Millis) -> f64 {
    if duration == 0 {
        return 1.0;
    }
    (now.saturating_sub(start) as f64 / duration as f64).min(1.0)
}

fn advance_queue(
    queue: &mut VecDeque<Scheduled>,
    value: &mut Vec3,
    now: Millis,
    finished: &mut Vec<TransitionId>,
) {
    while let Some(front) = queue.front_mut() {
        if now < front.start {
            break;
        }
        let from = *front.from.get_or_insert(*value);
        let progress = progress(now, front.start, front.duration);
        *value = from.lerp(front.to, front.easing.apply(progress));
        if progress < 1.0 {
            break;
        }
        *value = front.to;
        finished.push(front.transition);
        queue.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        A,
        B,
    }

    fn linear(x: f64, duration: Millis) -> Segment {
        Segment::new(Vec3::new(x, 0.0, 0.0), duration, Easing::Linear)
    }

    #[test]
    fn interpolates_and_completes_once() {
        let mut c = Choreographer::new(1);
        let mut transforms = vec![Transform::default()];
        let id = c.begin(Tag::A);
        c.animate(id, 0, Channel::Position, linear(100.0, 100), 0);

        assert!(c.advance(50, &mut transforms).is_empty());
        assert!((transforms[0].position.x - 50.0).abs() < 1e-9);

        assert_eq!(c.advance(100, &mut transforms), vec![Tag::A]);
        assert_eq!(transforms[0].position.x, 100.0);

        assert!(c.advance(200, &mut transforms).is_empty());
        assert!(!c.is_animating());
    }

    #[test]
    fn completion_waits_for_slowest_card() {
        let mut c = Choreographer::new(2);
        let mut transforms = vec![Transform::default(); 2];
        let id = c.begin(Tag::A);
        c.animate(id, 0, Channel::Position, linear(10.0, 100), 0);
        c.animate(id, 1, Channel::Rotation, linear(1.0, 300), 0);

        assert!(c.advance(150, &mut transforms).is_empty());
        assert_eq!(transforms[0].position.x, 10.0);
        assert_eq!(c.advance(300, &mut transforms), vec![Tag::A]);
    }

    #[test]
    fn empty_transition_completes_on_next_tick() {
        let mut c: Choreographer<Tag> = Choreographer::new(0);
        c.begin(Tag::B);
        assert_eq!(c.advance(0, &mut []), vec![Tag::B]);
    }

    #[test]
    fn chained_segments_run_back_to_back() {
        let mut c = Choreographer::new(1);
        let mut transforms = vec![Transform::default()];
        let id = c.begin(Tag::A);
        c.animate(id, 0, Channel::Position, linear(100.0, 100), 0);
        c.animate(id, 0, Channel::Position, linear(0.0, 100).delayed(50), 0);

        c.advance(100, &mut transforms);
        assert_eq!(transforms[0].position.x, 100.0);
        // Still in the gap before the second segment
        c.advance(140, &mut transforms);
        assert_eq!(transforms[0].position.x, 100.0);
        c.advance(200, &mut transforms);
        assert!((transforms[0].position.x - 50.0).abs() < 1e-9);
        assert_eq!(c.advance(250, &mut transforms), vec![Tag::A]);
        assert_eq!(transforms[0].position.x, 0.0);
    }

    #[test]
    fn from_is_captured_when_segment_starts() {
        let mut c = Choreographer::new(1);
        let mut transforms = vec![Transform::default()];
        let id = c.begin(Tag::A);
        c.animate(id, 0, Channel::Position, linear(100.0, 100).delayed(100), 0);

        // Moved externally before the segment starts
        transforms[0].position.x = 50.0;
        c.advance(150, &mut transforms);
        assert!((transforms[0].position.x - 75.0).abs() < 1e-9);
    }

    #[test]
    fn cancel_snaps_to_final_target() {
        let mut c = Choreographer::new(1);
        let mut transforms = vec![Transform::default()];
        let id = c.begin(Tag::A);
        c.animate(id, 0, Channel::Position, linear(100.0, 100), 0);
        c.animate(id, 0, Channel::Position, linear(7.0, 100), 0);
        c.advance(30, &mut transforms);

        assert_eq!(c.cancel_all(&mut transforms), vec![Tag::A]);
        assert_eq!(transforms[0].position.x, 7.0);
        assert!(!c.has_transitions());
        assert!(c.advance(1000, &mut transforms).is_empty());
    }

    #[test]
    fn swap_moves_tracks_with_cards() {
        let mut c = Choreographer::new(2);
        let mut transforms = vec![Transform::default(); 2];
        let id = c.begin(Tag::A);
        c.animate(id, 0, Channel::Position, linear(100.0, 100), 0);
        c.swap(0, 1);
        transforms.swap(0, 1);
        c.advance(100, &mut transforms);
        assert_eq!(transforms[1].position.x, 100.0);
        assert_eq!(transforms[0].position.x, 0.0);
    }

    #[test]
    fn unknown_transition_or_card_is_ignored() {
        let mut c: Choreographer<Tag> = Choreographer::new(1);
        let id = c.begin(Tag::A);
        c.animate(id, 5, Channel::Position, linear(1.0, 10), 0);
        assert_eq!(c.advance(0, &mut [Transform::default()]), vec![Tag::A]);
        c.animate(id, 0, Channel::Position, linear(1.0, 10), 0);
        assert!(!c.is_animating());
    }

    mod scene {
        use super::*;

        #[test]
        fn spin_accumulates_with_time() {
            let mut c: Choreographer<Tag> = Choreographer::new(0);
            c.spin(2.0, 1000);
            c.advance(1500, &mut []);
            assert!((c.scene_rotation() - 1.0).abs() < 1e-9);
            assert!(c.is_animating());
        }

        #[test]
        fn stop_spin_faces_front() {
            let mut c: Choreographer<Tag> = Choreographer::new(0);
            c.spin(2.0, 0);
            c.advance(1000, &mut []);
            c.stop_spin();
            assert_eq!(c.scene_rotation(), 0.0);
            assert!(!c.is_animating());
        }

        #[test]
        fn settle_returns_to_zero() {
            let mut c: Choreographer<Tag> = Choreographer::new(0);
            c.spin(1.0, 0);
            c.advance(3000, &mut []);
            c.settle(3000, 800);
            c.advance(3400, &mut []);
            assert!(c.scene_rotation() > 0.0 && c.scene_rotation() < 3.0);
            c.advance(3800, &mut []);
            assert_eq!(c.scene_rotation(), 0.0);
            assert!(!c.is_animating());
        }
    }
}
