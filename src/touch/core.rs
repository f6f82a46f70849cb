use heapless::Vec;
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{
    classify::{
        classify_terminal, gesture_event, pan_due, pinch_scale, rotation_delta, SessionSummary,
        Terminal,
    },
    config::{GestureConfig, MAX_EMISSIONS, MAX_TOUCHES},
    dispatch::HapticIntensity,
    geometry::{angle_deg, distance},
    timers::{Deadline, DeferredTap, DueTimer, Timers},
    tracker::TouchTracker,
    types::{GestureEvent, GestureKind, RawTouch, RawTouchEvent, TouchPhase, TouchPoint},
};

/// A classified gesture plus the haptic pulse that should accompany it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emission {
    pub event: GestureEvent,
    pub haptic: Option<HapticIntensity>,
}

#[derive(Clone, Debug, Default)]
pub struct GestureOutput {
    pub emissions: Vec<Emission, MAX_EMISSIONS>,
}

impl GestureOutput {
    pub fn events(&self) -> impl Iterator<Item = &GestureEvent> {
        self.emissions.iter().map(|emission| &emission.event)
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
struct TouchFrame {
    time_ms: u64,
    touches: Vec<RawTouch, MAX_TOUCHES>,
    changed: Vec<RawTouch, MAX_TOUCHES>,
}

impl TouchFrame {
    fn from_raw(event: &RawTouchEvent<'_>) -> Self {
        let mut frame = TouchFrame {
            time_ms: event.time_ms,
            ..TouchFrame::default()
        };
        frame
            .touches
            .extend(event.touches.iter().copied().take(MAX_TOUCHES));
        frame
            .changed
            .extend(event.changed.iter().copied().take(MAX_TOUCHES));
        frame
    }
}

#[derive(Clone, Debug)]
enum TouchHsmEvent {
    Start(TouchFrame),
    Move(TouchFrame),
    End(TouchFrame),
    Cancel,
    Elapsed { now_ms: u64 },
    Resize { width: f32, height: f32 },
    Detach,
}

#[derive(Clone, Debug, Default)]
struct DispatchContext {
    emissions: Vec<Emission, MAX_EMISSIONS>,
}

impl DispatchContext {
    fn emit(&mut self, event: GestureEvent, haptic: Option<HapticIntensity>) {
        log::trace!("gesture: emit {} at {}ms", event.label(), event.time_ms);
        if self.emissions.push(Emission { event, haptic }).is_err() {
            log::warn!("gesture: output full, dropping {}", event.label());
        }
    }

    fn finish(self) -> GestureOutput {
        GestureOutput {
            emissions: self.emissions,
        }
    }
}

/// Gesture recognizer for one surface. Feed it raw touch events in arrival
/// order and advance time between events so deferred decisions can fire.
pub struct GestureEngine {
    machine: statig::blocking::StateMachine<GestureHsm>,
}

impl GestureEngine {
    pub fn new(config: GestureConfig, surface_size: (f32, f32)) -> Self {
        Self {
            machine: GestureHsm::new(config, surface_size).state_machine(),
        }
    }

    /// Fires every deadline due by `event.time_ms`, then processes the event.
    pub fn handle(&mut self, event: &RawTouchEvent<'_>) -> GestureOutput {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(
            &TouchHsmEvent::Elapsed {
                now_ms: event.time_ms,
            },
            &mut context,
        );

        let frame = TouchFrame::from_raw(event);
        let hsm_event = match event.phase {
            TouchPhase::Start => TouchHsmEvent::Start(frame),
            TouchPhase::Move => TouchHsmEvent::Move(frame),
            TouchPhase::End => TouchHsmEvent::End(frame),
            TouchPhase::Cancel => TouchHsmEvent::Cancel,
        };
        self.machine.handle_with_context(&hsm_event, &mut context);
        context.finish()
    }

    pub fn advance(&mut self, now_ms: u64) -> GestureOutput {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&TouchHsmEvent::Elapsed { now_ms }, &mut context);
        context.finish()
    }

    pub fn set_surface_size(&mut self, width: f32, height: f32) {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&TouchHsmEvent::Resize { width, height }, &mut context);
    }

    /// Drops the live session and every pending deadline.
    pub fn reset(&mut self) {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&TouchHsmEvent::Detach, &mut context);
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Session {
    generation: u32,
    primary_id: u32,
    start: TouchPoint,
    current: TouchPoint,
    long_press_fired: bool,
    multi_touch: bool,
    pinch_baseline: Option<f32>,
    rotation_baseline: Option<f32>,
}

struct GestureHsm {
    config: GestureConfig,
    surface: (f32, f32),
    tracker: TouchTracker,
    session: Session,
    timers: Timers,
    last_tap_ms: Option<u64>,
    generations: u32,
}

impl GestureHsm {
    fn new(config: GestureConfig, surface: (f32, f32)) -> Self {
        Self {
            config,
            surface,
            tracker: TouchTracker::new(),
            session: Session::default(),
            timers: Timers::default(),
            last_tap_ms: None,
            generations: 0,
        }
    }

    fn begin_session(&mut self, frame: &TouchFrame) -> bool {
        self.tracker.on_start(&frame.touches, frame.time_ms);
        let Some(primary) = self.tracker.oldest() else {
            return false;
        };

        // Generation 0 is reserved for "no session".
        self.generations = self.generations.wrapping_add(1).max(1);
        self.session = Session {
            generation: self.generations,
            primary_id: primary.id,
            start: primary,
            current: primary,
            ..Session::default()
        };
        self.timers.arm_long_press(
            frame
                .time_ms
                .saturating_add(self.config.thresholds.long_press_ms),
            self.session.generation,
        );
        if self.tracker.len() >= 2 {
            self.enter_multi_touch();
        }

        log::debug!(
            "gesture: session {} start id={} at ({:.1},{:.1}) touches={}",
            self.session.generation,
            primary.id,
            primary.x,
            primary.y,
            self.tracker.len()
        );
        true
    }

    fn add_contacts(&mut self, frame: &TouchFrame) {
        if frame.touches.is_empty() {
            return;
        }
        self.tracker.on_start(&frame.touches, frame.time_ms);
        self.refresh_primary();
        if self.tracker.len() >= 2 {
            self.enter_multi_touch();
        }
    }

    fn enter_multi_touch(&mut self) {
        self.session.multi_touch = true;
        if self.timers.cancel_long_press() {
            log::trace!(
                "gesture: session {} long-press disarmed by second contact",
                self.session.generation
            );
        }

        let Some((a, b)) = self.tracker.pair() else {
            return;
        };
        let options = &self.config.options;
        if options.enable_pinch && self.session.pinch_baseline.is_none() {
            self.session.pinch_baseline = Some(distance(a, b));
        }
        if options.enable_rotation && self.session.rotation_baseline.is_none() {
            self.session.rotation_baseline = Some(angle_deg(a, b));
        }
    }

    fn refresh_primary(&mut self) {
        if let Some(point) = self.tracker.get(self.session.primary_id) {
            self.session.current = point;
        }
    }

    fn track_move(&mut self, context: &mut DispatchContext, frame: &TouchFrame) {
        if frame.touches.is_empty() {
            return;
        }
        self.tracker.on_move(&frame.touches, frame.time_ms);
        self.refresh_primary();

        let thresholds = self.config.thresholds;
        if self.timers.long_press_armed()
            && distance(self.session.start, self.session.current) > thresholds.tap_move_limit_px
        {
            self.timers.cancel_long_press();
            log::trace!(
                "gesture: session {} long-press disarmed by motion",
                self.session.generation
            );
        }

        match self.tracker.len() {
            0 => {}
            1 => {
                let primary_live = self.tracker.get(self.session.primary_id).is_some();
                if primary_live && pan_due(self.session.start, self.session.current, &thresholds)
                {
                    let event = self.build_event(GestureKind::Pan, frame.time_ms);
                    context.emit(event, None);
                }
            }
            _ => self.track_pair(context, frame.time_ms),
        }
    }

    fn track_pair(&mut self, context: &mut DispatchContext, time_ms: u64) {
        let Some((a, b)) = self.tracker.pair() else {
            return;
        };
        let thresholds = self.config.thresholds;

        if let Some(baseline) = self.session.pinch_baseline {
            if let Some(scale) = pinch_scale(distance(a, b), baseline, &thresholds) {
                let event = GestureEvent {
                    scale: Some(scale),
                    ..self.build_event(GestureKind::Pinch, time_ms)
                };
                context.emit(event, None);
            }
        }

        if let Some(baseline) = self.session.rotation_baseline {
            if let Some(rotation) = rotation_delta(angle_deg(a, b), baseline, &thresholds) {
                let event = GestureEvent {
                    rotation: Some(rotation),
                    ..self.build_event(GestureKind::Rotate, time_ms)
                };
                context.emit(event, None);
            }
        }
    }

    /// Returns true once the last contact has lifted and the session is closed.
    fn release(&mut self, context: &mut DispatchContext, frame: &TouchFrame) -> bool {
        if let Some(lifted) = frame
            .changed
            .iter()
            .find(|touch| touch.id == self.session.primary_id)
        {
            self.session.current = TouchPoint::from_raw(*lifted, frame.time_ms);
        }

        self.tracker.on_end(&frame.touches, frame.time_ms);
        if self.tracker.len() < 2 {
            self.session.pinch_baseline = None;
            self.session.rotation_baseline = None;
        }
        if !self.tracker.is_empty() {
            return false;
        }

        self.finish_session(context, frame.time_ms);
        true
    }

    fn finish_session(&mut self, context: &mut DispatchContext, end_ms: u64) {
        let thresholds = self.config.thresholds;
        let end = TouchPoint {
            time_ms: end_ms,
            ..self.session.current
        };
        let summary = SessionSummary {
            start: self.session.start,
            end,
            long_press_fired: self.session.long_press_fired,
            multi_touch: self.session.multi_touch,
        };
        let terminal = classify_terminal(
            &summary,
            self.last_tap_ms,
            &thresholds,
            &self.config.options,
            self.surface,
        );

        let terminal_event = |kind| GestureEvent {
            end: Some(end),
            ..gesture_event(
                kind,
                end_ms,
                summary.start,
                end,
                summary.multi_touch,
                thresholds.swipe_px,
            )
        };

        match terminal {
            Terminal::Consumed | Terminal::Nothing => {}
            Terminal::Tap => {
                self.last_tap_ms = Some(end_ms);
                self.timers.schedule_tap(DeferredTap {
                    due_ms: end_ms.saturating_add(thresholds.double_tap_delay_ms),
                    captured_ms: end_ms,
                    event: terminal_event(GestureKind::Tap),
                });
            }
            Terminal::DoubleTap => {
                self.last_tap_ms = None;
                context.emit(
                    terminal_event(GestureKind::DoubleTap),
                    Some(HapticIntensity::Light),
                );
            }
            Terminal::Swipe(direction) => {
                let event = GestureEvent {
                    direction,
                    ..terminal_event(GestureKind::Swipe)
                };
                context.emit(event, Some(HapticIntensity::Light));
            }
            Terminal::EdgeSwipe(edge) => {
                let event = GestureEvent {
                    edge: Some(edge),
                    ..terminal_event(GestureKind::EdgeSwipe)
                };
                context.emit(event, Some(HapticIntensity::Medium));
            }
        }

        log::debug!(
            "gesture: session {} end after {}ms -> {:?}",
            self.session.generation,
            end_ms.saturating_sub(self.session.start.time_ms),
            terminal
        );
        self.clear_session();
    }

    fn cancel_session(&mut self) {
        log::debug!(
            "gesture: session {} cancelled with {} live contacts",
            self.session.generation,
            self.tracker.len()
        );
        self.clear_session();
    }

    fn clear_session(&mut self) {
        self.timers.cancel_long_press();
        self.tracker.clear();
        self.session = Session::default();
    }

    fn detach(&mut self) {
        self.timers.cancel_all();
        self.clear_session();
        self.last_tap_ms = None;
    }

    fn fire_due(&mut self, context: &mut DispatchContext, now_ms: u64) {
        while let Some(timer) = self.timers.take_due(now_ms) {
            match timer {
                DueTimer::LongPress(deadline) => self.fire_long_press(context, deadline),
                DueTimer::DeferredTap(tap) => self.fire_deferred_tap(context, tap),
            }
        }
    }

    fn fire_long_press(&mut self, context: &mut DispatchContext, deadline: Deadline) {
        if deadline.generation != self.session.generation || self.session.long_press_fired {
            log::trace!(
                "gesture: stale long-press for session {} ignored",
                deadline.generation
            );
            return;
        }
        self.session.long_press_fired = true;
        let event = self.build_event(GestureKind::LongPress, deadline.due_ms);
        context.emit(event, Some(HapticIntensity::Medium));
    }

    fn fire_deferred_tap(&mut self, context: &mut DispatchContext, tap: DeferredTap) {
        if self.last_tap_ms != Some(tap.captured_ms) {
            log::trace!("gesture: tap from {}ms superseded", tap.captured_ms);
            return;
        }
        let event = GestureEvent {
            time_ms: tap.due_ms,
            ..tap.event
        };
        context.emit(event, Some(HapticIntensity::Light));
    }

    fn build_event(&self, kind: GestureKind, time_ms: u64) -> GestureEvent {
        gesture_event(
            kind,
            time_ms,
            self.session.start,
            self.session.current,
            self.session.multi_touch,
            self.config.thresholds.swipe_px,
        )
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[superstate]
    fn attached(
        &mut self,
        context: &mut DispatchContext,
        event: &TouchHsmEvent,
    ) -> Outcome<State> {
        match event {
            TouchHsmEvent::Elapsed { now_ms } => {
                self.fire_due(context, *now_ms);
                Handled
            }
            TouchHsmEvent::Resize { width, height } => {
                self.surface = (*width, *height);
                Handled
            }
            TouchHsmEvent::Detach => {
                self.detach();
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[state(superstate = "attached")]
    fn idle(&mut self, event: &TouchHsmEvent) -> Outcome<State> {
        match event {
            TouchHsmEvent::Start(frame) => {
                if self.begin_session(frame) {
                    Transition(State::active())
                } else {
                    Handled
                }
            }
            // Stray move/end/cancel without a session carry nothing to classify.
            TouchHsmEvent::Move(_) | TouchHsmEvent::End(_) | TouchHsmEvent::Cancel => Handled,
            _ => Super,
        }
    }

    #[state(superstate = "attached")]
    fn active(&mut self, context: &mut DispatchContext, event: &TouchHsmEvent) -> Outcome<State> {
        match event {
            TouchHsmEvent::Start(frame) => {
                self.add_contacts(frame);
                Handled
            }
            TouchHsmEvent::Move(frame) => {
                self.track_move(context, frame);
                Handled
            }
            TouchHsmEvent::End(frame) => {
                if self.release(context, frame) {
                    Transition(State::idle())
                } else {
                    Handled
                }
            }
            TouchHsmEvent::Cancel => {
                self.cancel_session();
                Transition(State::idle())
            }
            _ => Super,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::types::Direction;

    const SURFACE: (f32, f32) = (400.0, 800.0);

    fn engine() -> GestureEngine {
        GestureEngine::new(GestureConfig::default(), SURFACE)
    }

    fn feed(
        engine: &mut GestureEngine,
        phase: TouchPhase,
        time_ms: u64,
        touches: &[RawTouch],
        changed: &[RawTouch],
        out: &mut std::vec::Vec<GestureEvent>,
    ) {
        let output = engine.handle(&RawTouchEvent {
            phase,
            time_ms,
            touches,
            changed,
        });
        out.extend(output.events().copied());
    }

    fn labels(events: &[GestureEvent]) -> std::vec::Vec<&'static str> {
        events.iter().map(|e| e.label()).collect()
    }

    #[test]
    fn tap_is_deferred_until_double_tap_window_closes() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let t = RawTouch::new(1, 200.0, 300.0);

        feed(&mut engine, TouchPhase::Start, 0, &[t], &[t], &mut events);
        feed(&mut engine, TouchPhase::End, 80, &[], &[t], &mut events);
        assert!(events.is_empty());

        events.extend(engine.advance(379).events().copied());
        assert!(events.is_empty());

        events.extend(engine.advance(380).events().copied());
        assert_eq!(labels(&events), ["tap"]);
        assert_eq!(events[0].time_ms, 380);
        assert_eq!(events[0].duration_ms, 80);
    }

    #[test]
    fn unsized_surface_swipes_without_edges() {
        let mut engine = GestureEngine::new(GestureConfig::default(), (0.0, 0.0));
        let mut events = std::vec::Vec::new();
        let start = RawTouch::new(1, 200.0, 200.0);
        let end = RawTouch::new(1, 100.0, 200.0);

        feed(&mut engine, TouchPhase::Start, 0, &[start], &[start], &mut events);
        feed(&mut engine, TouchPhase::Move, 50, &[end], &[end], &mut events);
        feed(&mut engine, TouchPhase::End, 100, &[], &[end], &mut events);

        let terminal: std::vec::Vec<_> = labels(&events)
            .into_iter()
            .filter(|label| *label != "pan")
            .collect();
        assert_eq!(terminal, ["swipe_left"]);
    }

    #[test]
    fn long_press_fires_once_and_swallows_release() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let t = RawTouch::new(1, 200.0, 300.0);

        feed(&mut engine, TouchPhase::Start, 0, &[t], &[t], &mut events);
        events.extend(engine.advance(500).events().copied());
        events.extend(engine.advance(900).events().copied());
        feed(&mut engine, TouchPhase::End, 1_000, &[], &[t], &mut events);
        events.extend(engine.advance(2_000).events().copied());

        assert_eq!(labels(&events), ["long_press"]);
        assert_eq!(events[0].time_ms, 500);
    }

    #[test]
    fn moving_past_tap_limit_disarms_long_press() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let start = RawTouch::new(1, 200.0, 300.0);
        let moved = RawTouch::new(1, 230.0, 300.0);

        feed(&mut engine, TouchPhase::Start, 0, &[start], &[start], &mut events);
        feed(&mut engine, TouchPhase::Move, 100, &[moved], &[moved], &mut events);
        events.extend(engine.advance(700).events().copied());

        assert!(!labels(&events).contains(&"long_press"));
        assert!(labels(&events).contains(&"pan"));
    }

    #[test]
    fn pan_reports_live_deltas() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let start = RawTouch::new(1, 200.0, 300.0);

        feed(&mut engine, TouchPhase::Start, 0, &[start], &[start], &mut events);
        let small = RawTouch::new(1, 205.0, 300.0);
        feed(&mut engine, TouchPhase::Move, 16, &[small], &[small], &mut events);
        assert!(events.is_empty());

        let far = RawTouch::new(1, 215.0, 290.0);
        feed(&mut engine, TouchPhase::Move, 32, &[far], &[far], &mut events);
        assert_eq!(labels(&events), ["pan"]);
        assert_eq!((events[0].delta_x, events[0].delta_y), (15.0, -10.0));
        assert!(events[0].end.is_none());
    }

    #[test]
    fn swipe_is_single_terminal_event() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let start = RawTouch::new(1, 200.0, 200.0);
        let end = RawTouch::new(1, 100.0, 200.0);

        feed(&mut engine, TouchPhase::Start, 0, &[start], &[start], &mut events);
        feed(&mut engine, TouchPhase::Move, 100, &[end], &[end], &mut events);
        feed(&mut engine, TouchPhase::End, 100, &[], &[end], &mut events);
        events.extend(engine.advance(1_000).events().copied());

        let swipes: std::vec::Vec<_> = events
            .iter()
            .filter(|e| e.kind == GestureKind::Swipe)
            .collect();
        assert_eq!(swipes.len(), 1);
        assert_eq!(swipes[0].direction, Direction::Left);
        assert_eq!(swipes[0].end.map(|p| p.x), Some(100.0));
        assert_eq!(swipes[0].velocity, 1.0);
    }

    #[test]
    fn cancel_discards_session_without_terminal_event() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let t = RawTouch::new(1, 200.0, 300.0);

        feed(&mut engine, TouchPhase::Start, 0, &[t], &[t], &mut events);
        feed(&mut engine, TouchPhase::Cancel, 50, &[], &[t], &mut events);
        events.extend(engine.advance(2_000).events().copied());

        assert!(events.is_empty());
    }

    #[test]
    fn second_contact_disarms_long_press_and_suppresses_tap() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let a = RawTouch::new(1, 100.0, 300.0);
        let b = RawTouch::new(2, 200.0, 300.0);

        feed(&mut engine, TouchPhase::Start, 0, &[a], &[a], &mut events);
        feed(&mut engine, TouchPhase::Start, 10, &[a, b], &[b], &mut events);
        events.extend(engine.advance(600).events().copied());
        feed(&mut engine, TouchPhase::End, 700, &[a], &[b], &mut events);
        feed(&mut engine, TouchPhase::End, 710, &[], &[a], &mut events);
        events.extend(engine.advance(2_000).events().copied());

        assert!(events.is_empty());
    }

    #[test]
    fn rotation_reports_signed_delta() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let a = RawTouch::new(1, 100.0, 300.0);
        let b = RawTouch::new(2, 200.0, 300.0);
        // Same spacing, pair turned by 90 degrees.
        let b_turned = RawTouch::new(2, 100.0, 400.0);

        feed(&mut engine, TouchPhase::Start, 0, &[a, b], &[a, b], &mut events);
        feed(
            &mut engine,
            TouchPhase::Move,
            50,
            &[a, b_turned],
            &[b_turned],
            &mut events,
        );

        assert_eq!(labels(&events), ["rotate"]);
        let rotation = events[0].rotation.expect("rotation should be set");
        assert!((rotation - 90.0).abs() < 1e-3);
        assert!(events[0].multi_touch);
    }

    #[test]
    fn reset_cancels_pending_tap() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let t = RawTouch::new(1, 200.0, 300.0);

        feed(&mut engine, TouchPhase::Start, 0, &[t], &[t], &mut events);
        feed(&mut engine, TouchPhase::End, 60, &[], &[t], &mut events);
        engine.reset();
        events.extend(engine.advance(1_000).events().copied());

        assert!(events.is_empty());
    }

    #[test]
    fn stray_events_while_idle_are_ignored() {
        let mut engine = engine();
        let mut events = std::vec::Vec::new();
        let t = RawTouch::new(1, 200.0, 300.0);

        feed(&mut engine, TouchPhase::Move, 0, &[t], &[t], &mut events);
        feed(&mut engine, TouchPhase::End, 10, &[], &[t], &mut events);
        feed(&mut engine, TouchPhase::Start, 20, &[], &[], &mut events);
        feed(&mut engine, TouchPhase::Cancel, 30, &[], &[t], &mut events);
        events.extend(engine.advance(2_000).events().copied());

        assert!(events.is_empty());
    }
}
