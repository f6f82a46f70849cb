use super::types::GestureEvent;

/// Long-press deadline tagged with the session it was armed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Deadline {
    pub(crate) due_ms: u64,
    pub(crate) generation: u32,
}

/// A single tap held back until the double-tap window closes. It only fires
/// if the last-tap timestamp still equals `captured_ms`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DeferredTap {
    pub(crate) due_ms: u64,
    pub(crate) captured_ms: u64,
    pub(crate) event: GestureEvent,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum DueTimer {
    LongPress(Deadline),
    DeferredTap(DeferredTap),
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Timers {
    long_press: Option<Deadline>,
    deferred_tap: Option<DeferredTap>,
}

impl Timers {
    pub(crate) fn arm_long_press(&mut self, due_ms: u64, generation: u32) {
        self.long_press = Some(Deadline { due_ms, generation });
    }

    pub(crate) fn cancel_long_press(&mut self) -> bool {
        self.long_press.take().is_some()
    }

    pub(crate) fn long_press_armed(&self) -> bool {
        self.long_press.is_some()
    }

    pub(crate) fn schedule_tap(&mut self, tap: DeferredTap) {
        // A newer tap supersedes the pending one; the stale one would fail
        // its timestamp check anyway.
        self.deferred_tap = Some(tap);
    }

    #[cfg(test)]
    pub(crate) fn tap_pending(&self) -> bool {
        self.deferred_tap.is_some()
    }

    pub(crate) fn cancel_all(&mut self) {
        self.long_press = None;
        self.deferred_tap = None;
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    /// On equal deadlines the long-press fires first.
    pub(crate) fn take_due(&mut self, now_ms: u64) -> Option<DueTimer> {
        let long_press_due = self.long_press.filter(|d| d.due_ms <= now_ms);
        let tap_due = self.deferred_tap.filter(|t| t.due_ms <= now_ms);

        match (long_press_due, tap_due) {
            (Some(lp), Some(tap)) if tap.due_ms < lp.due_ms => {
                self.deferred_tap = None;
                Some(DueTimer::DeferredTap(tap))
            }
            (Some(lp), _) => {
                self.long_press = None;
                Some(DueTimer::LongPress(lp))
            }
            (None, Some(tap)) => {
                self.deferred_tap = None;
                Some(DueTimer::DeferredTap(tap))
            }
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::types::{Direction, GestureKind, TouchPoint};

    fn tap_event() -> GestureEvent {
        GestureEvent {
            kind: GestureKind::Tap,
            time_ms: 0,
            start: TouchPoint::default(),
            current: TouchPoint::default(),
            end: None,
            delta_x: 0.0,
            delta_y: 0.0,
            distance: 0.0,
            velocity: 0.0,
            direction: Direction::None,
            duration_ms: 0,
            multi_touch: false,
            scale: None,
            rotation: None,
            edge: None,
        }
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut timers = Timers::default();
        timers.arm_long_press(500, 1);
        timers.schedule_tap(DeferredTap {
            due_ms: 400,
            captured_ms: 100,
            event: tap_event(),
        });

        assert!(timers.take_due(399).is_none());
        assert!(matches!(timers.take_due(600), Some(DueTimer::DeferredTap(_))));
        assert!(matches!(
            timers.take_due(600),
            Some(DueTimer::LongPress(Deadline { generation: 1, .. }))
        ));
        assert!(timers.take_due(600).is_none());
    }

    #[test]
    fn cancel_all_drops_every_deadline() {
        let mut timers = Timers::default();
        timers.arm_long_press(500, 1);
        timers.schedule_tap(DeferredTap {
            due_ms: 400,
            captured_ms: 100,
            event: tap_event(),
        });
        timers.cancel_all();
        assert!(!timers.long_press_armed());
        assert!(!timers.tap_pending());
        assert!(timers.take_due(u64::MAX).is_none());
    }
}
