use super::{
    config::{GestureConfig, GestureOptions},
    core::{GestureEngine, GestureOutput},
    dispatch::{GestureHandlers, HapticFeedback, NoHaptics},
    types::{RawTouchEvent, TouchPhase},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerOptions {
    pub passive: bool,
}

/// The interactive area a recognizer is bound to.
pub trait TouchSurface {
    fn size(&self) -> (f32, f32);
    fn install_listeners(&mut self, options: ListenerOptions);
    fn remove_listeners(&mut self);
}

/// Whether the platform's default touch behaviour should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Default,
    PreventDefault,
}

/// A gesture engine attached to one surface. Listeners are installed on
/// attach and removed, together with every pending deadline, on `detach`
/// or drop.
pub struct GestureRecognizer<S: TouchSurface, H: HapticFeedback = NoHaptics> {
    surface: S,
    engine: GestureEngine,
    handlers: GestureHandlers,
    haptics: H,
    options: GestureOptions,
    attached: bool,
}

impl<S: TouchSurface, H: HapticFeedback> GestureRecognizer<S, H> {
    pub fn attach(
        mut surface: S,
        handlers: GestureHandlers,
        haptics: H,
        config: GestureConfig,
    ) -> Self {
        let listeners = ListenerOptions {
            passive: config.options.passive_listeners(),
        };
        surface.install_listeners(listeners);
        let engine = GestureEngine::new(config, surface.size());
        log::debug!(
            "gesture: attached passive={} prevent_default={}",
            listeners.passive,
            config.options.prevent_default
        );

        Self {
            surface,
            engine,
            handlers,
            haptics,
            options: config.options,
            attached: true,
        }
    }

    pub fn handle(&mut self, event: RawTouchEvent<'_>) -> Disposition {
        if !self.attached {
            return Disposition::Default;
        }
        if event.phase == TouchPhase::Start {
            let (width, height) = self.surface.size();
            self.engine.set_surface_size(width, height);
        }
        let output = self.engine.handle(&event);
        self.deliver(output);

        if self.options.prevent_default {
            Disposition::PreventDefault
        } else {
            Disposition::Default
        }
    }

    /// Lets deadlines due by `now_ms` fire without a new touch event.
    pub fn advance(&mut self, now_ms: u64) {
        if !self.attached {
            return;
        }
        let output = self.engine.advance(now_ms);
        self.deliver(output);
    }

    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.engine.reset();
        self.surface.remove_listeners();
        log::debug!("gesture: detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn handlers_mut(&mut self) -> &mut GestureHandlers {
        &mut self.handlers
    }

    fn deliver(&mut self, output: GestureOutput) {
        for emission in &output.emissions {
            if !self.handlers.dispatch(&emission.event) {
                log::trace!("gesture: no handler for {}", emission.event.label());
            }
            if let Some(intensity) = emission.haptic {
                self.haptics.pulse(intensity);
            }
        }
    }
}

impl<S: TouchSurface, H: HapticFeedback> Drop for GestureRecognizer<S, H> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::touch::{
        dispatch::{HandlerKey, HapticIntensity},
        types::RawTouch,
    };

    #[derive(Debug, Default)]
    struct SurfaceLog {
        installed: std::vec::Vec<ListenerOptions>,
        removed: usize,
    }

    struct FakeSurface {
        log: Rc<RefCell<SurfaceLog>>,
    }

    impl TouchSurface for FakeSurface {
        fn size(&self) -> (f32, f32) {
            (400.0, 800.0)
        }

        fn install_listeners(&mut self, options: ListenerOptions) {
            self.log.borrow_mut().installed.push(options);
        }

        fn remove_listeners(&mut self) {
            self.log.borrow_mut().removed += 1;
        }
    }

    fn surface() -> (FakeSurface, Rc<RefCell<SurfaceLog>>) {
        let log = Rc::new(RefCell::new(SurfaceLog::default()));
        (
            FakeSurface {
                log: Rc::clone(&log),
            },
            log,
        )
    }

    fn touch(phase: TouchPhase, time_ms: u64, touches: &[RawTouch]) -> RawTouchEvent<'_> {
        RawTouchEvent {
            phase,
            time_ms,
            touches,
            changed: touches,
        }
    }

    #[test]
    fn drop_removes_listeners_exactly_once() {
        let (surface, log) = surface();
        let mut recognizer = GestureRecognizer::attach(
            surface,
            GestureHandlers::new(),
            NoHaptics,
            GestureConfig::default(),
        );
        assert_eq!(log.borrow().installed, [ListenerOptions { passive: true }]);

        recognizer.detach();
        drop(recognizer);
        assert_eq!(log.borrow().removed, 1);
    }

    #[test]
    fn prevent_default_installs_active_listeners() {
        let (surface, log) = surface();
        let mut config = GestureConfig::default();
        config.options.prevent_default = true;
        let mut recognizer =
            GestureRecognizer::attach(surface, GestureHandlers::new(), NoHaptics, config);

        assert_eq!(log.borrow().installed, [ListenerOptions { passive: false }]);
        let t = [RawTouch::new(1, 200.0, 300.0)];
        assert_eq!(
            recognizer.handle(touch(TouchPhase::Start, 0, &t)),
            Disposition::PreventDefault
        );
    }

    #[test]
    fn handlers_and_haptics_follow_classification() {
        let (surface, _log) = surface();
        let taps = Rc::new(RefCell::new(0usize));
        let tap_count = Rc::clone(&taps);
        let pulses = Rc::new(RefCell::new(std::vec::Vec::new()));
        let pulse_log = Rc::clone(&pulses);

        let handlers =
            GestureHandlers::new().on(HandlerKey::Tap, move |_| *tap_count.borrow_mut() += 1);
        let mut recognizer = GestureRecognizer::attach(
            surface,
            handlers,
            move |intensity: HapticIntensity| pulse_log.borrow_mut().push(intensity),
            GestureConfig::default(),
        );

        let t = [RawTouch::new(1, 200.0, 300.0)];
        recognizer.handle(touch(TouchPhase::Start, 0, &t));
        recognizer.handle(RawTouchEvent {
            phase: TouchPhase::End,
            time_ms: 90,
            touches: &[],
            changed: &t,
        });
        recognizer.advance(500);

        assert_eq!(*taps.borrow(), 1);
        assert_eq!(*pulses.borrow(), [HapticIntensity::Light]);
    }

    #[test]
    fn detach_cancels_pending_tap() {
        let (surface, _log) = surface();
        let taps = Rc::new(RefCell::new(0usize));
        let tap_count = Rc::clone(&taps);
        let handlers =
            GestureHandlers::new().on(HandlerKey::Tap, move |_| *tap_count.borrow_mut() += 1);
        let mut recognizer =
            GestureRecognizer::attach(surface, handlers, NoHaptics, GestureConfig::default());

        let t = [RawTouch::new(1, 200.0, 300.0)];
        recognizer.handle(touch(TouchPhase::Start, 0, &t));
        recognizer.handle(RawTouchEvent {
            phase: TouchPhase::End,
            time_ms: 90,
            touches: &[],
            changed: &t,
        });
        recognizer.detach();
        recognizer.advance(1_000);

        assert_eq!(*taps.borrow(), 0);
        assert!(!recognizer.is_attached());
    }
}
