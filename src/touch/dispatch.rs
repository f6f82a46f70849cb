use super::types::{Direction, GestureEvent, GestureKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HapticIntensity {
    Light,
    Medium,
    Heavy,
}

/// Haptic side effect owned by the host platform.
pub trait HapticFeedback {
    fn pulse(&mut self, intensity: HapticIntensity);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn pulse(&mut self, _intensity: HapticIntensity) {}
}

impl<F> HapticFeedback for F
where
    F: FnMut(HapticIntensity),
{
    fn pulse(&mut self, intensity: HapticIntensity) {
        self(intensity)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerKey {
    Tap,
    DoubleTap,
    LongPress,
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
    EdgeSwipe,
    Pan,
    Pinch,
    Rotate,
}

impl HandlerKey {
    const COUNT: usize = 11;

    /// Handler slot for an event; `None` for a swipe without a direction.
    pub fn for_event(event: &GestureEvent) -> Option<Self> {
        let key = match event.kind {
            GestureKind::Tap => HandlerKey::Tap,
            GestureKind::DoubleTap => HandlerKey::DoubleTap,
            GestureKind::LongPress => HandlerKey::LongPress,
            GestureKind::Swipe => match event.direction {
                Direction::Up => HandlerKey::SwipeUp,
                Direction::Down => HandlerKey::SwipeDown,
                Direction::Left => HandlerKey::SwipeLeft,
                Direction::Right => HandlerKey::SwipeRight,
                Direction::None => return None,
            },
            GestureKind::EdgeSwipe => HandlerKey::EdgeSwipe,
            GestureKind::Pan => HandlerKey::Pan,
            GestureKind::Pinch => HandlerKey::Pinch,
            GestureKind::Rotate => HandlerKey::Rotate,
        };
        Some(key)
    }

    fn slot(self) -> usize {
        self as usize
    }
}

type Handler = Box<dyn FnMut(&GestureEvent)>;

/// Callback table keyed by gesture type. Unset slots drop their events.
pub struct GestureHandlers {
    slots: [Option<Handler>; HandlerKey::COUNT],
}

impl Default for GestureHandlers {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureHandlers {
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    pub fn on(mut self, key: HandlerKey, handler: impl FnMut(&GestureEvent) + 'static) -> Self {
        self.set(key, handler);
        self
    }

    pub fn set(&mut self, key: HandlerKey, handler: impl FnMut(&GestureEvent) + 'static) {
        self.slots[key.slot()] = Some(Box::new(handler));
    }

    pub fn clear(&mut self, key: HandlerKey) {
        self.slots[key.slot()] = None;
    }

    pub fn is_set(&self, key: HandlerKey) -> bool {
        self.slots[key.slot()].is_some()
    }

    /// Invokes the matching handler; returns whether one was registered.
    pub fn dispatch(&mut self, event: &GestureEvent) -> bool {
        let Some(key) = HandlerKey::for_event(event) else {
            return false;
        };
        match self.slots[key.slot()].as_mut() {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl core::fmt::Debug for GestureHandlers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let registered = self.slots.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("GestureHandlers")
            .field("registered", &registered)
            .finish()
    }
}
