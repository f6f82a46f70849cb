//! Multi-touch gesture recognition for a touch-driven desktop shell.
//!
//! Raw touch events go in, classified gestures (tap, double-tap,
//! long-press, swipe, edge-swipe, pan, pinch, rotate) come out through a
//! handler table. Everything runs synchronously on the caller's thread;
//! the only delayed decisions (long-press, deferred single tap) are
//! deadlines fired as time is advanced.

pub mod touch;

pub use touch::{
    ConfigError, Direction, Disposition, Edge, GestureConfig, GestureEngine, GestureEvent,
    GestureHandlers, GestureKind, GestureOptions, GestureRecognizer, GestureThresholds,
    HandlerKey, HapticFeedback, HapticIntensity, ListenerOptions, NoHaptics, RawTouch,
    RawTouchEvent, TouchPhase, TouchPoint, TouchSurface,
};
