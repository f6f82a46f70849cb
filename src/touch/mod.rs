pub mod classify;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod edge;
pub mod geometry;
pub mod surface;
mod timers;
pub mod tracker;
pub mod types;

pub use self::core::{Emission, GestureEngine, GestureOutput};
pub use config::{ConfigError, GestureConfig, GestureOptions, GestureThresholds};
pub use dispatch::{GestureHandlers, HandlerKey, HapticFeedback, HapticIntensity, NoHaptics};
pub use surface::{Disposition, GestureRecognizer, ListenerOptions, TouchSurface};
pub use types::{
    Direction, Edge, GestureEvent, GestureKind, RawTouch, RawTouchEvent, TouchPhase, TouchPoint,
};
