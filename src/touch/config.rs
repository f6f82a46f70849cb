use core::fmt;

use serde::Deserialize;

pub const EDGE_THRESHOLD_PX: f32 = 30.0;
pub const SWIPE_THRESHOLD_PX: f32 = 50.0;
pub const VELOCITY_THRESHOLD_PX_PER_MS: f32 = 0.3;
pub const LONG_PRESS_DURATION_MS: u64 = 500;
pub const DOUBLE_TAP_DELAY_MS: u64 = 300;
// Faster repeats are contact bounce, not a second tap.
pub const DOUBLE_TAP_MIN_GAP_MS: u64 = 50;
pub const PINCH_THRESHOLD_PX: f32 = 10.0;
pub const TAP_MOVE_LIMIT_PX: f32 = 20.0;
pub const PAN_THRESHOLD_PX: f32 = 10.0;
pub const ROTATION_THRESHOLD_DEG: f32 = 5.0;

pub const MAX_TOUCHES: usize = 10;
pub const MAX_EMISSIONS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureOptions {
    pub enable_edge_swipes: bool,
    pub enable_pinch: bool,
    pub enable_rotation: bool,
    pub prevent_default: bool,
    pub passive: bool,
}

impl Default for GestureOptions {
    fn default() -> Self {
        Self {
            enable_edge_swipes: true,
            enable_pinch: true,
            enable_rotation: true,
            prevent_default: false,
            passive: true,
        }
    }
}

impl GestureOptions {
    /// Listeners can only be passive when they never suppress the default action.
    pub fn passive_listeners(&self) -> bool {
        self.passive && !self.prevent_default
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureThresholds {
    pub edge_px: f32,
    pub swipe_px: f32,
    pub velocity_px_per_ms: f32,
    pub long_press_ms: u64,
    pub double_tap_delay_ms: u64,
    pub double_tap_min_gap_ms: u64,
    pub pinch_px: f32,
    pub tap_move_limit_px: f32,
    pub pan_px: f32,
    pub rotation_deg: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            edge_px: EDGE_THRESHOLD_PX,
            swipe_px: SWIPE_THRESHOLD_PX,
            velocity_px_per_ms: VELOCITY_THRESHOLD_PX_PER_MS,
            long_press_ms: LONG_PRESS_DURATION_MS,
            double_tap_delay_ms: DOUBLE_TAP_DELAY_MS,
            double_tap_min_gap_ms: DOUBLE_TAP_MIN_GAP_MS,
            pinch_px: PINCH_THRESHOLD_PX,
            tap_move_limit_px: TAP_MOVE_LIMIT_PX,
            pan_px: PAN_THRESHOLD_PX,
            rotation_deg: ROTATION_THRESHOLD_DEG,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub options: GestureOptions,
    pub thresholds: GestureThresholds,
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(toml::de::Error),
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "invalid gesture config: {err}"),
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid gesture threshold `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl GestureConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GestureConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let distances = [
            ("edge_px", t.edge_px),
            ("swipe_px", t.swipe_px),
            ("velocity_px_per_ms", t.velocity_px_per_ms),
            ("pinch_px", t.pinch_px),
            ("tap_move_limit_px", t.tap_move_limit_px),
            ("pan_px", t.pan_px),
            ("rotation_deg", t.rotation_deg),
        ];
        for (field, value) in distances {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive number",
                });
            }
        }
        if t.long_press_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "long_press_ms",
                reason: "must be positive",
            });
        }
        if t.double_tap_min_gap_ms >= t.double_tap_delay_ms {
            return Err(ConfigError::Invalid {
                field: "double_tap_min_gap_ms",
                reason: "must be shorter than double_tap_delay_ms",
            });
        }
        if t.pan_px >= t.swipe_px {
            return Err(ConfigError::Invalid {
                field: "pan_px",
                reason: "must be smaller than swipe_px",
            });
        }
        Ok(())
    }
}
