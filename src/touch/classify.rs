use super::{
    config::{GestureOptions, GestureThresholds},
    edge::edge_at,
    geometry::{direction, distance, velocity, wrap_degrees},
    types::{Direction, Edge, GestureEvent, GestureKind, TouchPoint},
};

/// What a session looked like when its last contact lifted.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionSummary {
    pub(crate) start: TouchPoint,
    pub(crate) end: TouchPoint,
    pub(crate) long_press_fired: bool,
    pub(crate) multi_touch: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Terminal {
    /// Long-press already consumed the interaction.
    Consumed,
    Tap,
    DoubleTap,
    Swipe(Direction),
    EdgeSwipe(Edge),
    Nothing,
}

pub(crate) fn classify_terminal(
    summary: &SessionSummary,
    last_tap_ms: Option<u64>,
    thresholds: &GestureThresholds,
    options: &GestureOptions,
    surface: (f32, f32),
) -> Terminal {
    if summary.long_press_fired {
        return Terminal::Consumed;
    }
    // Taps and swipes are single-finger gestures; a two-finger session has
    // already reported itself through pinch/rotate.
    if summary.multi_touch {
        return Terminal::Nothing;
    }

    let travel = distance(summary.start, summary.end);
    if travel < thresholds.tap_move_limit_px {
        return match last_tap_ms {
            Some(last) if is_double_tap_gap(summary.end.time_ms, last, thresholds) => {
                Terminal::DoubleTap
            }
            _ => Terminal::Tap,
        };
    }

    let speed = velocity(summary.start, summary.end);
    if travel >= thresholds.swipe_px && speed >= thresholds.velocity_px_per_ms {
        if options.enable_edge_swipes {
            let (width, height) = surface;
            if let Some(edge) = edge_at(summary.start, width, height, thresholds.edge_px) {
                return Terminal::EdgeSwipe(edge);
            }
        }
        let dir = direction(
            summary.end.x - summary.start.x,
            summary.end.y - summary.start.y,
            thresholds.swipe_px,
        );
        if dir == Direction::None {
            // Diagonal travel with neither axis past the threshold.
            return Terminal::Nothing;
        }
        return Terminal::Swipe(dir);
    }

    Terminal::Nothing
}

fn is_double_tap_gap(end_ms: u64, last_tap_ms: u64, thresholds: &GestureThresholds) -> bool {
    let gap = end_ms.saturating_sub(last_tap_ms);
    gap >= thresholds.double_tap_min_gap_ms && gap < thresholds.double_tap_delay_ms
}

pub(crate) fn pan_due(
    start: TouchPoint,
    current: TouchPoint,
    thresholds: &GestureThresholds,
) -> bool {
    distance(start, current) > thresholds.pan_px
}

pub(crate) fn pinch_scale(
    pair_distance: f32,
    baseline: f32,
    thresholds: &GestureThresholds,
) -> Option<f32> {
    if baseline <= 0.0 {
        return None;
    }
    if (pair_distance - baseline).abs() > thresholds.pinch_px {
        Some(pair_distance / baseline)
    } else {
        None
    }
}

pub(crate) fn rotation_delta(
    pair_angle: f32,
    baseline: f32,
    thresholds: &GestureThresholds,
) -> Option<f32> {
    let delta = wrap_degrees(pair_angle - baseline);
    if delta.abs() > thresholds.rotation_deg {
        Some(delta)
    } else {
        None
    }
}

/// Fills the motion fields shared by every gesture kind.
pub(crate) fn gesture_event(
    kind: GestureKind,
    time_ms: u64,
    start: TouchPoint,
    current: TouchPoint,
    multi_touch: bool,
    swipe_px: f32,
) -> GestureEvent {
    let delta_x = current.x - start.x;
    let delta_y = current.y - start.y;
    GestureEvent {
        kind,
        time_ms,
        start,
        current,
        end: None,
        delta_x,
        delta_y,
        distance: distance(start, current),
        velocity: velocity(start, current),
        direction: direction(delta_x, delta_y, swipe_px),
        duration_ms: time_ms.saturating_sub(start.time_ms),
        multi_touch,
        scale: None,
        rotation: None,
        edge: None,
    }
}
