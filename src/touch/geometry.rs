use super::types::{Direction, TouchPoint};

pub fn distance(a: TouchPoint, b: TouchPoint) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Average speed between two samples in px/ms; zero when no time elapsed.
pub fn velocity(start: TouchPoint, end: TouchPoint) -> f32 {
    let elapsed_ms = end.time_ms.saturating_sub(start.time_ms);
    if elapsed_ms == 0 {
        return 0.0;
    }
    distance(start, end) / elapsed_ms as f32
}

/// Angle of the line `a -> b` in degrees, in (-180, 180].
pub fn angle_deg(a: TouchPoint, b: TouchPoint) -> f32 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

/// Folds an angle difference into (-180, 180] so a pair crossing the
/// +-180 seam reports a small rotation instead of a near-full turn.
pub fn wrap_degrees(delta: f32) -> f32 {
    let mut wrapped = delta % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Dominant axis of a displacement. Ties go vertical: only a strictly
/// larger horizontal component selects left/right.
pub fn direction(delta_x: f32, delta_y: f32, swipe_threshold: f32) -> Direction {
    let abs_x = delta_x.abs();
    let abs_y = delta_y.abs();
    if abs_x < swipe_threshold && abs_y < swipe_threshold {
        return Direction::None;
    }
    if abs_x > abs_y {
        if delta_x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if delta_y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}
