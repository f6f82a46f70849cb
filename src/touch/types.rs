use serde::Serialize;

/// A live contact point as seen by the tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TouchPoint {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub time_ms: u64,
    pub pressure: f32,
}

impl TouchPoint {
    pub fn from_raw(raw: RawTouch, time_ms: u64) -> Self {
        Self {
            id: raw.id,
            x: raw.x,
            y: raw.y,
            time_ms,
            pressure: raw.pressure,
        }
    }
}

/// One contact as reported by the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawTouch {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
}

impl RawTouch {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            pressure: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A raw platform touch event.
///
/// `touches` lists every contact still on the surface after the event,
/// `changed` lists the contacts this event is about (for `End` that is
/// the lifted contacts with their final positions).
#[derive(Clone, Copy, Debug)]
pub struct RawTouchEvent<'a> {
    pub phase: TouchPhase,
    pub time_ms: u64,
    pub touches: &'a [RawTouch],
    pub changed: &'a [RawTouch],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::None => "none",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn label(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Tap,
    DoubleTap,
    LongPress,
    Swipe,
    EdgeSwipe,
    Pan,
    Pinch,
    Rotate,
}

impl GestureKind {
    pub fn label(self) -> &'static str {
        match self {
            GestureKind::Tap => "tap",
            GestureKind::DoubleTap => "double_tap",
            GestureKind::LongPress => "long_press",
            GestureKind::Swipe => "swipe",
            GestureKind::EdgeSwipe => "edge_swipe",
            GestureKind::Pan => "pan",
            GestureKind::Pinch => "pinch",
            GestureKind::Rotate => "rotate",
        }
    }
}

/// A classified gesture handed to the shell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub time_ms: u64,
    pub start: TouchPoint,
    pub current: TouchPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<TouchPoint>,
    pub delta_x: f32,
    pub delta_y: f32,
    pub distance: f32,
    /// Average speed over the whole session, in px/ms.
    pub velocity: f32,
    pub direction: Direction,
    pub duration_ms: u64,
    pub multi_touch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<Edge>,
}

impl GestureEvent {
    /// Stable label used by traces and expectation files, e.g. `swipe_left`.
    pub fn label(&self) -> &'static str {
        match (self.kind, self.direction) {
            (GestureKind::Swipe, Direction::Up) => "swipe_up",
            (GestureKind::Swipe, Direction::Down) => "swipe_down",
            (GestureKind::Swipe, Direction::Left) => "swipe_left",
            (GestureKind::Swipe, Direction::Right) => "swipe_right",
            (kind, _) => kind.label(),
        }
    }
}
