use super::types::{Edge, TouchPoint};

/// First boundary (left, right, top, bottom) the point lies within
/// `margin` of, if any. A surface without a known size has no edges.
pub fn edge_at(point: TouchPoint, width: f32, height: f32, margin: f32) -> Option<Edge> {
    if width <= 0.0 || height <= 0.0 {
        None
    } else if point.x <= margin {
        Some(Edge::Left)
    } else if point.x >= width - margin {
        Some(Edge::Right)
    } else if point.y <= margin {
        Some(Edge::Top)
    } else if point.y >= height - margin {
        Some(Edge::Bottom)
    } else {
        None
    }
}
