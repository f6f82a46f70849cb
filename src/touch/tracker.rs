use heapless::Vec;

use super::{
    config::MAX_TOUCHES,
    types::{RawTouch, TouchPoint},
};

/// Live contacts keyed by touch id, oldest first.
#[derive(Clone, Debug, Default)]
pub struct TouchTracker {
    points: Vec<TouchPoint, MAX_TOUCHES>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// An empty list is malformed for a start and leaves the map untouched.
    pub fn on_start(&mut self, touches: &[RawTouch], time_ms: u64) {
        if touches.is_empty() {
            return;
        }
        self.sync(touches, time_ms);
    }

    pub fn on_move(&mut self, touches: &[RawTouch], time_ms: u64) {
        if touches.is_empty() {
            return;
        }
        self.sync(touches, time_ms);
    }

    /// `touches` is what remains on the surface; an empty list ends tracking.
    pub fn on_end(&mut self, touches: &[RawTouch], time_ms: u64) {
        self.sync(touches, time_ms);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<TouchPoint> {
        self.points.iter().copied().find(|p| p.id == id)
    }

    pub fn oldest(&self) -> Option<TouchPoint> {
        self.points.first().copied()
    }

    /// The two longest-held contacts.
    pub fn pair(&self) -> Option<(TouchPoint, TouchPoint)> {
        match self.points.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchPoint> {
        self.points.iter()
    }

    // The event's touch list is authoritative: ids it no longer carries are
    // dropped, known ids are refreshed in place, new ids are appended.
    fn sync(&mut self, touches: &[RawTouch], time_ms: u64) {
        self.points
            .retain(|point| touches.iter().any(|touch| touch.id == point.id));

        for touch in touches {
            let fresh = TouchPoint::from_raw(*touch, time_ms);
            if let Some(slot) = self.points.iter_mut().find(|p| p.id == touch.id) {
                *slot = fresh;
            } else if self.points.push(fresh).is_err() {
                log::warn!(
                    "gesture: tracker full, ignoring touch id={} ({} live)",
                    touch.id,
                    MAX_TOUCHES
                );
            }
        }
    }
}
