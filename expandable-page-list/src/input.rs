//! Turns the host's per-pointer callbacks (press, move, release, lost) into
//! [`PointerEvent`] frames carrying every tracked pointer.

use crate::geometry::Offset;
use crate::pointer::{PointerChange, PointerEvent, PointerId};

#[derive(Debug, Clone, Copy)]
struct Tracked {
    id: PointerId,
    position: Offset,
    uptime_ms: u64,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    pointers: Vec<Tracked>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_pressed(&self, id: PointerId) -> bool {
        self.pointers.iter().any(|p| p.id == id)
    }

    pub fn press(&mut self, id: PointerId, position: Offset, uptime_ms: u64) -> PointerEvent {
        // A press for a pointer we still think is down means we missed its
        // release; start it over.
        self.pointers.retain(|p| p.id != id);
        let mut changes = self.stationary_changes(uptime_ms);
        changes.push(PointerChange::new(
            id, uptime_ms, position, true, uptime_ms, position, false,
        ));
        self.pointers.push(Tracked {
            id,
            position,
            uptime_ms,
        });
        PointerEvent::new(changes)
    }

    /// `None` when the pointer is not pressed (hover movement).
    pub fn move_to(
        &mut self,
        id: PointerId,
        position: Offset,
        uptime_ms: u64,
    ) -> Option<PointerEvent> {
        self.is_pressed(id).then(|| self.frame(id, position, true, uptime_ms))
    }

    pub fn release(
        &mut self,
        id: PointerId,
        position: Offset,
        uptime_ms: u64,
    ) -> Option<PointerEvent> {
        if !self.is_pressed(id) {
            return None;
        }
        let event = self.frame(id, position, false, uptime_ms);
        self.pointers.retain(|p| p.id != id);
        Some(event)
    }

    /// Forgets a pointer the host stopped reporting. Returns `true` if it was
    /// being tracked.
    pub fn lose(&mut self, id: PointerId) -> bool {
        let before = self.pointers.len();
        self.pointers.retain(|p| p.id != id);
        before != self.pointers.len()
    }

    pub fn reset(&mut self) {
        self.pointers.clear();
    }

    fn frame(&mut self, id: PointerId, position: Offset, pressed: bool, uptime_ms: u64) -> PointerEvent {
        let changes = self
            .pointers
            .iter_mut()
            .map(|tracked| {
                let (new_position, now_pressed) = if tracked.id == id {
                    (position, pressed)
                } else {
                    (tracked.position, true)
                };
                let change = PointerChange::new(
                    tracked.id,
                    uptime_ms,
                    new_position,
                    now_pressed,
                    tracked.uptime_ms,
                    tracked.position,
                    true,
                );
                tracked.position = new_position;
                tracked.uptime_ms = uptime_ms;
                change
            })
            .collect();
        PointerEvent::new(changes)
    }

    fn stationary_changes(&mut self, uptime_ms: u64) -> Vec<PointerChange> {
        self.pointers
            .iter_mut()
            .map(|tracked| {
                let change = PointerChange::new(
                    tracked.id,
                    uptime_ms,
                    tracked.position,
                    true,
                    tracked.uptime_ms,
                    tracked.position,
                    true,
                );
                tracked.uptime_ms = uptime_ms;
                change
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_move_release_cycle() {
        let mut tracker = PointerTracker::new();
        let down = tracker.press(PointerId::Mouse, Offset::new(1.0, 1.0), 0);
        assert_eq!(down.changes.len(), 1);
        assert!(down.changes[0].changed_to_down());

        let moved = tracker
            .move_to(PointerId::Mouse, Offset::new(4.0, 5.0), 16)
            .expect("pointer is pressed");
        assert_eq!(moved.pan(), Offset::new(3.0, 4.0));
        assert_eq!(moved.changes[0].previous_uptime_ms, 0);

        let up = tracker
            .release(PointerId::Mouse, Offset::new(4.0, 5.0), 32)
            .expect("pointer is pressed");
        assert!(up.changes[0].changed_to_up());
        assert!(!up.any_pressed());
        assert_eq!(tracker.pressed_count(), 0);
    }

    #[test]
    fn hover_is_ignored() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.move_to(PointerId::Mouse, Offset::ZERO, 0).is_none());
        assert!(tracker.release(PointerId::Mouse, Offset::ZERO, 0).is_none());
    }

    #[test]
    fn second_finger_shows_up_in_every_frame() {
        let mut tracker = PointerTracker::new();
        tracker.press(PointerId::Finger(1), Offset::new(40.0, 0.0), 0);
        let second = tracker.press(PointerId::Finger(2), Offset::new(60.0, 0.0), 8);
        assert_eq!(second.changes.len(), 2);
        assert_eq!(second.zoom(), 1.0);

        let spread = tracker
            .move_to(PointerId::Finger(2), Offset::new(80.0, 0.0), 16)
            .expect("finger is pressed");
        assert_eq!(spread.changes.len(), 2);
        assert_eq!(spread.zoom(), 2.0);

        let lifted = tracker
            .release(PointerId::Finger(1), Offset::new(40.0, 0.0), 24)
            .expect("finger is pressed");
        assert!(lifted.any_pressed());
        assert_eq!(tracker.pressed_count(), 1);
    }

    #[test]
    fn lose_forgets_pointer() {
        let mut tracker = PointerTracker::new();
        tracker.press(PointerId::Finger(7), Offset::ZERO, 0);
        assert!(tracker.lose(PointerId::Finger(7)));
        assert!(!tracker.lose(PointerId::Finger(7)));
    }
}
