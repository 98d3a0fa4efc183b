//! Pointer event frames and the multi-pointer transform math derived from
//! them.
//!
//! A [`PointerEvent`] carries one [`PointerChange`] per pointer the host is
//! tracking, each with its current and previous position. Zoom, pan and
//! centroid size are computed only over pointers that were pressed both
//! before and after the change, so a finger landing or lifting never reads as
//! motion.

use crate::geometry::Offset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Finger(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerChange {
    pub id: PointerId,
    /// Milliseconds since the host's time origin.
    pub uptime_ms: u64,
    pub position: Offset,
    pub pressed: bool,
    pub previous_uptime_ms: u64,
    pub previous_position: Offset,
    pub previous_pressed: bool,
    consumed: bool,
}

impl PointerChange {
    pub fn new(
        id: PointerId,
        uptime_ms: u64,
        position: Offset,
        pressed: bool,
        previous_uptime_ms: u64,
        previous_position: Offset,
        previous_pressed: bool,
    ) -> Self {
        Self {
            id,
            uptime_ms,
            position,
            pressed,
            previous_uptime_ms,
            previous_position,
            previous_pressed,
            consumed: false,
        }
    }

    pub fn changed_to_down(&self) -> bool {
        !self.consumed && self.pressed && !self.previous_pressed
    }

    pub fn changed_to_up(&self) -> bool {
        !self.consumed && !self.pressed && self.previous_pressed
    }

    pub fn position_change(&self) -> Offset {
        self.position - self.previous_position
    }

    /// Marks this change as handled so other consumers skip it.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn is_tracking(&self) -> bool {
        self.pressed && self.previous_pressed
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerEvent {
    pub changes: Vec<PointerChange>,
}

impl PointerEvent {
    pub fn new(changes: Vec<PointerChange>) -> Self {
        Self { changes }
    }

    pub fn any_pressed(&self) -> bool {
        self.changes.iter().any(|c| c.pressed)
    }

    pub fn any_consumed(&self) -> bool {
        self.changes.iter().any(PointerChange::is_consumed)
    }

    pub fn consume_all(&mut self) {
        self.changes.iter_mut().for_each(PointerChange::consume);
    }

    /// Average position of the tracked pointers, or `None` if no pointer was
    /// pressed on both sides of this event.
    pub fn centroid(&self, use_current: bool) -> Option<Offset> {
        let mut sum = Offset::ZERO;
        let mut count = 0usize;
        for change in self.changes.iter().filter(|c| c.is_tracking()) {
            sum += if use_current {
                change.position
            } else {
                change.previous_position
            };
            count += 1;
        }
        (count > 0).then(|| sum / count as f32)
    }

    /// Average distance of the tracked pointers from their centroid. Zero for
    /// a single pointer.
    pub fn centroid_size(&self, use_current: bool) -> f32 {
        let Some(centroid) = self.centroid(use_current) else {
            return 0.0;
        };
        let mut distance_sum = 0.0;
        let mut count = 0usize;
        for change in self.changes.iter().filter(|c| c.is_tracking()) {
            let position = if use_current {
                change.position
            } else {
                change.previous_position
            };
            distance_sum += (position - centroid).distance();
            count += 1;
        }
        distance_sum / count as f32
    }

    /// Movement of the centroid across this event.
    pub fn pan(&self) -> Offset {
        match (self.centroid(true), self.centroid(false)) {
            (Some(current), Some(previous)) => current - previous,
            _ => Offset::ZERO,
        }
    }

    /// Ratio of the current centroid size to the previous one; `1.0` when
    /// either is zero.
    pub fn zoom(&self) -> f32 {
        let current = self.centroid_size(true);
        let previous = self.centroid_size(false);
        if current == 0.0 || previous == 0.0 {
            1.0
        } else {
            current / previous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(id: u64, from: (f32, f32), to: (f32, f32)) -> PointerChange {
        PointerChange::new(
            PointerId::Finger(id),
            16,
            Offset::new(to.0, to.1),
            true,
            0,
            Offset::new(from.0, from.1),
            true,
        )
    }

    #[test]
    fn single_pointer_pans_without_zoom() {
        let event = PointerEvent::new(vec![moved(0, (10.0, 10.0), (13.0, 6.0))]);
        assert_eq!(event.pan(), Offset::new(3.0, -4.0));
        assert_eq!(event.zoom(), 1.0);
        assert_eq!(event.centroid_size(false), 0.0);
    }

    #[test]
    fn spreading_fingers_zooms_around_centroid() {
        let event = PointerEvent::new(vec![
            moved(0, (40.0, 50.0), (30.0, 50.0)),
            moved(1, (60.0, 50.0), (70.0, 50.0)),
        ]);
        assert_eq!(event.centroid(true), Some(Offset::new(50.0, 50.0)));
        assert_eq!(event.centroid_size(false), 10.0);
        assert_eq!(event.centroid_size(true), 20.0);
        assert_eq!(event.zoom(), 2.0);
        assert_eq!(event.pan(), Offset::ZERO);
    }

    #[test]
    fn landing_pointer_is_not_motion() {
        let landing = PointerChange::new(
            PointerId::Finger(1),
            16,
            Offset::new(500.0, 500.0),
            true,
            16,
            Offset::new(500.0, 500.0),
            false,
        );
        let event = PointerEvent::new(vec![moved(0, (0.0, 0.0), (0.0, 0.0)), landing]);
        assert!(landing.changed_to_down());
        assert_eq!(event.pan(), Offset::ZERO);
        assert_eq!(event.zoom(), 1.0);
    }

    #[test]
    fn consumed_changes_no_longer_report_transitions() {
        let mut change = PointerChange::new(
            PointerId::Mouse,
            0,
            Offset::ZERO,
            true,
            0,
            Offset::ZERO,
            false,
        );
        assert!(change.changed_to_down());
        change.consume();
        assert!(change.is_consumed());
        assert!(!change.changed_to_down());
    }
}
