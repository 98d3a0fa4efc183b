//! Gesture-scroll controller: one pointer-driven state machine that decides,
//! per gesture, whether motion zooms and pans the page surface, scrolls the
//! list, or toggles the double-tap zoom ladder, and hands release velocity to
//! a fling continuation.

use crate::config::{ControllerConfig, VerticalClaimPolicy};
use crate::error::ConfigError;
use crate::fling::{DecayFling, Fling};
use crate::geometry::Offset;
use crate::pointer::PointerEvent;
use crate::scroll::ScrollableList;
use crate::velocity::VelocityTracker;
use crate::zoom::{Extent, ZoomState};

/// Where the vertical component of an active-mode pan went.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalRoute {
    /// No vertical motion in the event.
    None,
    /// Moved the zoomed surface.
    Offset,
    /// Scrolled the list; carries the consumed delta.
    List(f32),
}

/// What a single pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// No layout yet; nothing was processed.
    Deferred,
    /// Not part of a gesture (e.g. hover, or a non-down event with no session).
    Ignored,
    Started,
    DoubleTap { scale: f32 },
    /// Motion collected while still under the touch slop.
    Accumulating,
    /// This event pushed the gesture over the slop. Not applied itself.
    Latched,
    /// Active gesture, but the event carried no motion.
    Tracking,
    Transformed { vertical: VerticalRoute },
    /// Left unconsumed for the host list to handle natively.
    Passthrough { pan: Offset },
    Ended { fling_velocity: Option<f32> },
}

/// State of one pointer-down-to-release cycle.
#[derive(Debug, Clone)]
pub struct GestureSession {
    pan: Offset,
    zoom_accum: f32,
    past_touch_slop: bool,
    velocity: VelocityTracker,
}

impl GestureSession {
    fn new() -> Self {
        Self {
            pan: Offset::ZERO,
            zoom_accum: 1.0,
            past_touch_slop: false,
            velocity: VelocityTracker::new(),
        }
    }

    pub fn is_past_touch_slop(&self) -> bool {
        self.past_touch_slop
    }

    /// Adds pre-slop motion; latches once zoom motion scaled by the pointer
    /// spread plus pan distance reaches `touch_slop`.
    fn accumulate(&mut self, zoom: f32, pan: Offset, centroid_size: f32, touch_slop: f32) -> bool {
        self.zoom_accum *= zoom;
        self.pan += pan;
        let zoom_motion = (1.0 - self.zoom_accum).abs() * centroid_size;
        let pan_motion = self.pan.distance();
        if zoom_motion + pan_motion >= touch_slop {
            self.past_touch_slop = true;
        }
        self.past_touch_slop
    }
}

#[derive(Debug)]
pub struct GestureScrollController {
    config: ControllerConfig,
    decay: DecayFling,
    zoom: ZoomState,
    layout: Option<Extent>,
    last_tap_ms: Option<u64>,
    session: Option<GestureSession>,
    fling: Option<Fling>,
}

impl GestureScrollController {
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            decay: DecayFling::default(),
            zoom: ZoomState::new(),
            layout: None,
            last_tap_ms: None,
            session: None,
            fling: None,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn layout(&self) -> Option<Extent> {
        self.layout
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_flinging(&self) -> bool {
        self.fling.is_some()
    }

    /// True while the list is being moved by a latched gesture or a fling.
    pub fn is_scroll_in_progress(&self) -> bool {
        self.is_flinging()
            || self
                .session
                .as_ref()
                .is_some_and(GestureSession::is_past_touch_slop)
    }

    /// Records the unscaled surface size for this layout pass. Existing
    /// offsets are re-clamped to the new bounds.
    pub fn set_layout(&mut self, extent: Extent) {
        if self.layout != Some(extent) {
            tracing::trace!(width = extent.width, height = extent.height, "layout captured");
        }
        self.layout = Some(extent);
        self.zoom.clamp_to(extent);
    }

    /// Forgets the layout. A gesture in progress is dropped: its remaining
    /// events would be deferred, so its release could never be seen.
    pub fn clear_layout(&mut self) {
        self.layout = None;
        if self.session.take().is_some() {
            tracing::debug!("gesture dropped with its layout");
        }
    }

    /// Processes one pointer event from the host.
    ///
    /// Changes the controller acted on are marked consumed so the host does
    /// not also scroll with them.
    pub fn on_pointer_event(
        &mut self,
        event: &mut PointerEvent,
        list: &mut impl ScrollableList,
    ) -> GestureOutcome {
        let Some(extent) = self.layout else {
            return GestureOutcome::Deferred;
        };
        if self.session.is_none() {
            return self.begin_session(event);
        }
        self.advance_session(event, extent, list)
    }

    /// Pulls events for a single gesture until it ends or `events` runs dry.
    pub fn run_gesture<I>(&mut self, events: I, list: &mut impl ScrollableList) -> GestureOutcome
    where
        I: IntoIterator<Item = PointerEvent>,
    {
        let mut outcome = GestureOutcome::Ignored;
        for mut event in events {
            outcome = self.on_pointer_event(&mut event, list);
            if matches!(
                outcome,
                GestureOutcome::Ended { .. } | GestureOutcome::Deferred
            ) {
                break;
            }
        }
        outcome
    }

    /// Ends the current gesture because the host stopped delivering its
    /// events. Whatever was already applied stays.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        self.end_session()
    }

    /// Advances the running fling by one frame. Returns `false` when there is
    /// nothing left to animate.
    pub fn on_frame(&mut self, now_ms: u64, list: &mut impl ScrollableList) -> bool {
        let Some(fling) = self.fling.as_mut() else {
            return false;
        };
        if fling.step(now_ms, list) {
            return true;
        }
        tracing::debug!("fling finished");
        self.fling = None;
        false
    }

    pub fn cancel_fling(&mut self) {
        if let Some(fling) = self.fling.take() {
            tracing::debug!(velocity = fling.initial_velocity(), "fling cancelled");
        }
    }

    fn begin_session(&mut self, event: &mut PointerEvent) -> GestureOutcome {
        let is_first_down =
            !event.changes.is_empty() && event.changes.iter().all(|c| c.changed_to_down());
        if !is_first_down {
            return GestureOutcome::Ignored;
        }

        // Direct manipulation always wins over momentum.
        self.cancel_fling();
        self.session = Some(GestureSession::new());

        let down = &mut event.changes[0];
        let uptime_ms = down.uptime_ms;
        let timeout_ms = self.config.double_tap_timeout.as_millis() as u64;
        let is_double_tap = self
            .last_tap_ms
            .is_some_and(|last| uptime_ms.saturating_sub(last) < timeout_ms);

        if is_double_tap {
            let scale = self.zoom.cycle_double_tap();
            self.last_tap_ms = None;
            down.consume();
            tracing::debug!(scale, "double tap");
            GestureOutcome::DoubleTap { scale }
        } else {
            self.last_tap_ms = Some(uptime_ms);
            tracing::debug!(uptime_ms, "gesture started");
            GestureOutcome::Started
        }
    }

    fn advance_session(
        &mut self,
        event: &mut PointerEvent,
        extent: Extent,
        list: &mut impl ScrollableList,
    ) -> GestureOutcome {
        if event.any_consumed() {
            tracing::debug!("gesture claimed by another consumer");
            return self.end_session();
        }

        let touch_slop = self.config.touch_slop;
        let Some(session) = self.session.as_mut() else {
            return GestureOutcome::Ignored;
        };

        // Velocity is only meaningful for single-pointer drags.
        if let [change] = event.changes.as_slice() {
            session.velocity.add_pointer_change(change);
        }

        let zoom_change = event.zoom();
        let pan_change = event.pan();

        let outcome = if !session.past_touch_slop {
            let centroid_size = event.centroid_size(false);
            if session.accumulate(zoom_change, pan_change, centroid_size, touch_slop) {
                tracing::trace!(pan = ?session.pan, zoom = session.zoom_accum, "past touch slop");
                GestureOutcome::Latched
            } else {
                GestureOutcome::Accumulating
            }
        } else if zoom_change != 1.0 || pan_change != Offset::ZERO {
            let horizontal_velocity = session.velocity.calculate_velocity().x;
            if self.claims(zoom_change, pan_change, horizontal_velocity) {
                let vertical = self.apply_transform(zoom_change, pan_change, extent, list);
                event.consume_all();
                GestureOutcome::Transformed { vertical }
            } else {
                GestureOutcome::Passthrough { pan: pan_change }
            }
        } else {
            GestureOutcome::Tracking
        };

        if !event.any_pressed() {
            return self.end_session();
        }
        outcome
    }

    fn claims(&self, zoom_change: f32, pan_change: Offset, horizontal_velocity: f32) -> bool {
        match self.config.vertical_policy {
            VerticalClaimPolicy::EdgeCheck => true,
            VerticalClaimPolicy::IntentThreshold {
                zoom_tolerance,
                min_horizontal_delta,
                min_horizontal_velocity,
            } => {
                (zoom_change - 1.0).abs() > zoom_tolerance
                    || pan_change.x.abs() > min_horizontal_delta
                    || horizontal_velocity.abs() > min_horizontal_velocity
            }
        }
    }

    fn apply_transform(
        &mut self,
        zoom_change: f32,
        pan_change: Offset,
        extent: Extent,
        list: &mut impl ScrollableList,
    ) -> VerticalRoute {
        self.zoom.scale_by(zoom_change);
        // A shrinking scale shrinks the bounds too.
        self.zoom.clamp_to(extent);
        self.zoom.pan_x(pan_change.x, extent);

        if pan_change.y == 0.0 {
            return VerticalRoute::None;
        }

        // The surface owns vertical motion while it is displaced, or while
        // zoomed with the list pinned against the edge it is pulled towards.
        let pulling_past_top = pan_change.y > 0.0 && !list.can_scroll_backward();
        let pushing_past_bottom = pan_change.y < 0.0 && !list.can_scroll_forward();
        if self.zoom.offset_y() != 0.0
            || (self.zoom.is_zoomed() && (pulling_past_top || pushing_past_bottom))
        {
            self.zoom.pan_y(pan_change.y, extent);
            tracing::trace!(offset_y = self.zoom.offset_y(), "vertical pan to surface");
            VerticalRoute::Offset
        } else {
            // The list is drawn scaled, so content moves at 1/scale per px.
            let consumed = list.scroll_by(-pan_change.y / self.zoom.scale());
            tracing::trace!(consumed, "vertical pan to list");
            VerticalRoute::List(consumed)
        }
    }

    fn end_session(&mut self) -> GestureOutcome {
        let Some(session) = self.session.take() else {
            return GestureOutcome::Ignored;
        };
        let velocity = session.velocity.calculate_velocity();
        let max = self.config.max_fling_velocity;
        // Finger moving up scrolls content forward.
        let fling_velocity = (-velocity.y).clamp(-max, max);

        if fling_velocity == 0.0 {
            tracing::debug!("gesture ended");
            return GestureOutcome::Ended {
                fling_velocity: None,
            };
        }
        tracing::debug!(fling_velocity, "gesture ended, fling started");
        self.fling = Some(Fling::new(self.decay, fling_velocity));
        GestureOutcome::Ended {
            fling_velocity: Some(fling_velocity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Offset;
    use crate::input::PointerTracker;
    use crate::pointer::PointerId;
    use crate::scroll::ListState;
    use pretty_assertions::assert_eq;

    const FINGER: PointerId = PointerId::Finger(0);

    fn controller() -> GestureScrollController {
        let mut controller =
            GestureScrollController::new(ControllerConfig::default()).expect("valid config");
        controller.set_layout(Extent::new(1000.0, 800.0));
        controller
    }

    fn long_list() -> ListState {
        ListState::new(vec![1000.0; 20], 0.0, 800.0)
    }

    #[test]
    fn no_layout_defers_everything() {
        let mut controller =
            GestureScrollController::new(ControllerConfig::default()).expect("valid config");
        let mut list = long_list();
        let mut tracker = PointerTracker::new();
        let mut down = tracker.press(FINGER, Offset::ZERO, 0);
        assert_eq!(
            controller.on_pointer_event(&mut down, &mut list),
            GestureOutcome::Deferred
        );
        assert!(!controller.is_gesture_active());
        assert!(!down.any_consumed());
    }

    #[test]
    fn session_latches_then_scrolls_list() {
        let mut controller = controller();
        let mut list = long_list();
        let mut tracker = PointerTracker::new();

        let mut down = tracker.press(FINGER, Offset::new(500.0, 500.0), 0);
        assert_eq!(
            controller.on_pointer_event(&mut down, &mut list),
            GestureOutcome::Started
        );

        let mut small = tracker
            .move_to(FINGER, Offset::new(500.0, 495.0), 16)
            .expect("pressed");
        assert_eq!(
            controller.on_pointer_event(&mut small, &mut list),
            GestureOutcome::Accumulating
        );
        assert_eq!(list.scroll_offset(), 0.0);

        let mut over = tracker
            .move_to(FINGER, Offset::new(500.0, 490.0), 32)
            .expect("pressed");
        assert_eq!(
            controller.on_pointer_event(&mut over, &mut list),
            GestureOutcome::Latched
        );
        assert_eq!(list.scroll_offset(), 0.0);

        let mut drag = tracker
            .move_to(FINGER, Offset::new(500.0, 440.0), 48)
            .expect("pressed");
        assert_eq!(
            controller.on_pointer_event(&mut drag, &mut list),
            GestureOutcome::Transformed {
                vertical: VerticalRoute::List(50.0)
            }
        );
        assert!(drag.changes.iter().all(|c| c.is_consumed()));
        assert_eq!(list.scroll_offset(), 50.0);
        assert_eq!(controller.zoom().offset_y(), 0.0);
    }

    #[test]
    fn consumed_event_cancels_without_rollback() {
        let mut controller = controller();
        let mut list = long_list();
        let mut tracker = PointerTracker::new();

        let mut down = tracker.press(FINGER, Offset::new(0.0, 0.0), 0);
        controller.on_pointer_event(&mut down, &mut list);
        for (i, x) in [20.0, 60.0].into_iter().enumerate() {
            let mut event = tracker
                .move_to(FINGER, Offset::new(x, 0.0), 16 * (i as u64 + 1))
                .expect("pressed");
            controller.on_pointer_event(&mut event, &mut list);
        }
        let before = *controller.zoom();

        let mut claimed = tracker
            .move_to(FINGER, Offset::new(90.0, 0.0), 64)
            .expect("pressed");
        claimed.consume_all();
        assert!(matches!(
            controller.on_pointer_event(&mut claimed, &mut list),
            GestureOutcome::Ended { .. }
        ));
        assert!(!controller.is_gesture_active());
        assert_eq!(*controller.zoom(), before);
    }

    #[test]
    fn new_down_cancels_running_fling() {
        let mut controller = controller();
        let mut list = long_list();
        let mut tracker = PointerTracker::new();

        let mut down = tracker.press(FINGER, Offset::new(500.0, 700.0), 0);
        controller.on_pointer_event(&mut down, &mut list);
        let mut y = 700.0;
        for t in 1..=6u64 {
            y -= 40.0;
            let mut event = tracker
                .move_to(FINGER, Offset::new(500.0, y), t * 10)
                .expect("pressed");
            controller.on_pointer_event(&mut event, &mut list);
        }
        let mut up = tracker
            .release(FINGER, Offset::new(500.0, y), 70)
            .expect("pressed");
        controller.on_pointer_event(&mut up, &mut list);
        assert!(controller.is_flinging());

        // Well outside the double-tap window
        let mut again = tracker.press(FINGER, Offset::new(500.0, 500.0), 1000);
        assert_eq!(
            controller.on_pointer_event(&mut again, &mut list),
            GestureOutcome::Started
        );
        assert!(!controller.is_flinging());
    }

    #[test]
    fn intent_policy_leaves_vertical_drag_to_host() {
        let config =
            ControllerConfig::default().with_vertical_policy(VerticalClaimPolicy::intent_threshold());
        let mut controller = GestureScrollController::new(config).expect("valid config");
        controller.set_layout(Extent::new(1000.0, 800.0));
        let mut list = long_list();
        let mut tracker = PointerTracker::new();

        let mut down = tracker.press(FINGER, Offset::new(500.0, 500.0), 0);
        controller.on_pointer_event(&mut down, &mut list);
        let mut latch = tracker
            .move_to(FINGER, Offset::new(500.0, 480.0), 16)
            .expect("pressed");
        assert_eq!(
            controller.on_pointer_event(&mut latch, &mut list),
            GestureOutcome::Latched
        );

        let mut vertical = tracker
            .move_to(FINGER, Offset::new(500.0, 460.0), 32)
            .expect("pressed");
        assert_eq!(
            controller.on_pointer_event(&mut vertical, &mut list),
            GestureOutcome::Passthrough {
                pan: Offset::new(0.0, -20.0)
            }
        );
        assert!(!vertical.any_consumed());
        assert_eq!(list.scroll_offset(), 0.0);
    }

    #[test]
    fn layout_change_reclamps_offsets() {
        let mut controller = controller();
        let mut list = long_list();
        let mut tracker = PointerTracker::new();

        // Double tap to 2x
        let mut first = tracker.press(FINGER, Offset::ZERO, 1000);
        controller.on_pointer_event(&mut first, &mut list);
        let mut up = tracker.release(FINGER, Offset::ZERO, 1050).expect("pressed");
        controller.on_pointer_event(&mut up, &mut list);
        let mut second = tracker.press(FINGER, Offset::ZERO, 1100);
        assert_eq!(
            controller.on_pointer_event(&mut second, &mut list),
            GestureOutcome::DoubleTap { scale: 2.0 }
        );

        // Drag right until clamped at 500
        let mut x = 0.0;
        for t in 1..=10u64 {
            x += 200.0;
            let mut event = tracker
                .move_to(FINGER, Offset::new(x, 0.0), 1100 + t * 16)
                .expect("pressed");
            controller.on_pointer_event(&mut event, &mut list);
        }
        assert_eq!(controller.zoom().offset_x(), 500.0);

        controller.set_layout(Extent::new(400.0, 800.0));
        assert_eq!(controller.zoom().offset_x(), 200.0);
    }
}
