//! Post-release fling continuation.
//!
//! A [`Fling`] is started from a release velocity and advanced by the host
//! once per animation frame; it never runs inline in the gesture handler.

use crate::scroll::ScrollableList;

/// Exponential decay of a scroll velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayFling {
    /// Rate of decay per second, negative.
    friction: f32,
    /// Velocity (px/s) under which the fling is considered at rest.
    velocity_threshold: f32,
}

impl DecayFling {
    const BASE_FRICTION: f32 = -4.2;

    pub fn new(friction_multiplier: f32, velocity_threshold: f32) -> Self {
        Self {
            friction: Self::BASE_FRICTION * friction_multiplier.max(f32::EPSILON),
            velocity_threshold: velocity_threshold.abs().max(f32::EPSILON),
        }
    }

    /// Distance travelled `seconds` after release.
    pub fn value_at(&self, initial_velocity: f32, seconds: f32) -> f32 {
        initial_velocity / self.friction * ((self.friction * seconds).exp() - 1.0)
    }

    /// Seconds until the velocity decays under the threshold.
    pub fn duration(&self, initial_velocity: f32) -> f32 {
        let speed = initial_velocity.abs();
        if speed <= self.velocity_threshold {
            return 0.0;
        }
        (self.velocity_threshold / speed).ln() / self.friction
    }

    /// Total distance the fling covers before coming to rest.
    pub fn target_distance(&self, initial_velocity: f32) -> f32 {
        self.value_at(initial_velocity, self.duration(initial_velocity))
    }
}

impl Default for DecayFling {
    fn default() -> Self {
        Self::new(1.0, 0.1)
    }
}

/// A running fling; drops itself when finished.
#[derive(Debug, Clone, PartialEq)]
pub struct Fling {
    decay: DecayFling,
    initial_velocity: f32,
    started_at_ms: Option<u64>,
    travelled: f32,
    duration_ms: f32,
}

impl Fling {
    /// List consumption this far under the request means an edge was hit.
    const EDGE_TOLERANCE: f32 = 0.5;

    pub fn new(decay: DecayFling, initial_velocity: f32) -> Self {
        Self {
            decay,
            initial_velocity,
            started_at_ms: None,
            travelled: 0.0,
            duration_ms: decay.duration(initial_velocity) * 1000.0,
        }
    }

    pub fn initial_velocity(&self) -> f32 {
        self.initial_velocity
    }

    /// Advances to `now_ms` and scrolls `list` by the distance covered since
    /// the previous frame. The first call only pins the start time. Returns
    /// `false` once the fling is over.
    pub fn step(&mut self, now_ms: u64, list: &mut impl ScrollableList) -> bool {
        let Some(started_at_ms) = self.started_at_ms else {
            self.started_at_ms = Some(now_ms);
            return self.duration_ms > 0.0;
        };
        let elapsed_ms = (now_ms.saturating_sub(started_at_ms) as f32).min(self.duration_ms);
        let target = self.decay.value_at(self.initial_velocity, elapsed_ms / 1000.0);
        let delta = target - self.travelled;
        self.travelled = target;

        let consumed = list.scroll_by(delta);
        if (delta - consumed).abs() > Self::EDGE_TOLERANCE {
            tracing::trace!(delta, consumed, "fling hit list edge");
            return false;
        }
        elapsed_ms < self.duration_ms
    }
}
