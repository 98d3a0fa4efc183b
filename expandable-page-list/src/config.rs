use crate::error::ConfigError;
use std::time::Duration;

/// How the controller decides whether an active-mode event should transform
/// the surface at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalClaimPolicy {
    /// Every active-mode event transforms the surface; the vertical component
    /// goes to the list unless the surface is offset or the list sits at an
    /// edge while zoomed.
    EdgeCheck,
    /// Only events that look intentional transform the surface. Everything
    /// else is left unconsumed for the host list to scroll natively.
    IntentThreshold {
        /// Zoom ratios within this distance of 1 do not count as zooming.
        zoom_tolerance: f32,
        /// Horizontal pan per event (px) above which the event is claimed.
        min_horizontal_delta: f32,
        /// Tracked horizontal velocity (px/s) above which the event is claimed.
        min_horizontal_velocity: f32,
    },
}

impl VerticalClaimPolicy {
    pub const fn intent_threshold() -> Self {
        VerticalClaimPolicy::IntentThreshold {
            zoom_tolerance: 0.01,
            min_horizontal_delta: 2.0,
            min_horizontal_velocity: 50.0,
        }
    }
}

impl Default for VerticalClaimPolicy {
    fn default() -> Self {
        VerticalClaimPolicy::EdgeCheck
    }
}

/// Tuning for [`GestureScrollController`](crate::controller::GestureScrollController).
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Distance in logical px a gesture must cover before it pans or zooms.
    pub touch_slop: f32,
    /// Two downs closer than this form a double tap.
    pub double_tap_timeout: Duration,
    /// Release velocities are clamped to this magnitude (px/s).
    pub max_fling_velocity: f32,
    pub vertical_policy: VerticalClaimPolicy,
}

impl ControllerConfig {
    pub const DEFAULT_TOUCH_SLOP: f32 = 8.0;
    pub const DEFAULT_DOUBLE_TAP_TIMEOUT: Duration = Duration::from_millis(300);
    pub const DEFAULT_MAX_FLING_VELOCITY: f32 = 8_000.0;

    pub fn with_touch_slop(mut self, touch_slop: f32) -> Self {
        self.touch_slop = touch_slop;
        self
    }

    pub fn with_double_tap_timeout(mut self, timeout: Duration) -> Self {
        self.double_tap_timeout = timeout;
        self
    }

    pub fn with_vertical_policy(mut self, policy: VerticalClaimPolicy) -> Self {
        self.vertical_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_non_negative("Touch slop", self.touch_slop)?;
        ConfigError::check_non_negative("Max fling velocity", self.max_fling_velocity)?;
        if let VerticalClaimPolicy::IntentThreshold {
            zoom_tolerance,
            min_horizontal_delta,
            min_horizontal_velocity,
        } = self.vertical_policy
        {
            ConfigError::check_non_negative("Zoom tolerance", zoom_tolerance)?;
            ConfigError::check_non_negative("Minimum horizontal delta", min_horizontal_delta)?;
            ConfigError::check_non_negative(
                "Minimum horizontal velocity",
                min_horizontal_velocity,
            )?;
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            touch_slop: Self::DEFAULT_TOUCH_SLOP,
            double_tap_timeout: Self::DEFAULT_DOUBLE_TAP_TIMEOUT,
            max_fling_velocity: Self::DEFAULT_MAX_FLING_VELOCITY,
            vertical_policy: VerticalClaimPolicy::default(),
        }
    }
}
