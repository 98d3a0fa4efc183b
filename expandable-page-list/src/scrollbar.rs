//! Fading scrollbar decoration for the page list.
//!
//! The scrollbar is made of a track and a knob moving across it. It fades in
//! while the list scrolls and fades out a while after scrolling stops.

use crate::error::ConfigError;
use crate::geometry::{Rect, Size};
use crate::scroll::ScrollableList;
use iced::Color;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// How long the knob is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum KnobSizing {
    /// Viewport share of the estimated content. Oscillates when items are not
    /// uniform in size.
    #[default]
    Proportional,
    /// Always this fraction of the track.
    Fixed(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollbarConfig {
    pub orientation: Orientation,
    /// Draw at the end edge (right, or bottom) instead of the start edge.
    pub align_end: bool,
    pub thickness: f32,
    pub knob_sizing: KnobSizing,
    pub knob_corner_radius: f32,
    pub track_corner_radius: f32,
    pub knob_color: Color,
    pub track_color: Color,
    /// Inset from both ends of the track.
    pub padding: f32,
    pub visible_alpha: f32,
    /// Non-zero keeps the scrollbar from ever disappearing.
    pub hidden_alpha: f32,
    pub fade_in: Duration,
    pub fade_out: Duration,
    pub fade_out_delay: Duration,
}

impl ScrollbarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.thickness > 0.0) {
            return Err(ConfigError::NonPositiveThickness(self.thickness));
        }
        if let KnobSizing::Fixed(ratio) = self.knob_sizing {
            ConfigError::check_non_negative("Fixed knob ratio", ratio)?;
            if ratio >= 1.0 {
                return Err(ConfigError::KnobRatioTooLarge(ratio));
            }
        }
        ConfigError::check_non_negative("Knob corner radius", self.knob_corner_radius)?;
        ConfigError::check_non_negative("Track corner radius", self.track_corner_radius)?;
        ConfigError::check_non_negative("Padding", self.padding)?;
        ConfigError::check_non_negative("Visible alpha", self.visible_alpha)?;
        ConfigError::check_non_negative("Hidden alpha", self.hidden_alpha)?;
        if self.hidden_alpha > self.visible_alpha {
            return Err(ConfigError::HiddenAlphaAboveVisible {
                hidden: self.hidden_alpha,
                visible: self.visible_alpha,
            });
        }
        Ok(())
    }
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            align_end: true,
            thickness: 8.0,
            knob_sizing: KnobSizing::Proportional,
            knob_corner_radius: 4.0,
            track_corner_radius: 2.0,
            knob_color: Color::from_rgb8(0x67, 0x50, 0xA4),
            track_color: Color::from_rgba8(0x1C, 0x1B, 0x1F, 0.5),
            padding: 0.0,
            visible_alpha: 1.0,
            hidden_alpha: 0.0,
            fade_in: Duration::from_millis(150),
            fade_out: Duration::from_millis(1500),
            fade_out_delay: Duration::from_millis(500),
        }
    }
}

/// Track and knob placement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarGeometry {
    pub track: Rect,
    pub knob: Rect,
    pub alpha: f32,
}

/// Linear alpha tween with a start delay.
#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    started_at: Instant,
    delay: Duration,
    duration: Duration,
}

impl Fade {
    fn value(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at);
        let Some(running) = elapsed.checked_sub(self.delay) else {
            return self.from;
        };
        if self.duration.is_zero() {
            return self.to;
        }
        let t = (running.as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
        self.from + (self.to - self.from) * t
    }
}

#[derive(Debug, Clone)]
pub struct Scrollbar {
    config: ScrollbarConfig,
    scrolling: bool,
    fade: Fade,
}

impl Scrollbar {
    pub fn new(config: ScrollbarConfig, now: Instant) -> Result<Self, ConfigError> {
        config.validate()?;
        let hidden = config.hidden_alpha;
        Ok(Self {
            config,
            scrolling: false,
            fade: Fade {
                from: hidden,
                to: hidden,
                started_at: now,
                delay: Duration::ZERO,
                duration: Duration::ZERO,
            },
        })
    }

    pub fn config(&self) -> &ScrollbarConfig {
        &self.config
    }

    /// Retargets the fade when scrolling starts or stops.
    pub fn update(&mut self, scrolling: bool, now: Instant) {
        if scrolling == self.scrolling {
            return;
        }
        let from = self.fade.value(now);
        self.scrolling = scrolling;
        self.fade = if scrolling {
            Fade {
                from,
                to: self.config.visible_alpha,
                started_at: now,
                delay: Duration::ZERO,
                duration: self.config.fade_in,
            }
        } else {
            Fade {
                from,
                to: self.config.hidden_alpha,
                started_at: now,
                delay: self.config.fade_out_delay,
                duration: self.config.fade_out,
            }
        };
    }

    pub fn alpha(&self, now: Instant) -> f32 {
        self.fade.value(now)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.fade.value(now) != self.fade.to
    }

    /// Places track and knob inside `bounds`, estimating the full list size
    /// from the first visible item. `None` when there is nothing to draw.
    pub fn geometry(
        &self,
        bounds: Size,
        list: &impl ScrollableList,
        now: Instant,
    ) -> Option<ScrollbarGeometry> {
        let alpha = self.alpha(now);
        if !self.scrolling && alpha <= 0.0 {
            return None;
        }
        let layout = list.layout_info();
        let first_item = layout.visible_items.first()?;

        let config = &self.config;
        let horizontal = config.orientation == Orientation::Horizontal;
        let padding = config.padding;
        let thickness = config.thickness;
        let viewport_size = if horizontal { bounds.width } else { bounds.height } - padding * 2.0;

        let first_item_size = first_item.size;
        let estimated_full_size = first_item_size * layout.total_items_count as f32;
        if !(estimated_full_size > 0.0) {
            return None;
        }
        let viewport_offset = list.first_visible_item_index() as f32 * first_item_size
            + list.first_visible_item_scroll_offset();

        let knob_position = viewport_offset * viewport_size / estimated_full_size + padding;
        let knob_size = match config.knob_sizing {
            KnobSizing::Fixed(ratio) => ratio * viewport_size,
            KnobSizing::Proportional => viewport_size * viewport_size / estimated_full_size,
        };

        let (track, knob) = match (horizontal, config.align_end) {
            (true, true) => (
                Rect::new(padding, bounds.height - thickness, bounds.width - padding * 2.0, thickness),
                Rect::new(knob_position, bounds.height - thickness, knob_size, thickness),
            ),
            (true, false) => (
                Rect::new(padding, 0.0, bounds.width - padding * 2.0, thickness),
                Rect::new(knob_position, 0.0, knob_size, thickness),
            ),
            (false, true) => (
                Rect::new(bounds.width - thickness, padding, thickness, bounds.height - padding * 2.0),
                Rect::new(bounds.width - thickness, knob_position, thickness, knob_size),
            ),
            (false, false) => (
                Rect::new(0.0, padding, thickness, bounds.height - padding * 2.0),
                Rect::new(0.0, knob_position, thickness, knob_size),
            ),
        };

        Some(ScrollbarGeometry { track, knob, alpha })
    }
}
