/// Unscaled layout metrics of the zoomable surface, captured once per layout
/// pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Zoom and pan applied to the whole page list as one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl ZoomState {
    pub const MIN_SCALE: f32 = 1.0;
    pub const MAX_SCALE: f32 = 3.0;
    /// Double tap advances to the first step above the current scale and
    /// wraps back to the minimum after the last one.
    const DOUBLE_TAP_STEPS: [f32; 2] = [2.0, 3.0];

    pub fn new() -> Self {
        Self {
            scale: Self::MIN_SCALE,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale != Self::MIN_SCALE
    }

    pub fn scaled_width(&self, extent: Extent) -> f32 {
        extent.width * self.scale
    }

    pub fn scaled_height(&self, extent: Extent) -> f32 {
        extent.height * self.scale
    }

    pub fn max_offset_x(&self, extent: Extent) -> f32 {
        max_offset(extent.width, self.scaled_width(extent))
    }

    pub fn max_offset_y(&self, extent: Extent) -> f32 {
        max_offset(extent.height, self.scaled_height(extent))
    }

    /// Multiplies the scale by `ratio`, clamped to
    /// `[MIN_SCALE, MAX_SCALE]`.
    pub fn scale_by(&mut self, ratio: f32) {
        self.scale = (self.scale * ratio).clamp(Self::MIN_SCALE, Self::MAX_SCALE);
    }

    pub fn pan_x(&mut self, dx: f32, extent: Extent) {
        self.offset_x = clamp_symmetric(self.offset_x + dx, self.max_offset_x(extent));
    }

    pub fn pan_y(&mut self, dy: f32, extent: Extent) {
        self.offset_y = clamp_symmetric(self.offset_y + dy, self.max_offset_y(extent));
    }

    /// Pulls both offsets back inside the bounds for the current scale.
    pub fn clamp_to(&mut self, extent: Extent) {
        self.pan_x(0.0, extent);
        self.pan_y(0.0, extent);
    }

    /// Advances the double-tap ladder `1 → 2 → 3 → 1`. Returning to the
    /// minimum also recentres the surface.
    pub fn cycle_double_tap(&mut self) -> f32 {
        match Self::DOUBLE_TAP_STEPS
            .iter()
            .find(|&&step| self.scale < step)
        {
            Some(&step) => self.scale = step,
            None => self.reset(),
        }
        self.scale
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new()
    }
}

fn max_offset(unscaled: f32, scaled: f32) -> f32 {
    ((scaled - unscaled) / 2.0).max(0.0)
}

fn clamp_symmetric(value: f32, bound: f32) -> f32 {
    if bound <= 0.0 {
        0.0
    } else {
        value.clamp(-bound, bound)
    }
}
