use crate::backend::NOMINAL_ASPECT_RATIO;

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.2;
pub const DEFAULT_SCALE: f32 = 1.0;
/// Widest page drawn in the auto and fit-width modes.
pub const MAX_AUTO_WIDTH: f32 = 1200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    Auto,
    FitWidth,
    FitPage,
    Custom,
}

impl ZoomMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::FitWidth => "fit-width",
            Self::FitPage => "fit-page",
            Self::Custom => "custom",
        }
    }
}

/// Zoom mode plus the scale it carries; the scale only drives layout in
/// `Custom` and `FitPage`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    mode: ZoomMode,
    scale: f32,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            mode: ZoomMode::Auto,
            scale: DEFAULT_SCALE,
        }
    }
}

impl ZoomState {
    pub fn mode(&self) -> ZoomMode {
        self.mode
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn zoom_in(&mut self) {
        self.step(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.step(-ZOOM_STEP);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_fit_to_width(&mut self) {
        self.mode = ZoomMode::FitWidth;
    }

    /// Picks a scale that fits a whole page vertically.
    ///
    /// Uses the page aspect ratio when known, else the nominal 1.4; never upscales.
    pub fn set_fit_to_page(
        &mut self,
        container_width: f32,
        available_height: f32,
        aspect_ratio: Option<f32>,
    ) {
        let aspect = aspect_ratio
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
            .unwrap_or(NOMINAL_ASPECT_RATIO);
        let width = base_width_for(container_width);
        let fit = if width > 0.0 && available_height.is_finite() && available_height > 0.0 {
            (available_height / (width * aspect)).min(1.0)
        } else {
            DEFAULT_SCALE
        };

        self.mode = ZoomMode::FitPage;
        self.scale = round_scale(fit).clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Width a page is rendered at inside a container of `container_width`.
    pub fn render_width(&self, container_width: f32) -> f32 {
        let container_width = sanitize_width(container_width);
        match self.mode {
            ZoomMode::Auto | ZoomMode::FitWidth => container_width.min(MAX_AUTO_WIDTH),
            ZoomMode::Custom | ZoomMode::FitPage => base_width_for(container_width) * self.scale,
        }
    }

    fn step(&mut self, delta: f32) {
        self.mode = ZoomMode::Custom;
        self.scale = round_scale(self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
    }
}

/// Breakpoint table for the unscaled page width.
pub fn base_width_for(container_width: f32) -> f32 {
    let width = sanitize_width(container_width);
    let base = if width < 640.0 {
        width - 32.0
    } else if width < 1024.0 {
        (width - 64.0).min(600.0)
    } else {
        (width - 128.0).min(800.0)
    };
    base.max(1.0)
}

fn sanitize_width(width: f32) -> f32 {
    if width.is_finite() { width.max(0.0) } else { 0.0 }
}

// Keeps repeated +/-0.2 steps on exact hundredths.
fn round_scale(scale: f32) -> f32 {
    (scale * 100.0).round() / 100.0
}
