use std::path::Path;
use std::sync::Arc;

use crate::error::AppResult;

/// Aspect ratio (height / width) assumed for pages that have not been measured yet.
pub const NOMINAL_ASPECT_RATIO: f32 = 1.4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

impl RgbaFrame {
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// A rasterized page together with the natural aspect ratio it was drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// 1-based page number.
    pub page: usize,
    pub frame: RgbaFrame,
    pub aspect_ratio: f32,
}

/// The rendering collaborator. Page numbers are 1-based.
pub trait DocumentBackend: Send {
    fn location(&self) -> &Path;
    fn page_count(&self) -> usize;
    fn page_size(&self, page: usize) -> AppResult<(f32, f32)>;
    fn render_page(&self, page: usize, target_width: u32) -> AppResult<RenderedPage>;
    fn extract_text(&self, page: usize) -> AppResult<String>;
}

/// Opens a backend for a document location. Workers open their own handle.
pub trait DocumentLoader: Send + Sync {
    fn open(&self, location: &Path) -> AppResult<Box<dyn DocumentBackend>>;
}

pub fn aspect_ratio_of(width: f32, height: f32) -> f32 {
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return NOMINAL_ASPECT_RATIO;
    }
    height / width
}

#[cfg(test)]
mod tests {
    use super::{NOMINAL_ASPECT_RATIO, aspect_ratio_of};

    #[test]
    fn aspect_ratio_falls_back_for_degenerate_sizes() {
        assert_eq!(aspect_ratio_of(0.0, 792.0), NOMINAL_ASPECT_RATIO);
        assert_eq!(aspect_ratio_of(612.0, f32::NAN), NOMINAL_ASPECT_RATIO);
        assert!((aspect_ratio_of(612.0, 792.0) - 1.294).abs() < 0.001);
    }
}
