use crate::backend::NOMINAL_ASPECT_RATIO;

use super::resolver::VisibilityObservation;

/// Vertical stack of pages: placeholder heights until a page reports its real
/// aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    page_width: f32,
    gap: f32,
    aspect_ratios: Vec<Option<f32>>,
}

impl PageLayout {
    pub fn new(total_pages: usize, page_width: f32, gap: f32) -> Self {
        Self {
            page_width: page_width.max(1.0),
            gap: gap.max(0.0),
            aspect_ratios: vec![None; total_pages],
        }
    }

    pub fn empty() -> Self {
        Self::new(0, 1.0, 0.0)
    }

    pub fn total_pages(&self) -> usize {
        self.aspect_ratios.len()
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn set_page_width(&mut self, page_width: f32) {
        if page_width.is_finite() {
            self.page_width = page_width.max(1.0);
        }
    }

    /// Stores a measured aspect ratio; returns true when the page height changed.
    pub fn record_aspect_ratio(&mut self, page: usize, aspect_ratio: f32) -> bool {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return false;
        }
        let Some(slot) = page
            .checked_sub(1)
            .and_then(|index| self.aspect_ratios.get_mut(index))
        else {
            return false;
        };
        let changed = *slot != Some(aspect_ratio);
        *slot = Some(aspect_ratio);
        changed
    }

    pub fn aspect_ratio(&self, page: usize) -> Option<f32> {
        page.checked_sub(1)
            .and_then(|index| self.aspect_ratios.get(index).copied().flatten())
    }

    pub fn page_height(&self, page: usize) -> f32 {
        self.page_width * self.aspect_ratio(page).unwrap_or(NOMINAL_ASPECT_RATIO)
    }

    /// Top edge of `page`; pages past the end clamp to the last one.
    pub fn offset_of(&self, page: usize) -> f32 {
        let page = page.clamp(1, self.total_pages().max(1));
        (1..page)
            .map(|earlier| self.page_height(earlier) + self.gap)
            .sum()
    }

    pub fn total_height(&self) -> f32 {
        let total = self.total_pages();
        if total == 0 {
            return 0.0;
        }
        self.offset_of(total) + self.page_height(total)
    }

    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.total_height() - viewport_height.max(0.0)).max(0.0)
    }

    /// Visibility of every page intersecting `[scroll_top, scroll_top + viewport_height)`.
    ///
    /// The ratio is relative to the part of the page that could fit on screen, so a
    /// page taller than the viewport still reaches 1.0 when it fills it.
    pub fn observe(&self, scroll_top: f32, viewport_height: f32) -> Vec<VisibilityObservation> {
        let viewport_height = viewport_height.max(0.0);
        if viewport_height == 0.0 {
            return Vec::new();
        }
        let view_top = scroll_top.max(0.0);
        let view_bottom = view_top + viewport_height;
        let view_center = view_top + viewport_height / 2.0;

        let mut observations = Vec::new();
        let mut top = 0.0_f32;
        for page in 1..=self.total_pages() {
            let height = self.page_height(page);
            let bottom = top + height;
            if top >= view_bottom {
                break;
            }

            let visible = bottom.min(view_bottom) - top.max(view_top);
            if visible > 0.0 {
                let ratio = (visible / height.min(viewport_height)).clamp(0.0, 1.0);
                let center_distance = top + height / 2.0 - view_center;
                observations.push(
                    VisibilityObservation::new(page, ratio).with_center_distance(center_distance),
                );
            }
            top = bottom + self.gap;
        }
        observations
    }
}

#[cfg(test)]
mod tests {
    use super::PageLayout;

    fn approx(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-3
    }

    #[test]
    fn offsets_use_nominal_height_until_measured() {
        let mut layout = PageLayout::new(3, 100.0, 10.0);
        assert!(approx(layout.offset_of(1), 0.0));
        assert!(approx(layout.offset_of(2), 150.0));
        assert!(approx(layout.offset_of(3), 300.0));

        assert!(layout.record_aspect_ratio(1, 1.0));
        assert!(!layout.record_aspect_ratio(1, 1.0));
        assert!(approx(layout.offset_of(2), 110.0));
        assert!(approx(layout.total_height(), 110.0 + 150.0 + 140.0));
    }

    #[test]
    fn record_ignores_bad_input() {
        let mut layout = PageLayout::new(2, 100.0, 0.0);
        assert!(!layout.record_aspect_ratio(0, 1.0));
        assert!(!layout.record_aspect_ratio(3, 1.0));
        assert!(!layout.record_aspect_ratio(1, f32::NAN));
        assert!(!layout.record_aspect_ratio(1, -2.0));
    }

    #[test]
    fn observe_reports_partial_pages() {
        let mut layout = PageLayout::new(3, 100.0, 0.0);
        for page in 1..=3 {
            layout.record_aspect_ratio(page, 1.0);
        }

        let observations = layout.observe(50.0, 100.0);
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].page, 1);
        assert!(approx(observations[0].intersection_ratio, 0.5));
        assert_eq!(observations[1].page, 2);
        assert!(approx(observations[1].intersection_ratio, 0.5));
        assert!(approx(observations[0].center_distance, -50.0));
        assert!(approx(observations[1].center_distance, 50.0));
    }

    #[test]
    fn tall_page_filling_viewport_is_fully_visible() {
        let layout = PageLayout::new(2, 100.0, 0.0);
        let observations = layout.observe(20.0, 60.0);
        assert_eq!(observations.len(), 1);
        assert!(approx(observations[0].intersection_ratio, 1.0));
    }

    #[test]
    fn empty_layout_and_viewport() {
        assert!(PageLayout::empty().observe(0.0, 100.0).is_empty());
        assert!(PageLayout::new(3, 100.0, 0.0).observe(0.0, 0.0).is_empty());
        assert!(approx(PageLayout::empty().total_height(), 0.0));
    }
}
