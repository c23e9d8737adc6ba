use std::collections::{BTreeMap, BTreeSet};

use crate::backend::RenderedPage;

use super::worker::RenderKey;

/// Rasterized frames for the pages currently materialized, one per page.
#[derive(Debug, Clone, Default)]
pub struct PageFrames {
    frames: BTreeMap<usize, RenderedPage>,
    memory_bytes: usize,
}

impl PageFrames {
    pub fn get(&self, page: usize) -> Option<&RenderedPage> {
        self.frames.get(&page)
    }

    /// True when `key.page` has a frame at exactly `key.width`.
    pub fn contains(&self, key: RenderKey) -> bool {
        self.frames
            .get(&key.page)
            .is_some_and(|frame| frame.frame.width == key.width)
    }

    pub fn insert(&mut self, page: RenderedPage) {
        self.memory_bytes += page.frame.byte_len();
        if let Some(old) = self.frames.insert(page.page, page) {
            self.memory_bytes -= old.frame.byte_len();
        }
    }

    /// Drops frames of pages outside `keep`; returns how many were dropped.
    pub fn retain_pages(&mut self, keep: &BTreeSet<usize>) -> usize {
        let before = self.frames.len();
        let mut freed = 0;
        self.frames.retain(|page, frame| {
            let kept = keep.contains(page);
            if !kept {
                freed += frame.frame.byte_len();
            }
            kept
        });
        self.memory_bytes -= freed;
        before - self.frames.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.memory_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn memory_bytes(&self) -> usize {
        self.memory_bytes
    }
}

/// Renders still missing for the materialized set, nearest to `focus` first.
pub fn render_plan(
    rendered: &BTreeSet<usize>,
    focus: usize,
    width: u32,
    frames: &PageFrames,
) -> Vec<RenderKey> {
    let mut plan: Vec<RenderKey> = rendered
        .iter()
        .map(|&page| RenderKey { page, width })
        .filter(|key| !frames.contains(*key))
        .collect();
    plan.sort_by_key(|key| (key.page.abs_diff(focus), key.page));
    plan
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use crate::backend::{RenderedPage, RgbaFrame};

    use super::{PageFrames, RenderKey, render_plan};

    fn page(page: usize, width: u32) -> RenderedPage {
        RenderedPage {
            page,
            frame: RgbaFrame {
                width,
                height: width,
                pixels: Arc::from(vec![0_u8; (width * width * 4) as usize]),
            },
            aspect_ratio: 1.0,
        }
    }

    #[test]
    fn plan_skips_current_frames_and_orders_by_distance() {
        let mut frames = PageFrames::default();
        frames.insert(page(4, 10));
        frames.insert(page(5, 20));

        let rendered = BTreeSet::from([3, 4, 5, 6, 7]);
        let plan = render_plan(&rendered, 5, 10, &frames);
        let pages: Vec<usize> = plan.iter().map(|key| key.page).collect();
        assert_eq!(pages, vec![5, 6, 3, 7]);
        assert!(plan.iter().all(|key| key.width == 10));
        assert!(frames.contains(RenderKey { page: 4, width: 10 }));
    }

    #[test]
    fn retain_tracks_memory() {
        let mut frames = PageFrames::default();
        frames.insert(page(1, 2));
        frames.insert(page(2, 2));
        frames.insert(page(2, 4));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.memory_bytes(), 16 + 64);

        assert_eq!(frames.retain_pages(&BTreeSet::from([2])), 1);
        assert_eq!(frames.memory_bytes(), 64);
        frames.clear();
        assert!(frames.is_empty());
        assert_eq!(frames.memory_bytes(), 0);
    }
}
