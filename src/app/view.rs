use ratatui::layout::Rect;

use crate::render::PageFrames;
use crate::ui::{PageSlot, SlotContent};
use crate::url::HistoryBackend;
use crate::viewer::Viewer;

use super::constants::CELL_SIZE_PX;

/// Projects the page column onto terminal cells, keeping only pages inside `area`.
pub(crate) fn page_slots<'a, H: HistoryBackend>(
    viewer: &Viewer<H>,
    frames: &'a PageFrames,
    area: Rect,
) -> Vec<PageSlot<'a>> {
    let layout = viewer.layout();
    if area.width == 0 || area.height == 0 || layout.total_pages() == 0 {
        return Vec::new();
    }

    let columns = ((layout.page_width() / CELL_SIZE_PX.0).round() as u16).clamp(1, area.width);
    let x = area.x + (area.width - columns) / 2;
    let scroll_top = viewer.scroll_top();
    let view_bottom = scroll_top + f32::from(area.height) * CELL_SIZE_PX.1;

    let mut slots = Vec::new();
    let mut top = 0.0_f32;
    for page in 1..=layout.total_pages() {
        let height = layout.page_height(page);
        let bottom = top + height;
        if top >= view_bottom {
            break;
        }
        if bottom > scroll_top {
            if let Some(slot) = project(viewer, frames, area, page, top - scroll_top, height) {
                slots.push(PageSlot {
                    area: Rect::new(x, slot.area.y, columns, slot.area.height),
                    ..slot
                });
            }
        }
        top = bottom + layout.gap();
    }
    slots
}

fn project<'a, H: HistoryBackend>(
    viewer: &Viewer<H>,
    frames: &'a PageFrames,
    area: Rect,
    page: usize,
    relative_top: f32,
    height: f32,
) -> Option<PageSlot<'a>> {
    let full_height = ((height / CELL_SIZE_PX.1).round() as u16).max(1);
    let row = (relative_top / CELL_SIZE_PX.1).floor() as i32;
    let clip_top = u16::try_from(-row.min(0)).unwrap_or(u16::MAX);
    let start = u16::try_from(row.max(0)).ok()?;
    if start >= area.height || clip_top >= full_height {
        return None;
    }
    let rows = (full_height - clip_top).min(area.height - start);

    let content = match frames.get(page) {
        Some(frame) => SlotContent::Framed(frame),
        None if viewer.is_rendered(page) => SlotContent::Rendering,
        None => SlotContent::Placeholder,
    };

    Some(PageSlot {
        page,
        area: Rect::new(area.x, area.y + start, area.width, rows),
        clip_top,
        full_height,
        content,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use ratatui::layout::Rect;

    use crate::render::PageFrames;
    use crate::ui::SlotContent;
    use crate::url::{Location, MemoryHistory};
    use crate::viewer::{Viewer, ViewerSettings, Viewport};

    use super::page_slots;

    fn loaded_viewer(url: &str) -> Viewer<MemoryHistory> {
        let history = MemoryHistory::new(Location::parse(url).expect("valid url"));
        let mut viewer = Viewer::new(
            "manual",
            "User Manual",
            history,
            ViewerSettings::default(),
            Viewport::new(800.0, 400.0),
        );
        viewer.on_document_loaded(5, Instant::now());
        viewer
    }

    #[test]
    fn first_page_starts_at_the_top_row() {
        let viewer = loaded_viewer("/manual");
        let frames = PageFrames::default();
        let slots = page_slots(&viewer, &frames, Rect::new(0, 0, 80, 20));

        let first = slots.first().expect("page 1 is visible");
        assert_eq!(first.page, 1);
        assert_eq!(first.area.y, 0);
        assert_eq!(first.clip_top, 0);
        assert!(matches!(first.content, SlotContent::Rendering));
        assert!(slots.iter().all(|slot| slot.area.bottom() <= 20));
    }

    #[test]
    fn slots_follow_scroll_position() {
        let viewer = loaded_viewer("/manual/3");
        let frames = PageFrames::default();
        let slots = page_slots(&viewer, &frames, Rect::new(0, 0, 80, 20));

        assert_eq!(slots.first().map(|slot| slot.page), Some(3));
        assert!(slots.iter().all(|slot| slot.page >= 3));
    }

    #[test]
    fn empty_area_has_no_slots() {
        let viewer = loaded_viewer("/manual");
        let frames = PageFrames::default();
        assert!(page_slots(&viewer, &frames, Rect::new(0, 0, 0, 0)).is_empty());
    }
}
