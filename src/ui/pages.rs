use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::backend::RenderedPage;
use crate::viewer::DocumentState;

use super::layout::centered_rect;
use super::{PageSlot, SlotContent, ViewModel};

const UPPER_HALF_BLOCK: &str = "\u{2580}";

pub fn draw_pages(frame: &mut Frame<'_>, area: Rect, view: &ViewModel<'_>) {
    match view.document {
        DocumentState::Loading => {
            let text = format!("Loading {}...", view.status.title);
            let rect = centered_rect(area, text.chars().count() as u16, 1);
            frame.render_widget(Paragraph::new(text), rect);
        }
        DocumentState::Failed { .. } => {}
        DocumentState::Ready { .. } => {
            for slot in &view.slots {
                draw_slot(frame, slot);
            }
        }
    }
}

fn draw_slot(frame: &mut Frame<'_>, slot: &PageSlot<'_>) {
    let mut borders = Borders::LEFT | Borders::RIGHT;
    if slot.clip_top == 0 {
        borders |= Borders::TOP;
    }
    if slot.clip_top + slot.area.height >= slot.full_height {
        borders |= Borders::BOTTOM;
    }

    let border_style = match slot.content {
        SlotContent::Framed(_) => Style::default(),
        SlotContent::Rendering | SlotContent::Placeholder => Style::default().fg(Color::DarkGray),
    };
    let block = Block::default()
        .borders(borders)
        .border_style(border_style)
        .title(format!(" {} ", slot.page));
    let inner = block.inner(slot.area);
    frame.render_widget(block, slot.area);

    match slot.content {
        SlotContent::Framed(page) => {
            // Inner rows of the page hidden above the viewport, past the top border.
            let hidden_rows = slot.clip_top.saturating_sub(1);
            let inner_full_height = slot.full_height.saturating_sub(2).max(1);
            paint_half_blocks(frame.buffer_mut(), inner, page, hidden_rows, inner_full_height);
        }
        SlotContent::Rendering => {
            let rect = centered_rect(inner, 9, 1);
            frame.render_widget(
                Paragraph::new("rendering").style(Style::default().fg(Color::DarkGray)),
                rect,
            );
        }
        SlotContent::Placeholder => {}
    }
}

/// Nearest-neighbour downsample into upper-half-block cells, two pixel rows per cell.
fn paint_half_blocks(
    buffer: &mut Buffer,
    inner: Rect,
    page: &RenderedPage,
    hidden_rows: u16,
    inner_full_height: u16,
) {
    let frame = &page.frame;
    if inner.width == 0 || inner.height == 0 || frame.width == 0 || frame.height == 0 {
        return;
    }
    let sample_rows = u32::from(inner_full_height) * 2;

    for row in 0..inner.height {
        let page_row = u32::from(hidden_rows + row) * 2;
        for col in 0..inner.width {
            let x = u32::from(col) * frame.width / u32::from(inner.width);
            let top = pixel(page, x, page_row * frame.height / sample_rows);
            let bottom = pixel(page, x, (page_row + 1) * frame.height / sample_rows);
            if let Some(cell) = buffer.cell_mut((inner.x + col, inner.y + row)) {
                cell.set_symbol(UPPER_HALF_BLOCK)
                    .set_fg(top)
                    .set_bg(bottom);
            }
        }
    }
}

fn pixel(page: &RenderedPage, x: u32, y: u32) -> Color {
    let frame = &page.frame;
    let x = x.min(frame.width - 1);
    let y = y.min(frame.height - 1);
    let index = ((y * frame.width + x) * 4) as usize;
    match frame.pixels.get(index..index + 3) {
        Some(rgb) => Color::Rgb(rgb[0], rgb[1], rgb[2]),
        None => Color::Reset,
    }
}
