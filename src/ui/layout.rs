use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    pub banner: Option<Rect>,
    pub pages: Rect,
    pub prompt: Option<Rect>,
    pub status: Rect,
}

/// Page column on top, then an optional prompt row, then the status line.
/// The load-error banner takes the first rows when present.
pub fn split_layout(area: Rect, banner: bool, prompt: bool) -> UiLayout {
    let banner_height = if banner { 3 } else { 0 };
    let prompt_height = u16::from(prompt);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(1),
            Constraint::Length(prompt_height),
            Constraint::Length(1),
        ])
        .split(area);

    UiLayout {
        banner: banner.then_some(chunks[0]),
        pages: chunks[1],
        prompt: prompt.then_some(chunks[2]),
        status: chunks[3],
    }
}

pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.max(1).min(area.width);
    let height = height.max(1).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
