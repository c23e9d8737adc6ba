use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Wrap};

use super::{PromptView, StatusLine};

pub fn status_text(status: &StatusLine) -> String {
    let page = match status.page {
        Some((current, total)) => format!("page {current}/{total}"),
        None => "page -/-".to_string(),
    };
    let mut parts = vec![
        status.title.clone(),
        page,
        format!(
            "zoom {} {:.0}%",
            status.zoom_label,
            status.zoom_scale * 100.0
        ),
        status.url.clone(),
    ];
    if let Some(search) = &status.search {
        parts.push(search.clone());
    }
    if let Some(message) = &status.message {
        parts.push(message.clone());
    }
    parts.join(" | ")
}

pub fn draw_status(frame: &mut Frame<'_>, area: Rect, status: &StatusLine) {
    let line = Paragraph::new(status_text(status))
        .style(Style::default().add_modifier(Modifier::REVERSED))
        .wrap(Wrap { trim: true });
    frame.render_widget(line, area);
}

pub fn draw_prompt(frame: &mut Frame<'_>, area: Rect, prompt: PromptView<'_>) {
    let label = format!("{}: ", prompt.kind.label());
    let cursor_x = area
        .x
        .saturating_add(label.chars().count() as u16)
        .saturating_add(prompt.cursor as u16)
        .min(area.right().saturating_sub(1));
    frame.render_widget(Paragraph::new(format!("{label}{}", prompt.value)), area);
    frame.set_cursor_position(Position::new(cursor_x, area.y));
}

pub fn draw_banner(frame: &mut Frame<'_>, area: Rect, message: &str) {
    let banner = Paragraph::new(format!("Failed to load document: {message}"))
        .style(Style::default().fg(Color::Red))
        .block(Block::bordered().border_style(Style::default().fg(Color::Red)))
        .wrap(Wrap { trim: true });
    frame.render_widget(banner, area);
}
