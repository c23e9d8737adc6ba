mod chrome;
mod layout;
mod pages;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::backend::RenderedPage;
use crate::input::PromptKind;
use crate::viewer::DocumentState;

pub use chrome::{draw_banner, draw_prompt, draw_status, status_text};
pub use layout::{UiLayout, split_layout};
pub use pages::draw_pages;

/// How one page of the column is drawn.
#[derive(Debug, Clone, Copy)]
pub enum SlotContent<'a> {
    /// A rasterized frame is available.
    Framed(&'a RenderedPage),
    /// In the materialized set, raster still pending.
    Rendering,
    Placeholder,
}

/// A page intersecting the viewport, already clipped to it.
#[derive(Debug, Clone, Copy)]
pub struct PageSlot<'a> {
    pub page: usize,
    pub area: Rect,
    /// Rows of the page cut off above the viewport.
    pub clip_top: u16,
    pub full_height: u16,
    pub content: SlotContent<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub title: String,
    pub page: Option<(usize, usize)>,
    pub zoom_label: &'static str,
    pub zoom_scale: f32,
    pub url: String,
    pub search: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PromptView<'a> {
    pub kind: PromptKind,
    pub value: &'a str,
    pub cursor: usize,
}

pub struct ViewModel<'a> {
    pub document: &'a DocumentState,
    pub slots: Vec<PageSlot<'a>>,
    pub status: StatusLine,
    pub prompt: Option<PromptView<'a>>,
}

pub fn draw(frame: &mut Frame<'_>, layout: UiLayout, view: &ViewModel<'_>) {
    if let (Some(area), DocumentState::Failed { message }) = (layout.banner, view.document) {
        draw_banner(frame, area, message);
    }
    draw_pages(frame, layout.pages, view);
    if let (Some(area), Some(prompt)) = (layout.prompt, view.prompt) {
        draw_prompt(frame, area, prompt);
    }
    draw_status(frame, layout.status, &view.status);
}
