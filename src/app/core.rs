use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseEventKind};
use ratatui::layout::{Rect, Size};
use tracing::{info, warn};

use crate::backend::DocumentLoader;
use crate::command::{Command, CommandOutcome, dispatch};
use crate::config::Config;
use crate::error::AppResult;
use crate::input::{Mode, Prompt, PromptKind, SCROLL_STEP, map_key_to_command};
use crate::registry::DocumentEntry;
use crate::render::{PageFrames, RenderKey, RenderWorkerResult, render_plan};
use crate::search::{SearchEngine, SearchState};
use crate::ui::{PromptView, StatusLine, UiLayout, ViewModel, split_layout};
use crate::url::MemoryHistory;
use crate::viewer::{DocumentState, NavigationPhase, Viewer, ViewerSettings, Viewport};

use super::constants::{CELL_SIZE_PX, RASTER_PX_PER_COLUMN};
use super::view::page_slots;

/// The terminal host: one viewer, its search and the frames drawn for it.
pub struct App {
    pub(crate) config: Config,
    pub(crate) entry: DocumentEntry,
    pub(crate) loader: Arc<dyn DocumentLoader>,
    viewer: Viewer<MemoryHistory>,
    search: SearchState,
    search_engine: SearchEngine,
    frames: PageFrames,
    // Not retried until the raster width changes.
    failed_renders: HashSet<RenderKey>,
    mode: Mode,
    prompt: Option<Prompt>,
    message: Option<String>,
    terminal_size: Size,
}

impl App {
    pub fn new(
        config: Config,
        entry: DocumentEntry,
        history: MemoryHistory,
        loader: Arc<dyn DocumentLoader>,
    ) -> AppResult<Self> {
        let search_engine = SearchEngine::with_loader(Arc::clone(&loader))?;
        let viewer = Viewer::new(
            entry.name.clone(),
            entry.title.clone(),
            history,
            ViewerSettings::from(&config.viewer),
            Viewport::new(0.0, 0.0),
        );
        let search = SearchState::new(config.search.case_sensitive);

        Ok(Self {
            config,
            entry,
            loader,
            viewer,
            search,
            search_engine,
            frames: PageFrames::default(),
            failed_renders: HashSet::new(),
            mode: Mode::Normal,
            prompt: None,
            message: None,
            terminal_size: Size::new(0, 0),
        })
    }

    pub fn viewer(&self) -> &Viewer<MemoryHistory> {
        &self.viewer
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn frames(&self) -> &PageFrames {
        &self.frames
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn layout(&self) -> UiLayout {
        let area = Rect::new(0, 0, self.terminal_size.width, self.terminal_size.height);
        let failed = matches!(self.viewer.document_state(), DocumentState::Failed { .. });
        split_layout(area, failed, self.prompt.is_some())
    }

    /// Maps the page column onto the viewer's layout units.
    pub fn resize(&mut self, size: Size) {
        self.terminal_size = size;
        let pages = self.layout().pages;
        self.viewer.resize(Viewport::new(
            f32::from(pages.width) * CELL_SIZE_PX.0,
            f32::from(pages.height) * CELL_SIZE_PX.1,
        ));
    }

    pub fn on_document_loaded(&mut self, total_pages: usize, now: Instant) {
        self.frames.clear();
        self.failed_renders.clear();
        self.viewer.on_document_loaded(total_pages, now);
        // The error banner may have disappeared.
        self.resize(self.terminal_size);
    }

    pub fn on_document_failed(&mut self, message: String) {
        self.frames.clear();
        self.viewer.on_document_failed(message);
        self.resize(self.terminal_size);
    }

    /// Terminal input. Returns true when quit was requested.
    pub fn handle_input(&mut self, event: Event, now: Instant) -> bool {
        match event {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.handle_key(key, now)
            }
            Event::Mouse(mouse) if self.mode == Mode::Normal => {
                let delta = match mouse.kind {
                    MouseEventKind::ScrollDown => SCROLL_STEP,
                    MouseEventKind::ScrollUp => -SCROLL_STEP,
                    _ => return false,
                };
                self.apply_command(Command::Scroll { delta }, now) == CommandOutcome::QuitRequested
            }
            Event::Resize(width, height) => {
                self.resize(Size::new(width, height));
                false
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match map_key_to_command(key, self.mode) {
            Some(command) => self.apply_command(command, now) == CommandOutcome::QuitRequested,
            None => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.handle_key(key);
                }
                false
            }
        }
    }

    pub fn apply_command(&mut self, command: Command, now: Instant) -> CommandOutcome {
        self.message = None;
        match command {
            Command::OpenPrompt { kind } => {
                let seed = match kind {
                    PromptKind::Search if !self.search.query().is_empty() => {
                        Some(self.search.query())
                    }
                    _ => None,
                };
                self.prompt = Some(Prompt::new(kind, seed));
                self.mode = Mode::Prompt(kind);
                self.resize(self.terminal_size);
                CommandOutcome::Applied
            }
            Command::SubmitPrompt => {
                let Some(prompt) = self.close_prompt() else {
                    return CommandOutcome::Noop;
                };
                self.apply_command(prompt.into_command(), now)
            }
            Command::Cancel => match self.close_prompt() {
                Some(_) => CommandOutcome::Applied,
                None => CommandOutcome::Noop,
            },
            Command::Search { query } => {
                if let Err(err) =
                    self.search
                        .submit(&mut self.search_engine, &self.entry.location, &query)
                {
                    warn!(error = %err, "search could not start");
                    self.message = Some(err.to_string());
                }
                CommandOutcome::Applied
            }
            command => dispatch(&mut self.viewer, command, now),
        }
    }

    /// Timer work: search progress, settle deadlines, scroll tracking.
    pub fn on_tick(&mut self, now: Instant, renders_in_flight: usize) -> bool {
        let mut changed = self.search.drain(&mut self.search_engine);

        // Terminal scrolls land instantly; the seek ends once its pages are drawn.
        if let NavigationPhase::Seeking { generation, .. } = self.viewer.phase()
            && renders_in_flight == 0
        {
            changed |= self.viewer.on_scroll_end(generation, now);
        }
        if let Some(page) = self.viewer.tick(now) {
            info!(page, url = %self.viewer.location(), "current page");
            changed = true;
        }
        if self.frames.retain_pages(self.viewer.rendered_pages()) > 0 {
            changed = true;
        }
        changed
    }

    pub fn on_render_result(&mut self, completed: RenderWorkerResult) -> bool {
        match completed.result {
            Ok(page) => {
                self.viewer.on_page_rendered(page.page, page.aspect_ratio);
                if !self.viewer.is_rendered(page.page) {
                    return false;
                }
                self.frames.insert(page);
                true
            }
            Err(err) => {
                warn!(page = completed.key.page, error = %err, "page render failed");
                self.failed_renders.insert(completed.key);
                self.message = Some(err.to_string());
                true
            }
        }
    }

    /// Missing renders for the materialized pages at the current raster width.
    pub fn pending_renders(&self) -> Vec<RenderKey> {
        if !matches!(self.viewer.document_state(), DocumentState::Ready { .. }) {
            return Vec::new();
        }
        let mut plan = render_plan(
            self.viewer.rendered_pages(),
            self.viewer.current_page(),
            self.raster_width(),
            &self.frames,
        );
        plan.retain(|key| !self.failed_renders.contains(key));
        plan
    }

    pub fn view_model(&self) -> ViewModel<'_> {
        let layout = self.layout();
        let zoom = self.viewer.zoom();
        ViewModel {
            document: self.viewer.document_state(),
            slots: page_slots(&self.viewer, &self.frames, layout.pages),
            status: StatusLine {
                title: self.entry.title.clone(),
                page: self
                    .viewer
                    .total_pages()
                    .map(|total| (self.viewer.current_page(), total)),
                zoom_label: zoom.mode().label(),
                zoom_scale: zoom.scale(),
                url: self.viewer.location().to_string(),
                search: self.search.status_segment(),
                message: self.message.clone(),
            },
            prompt: self.prompt.as_ref().map(|prompt| PromptView {
                kind: prompt.kind(),
                value: prompt.value(),
                cursor: prompt.cursor(),
            }),
        }
    }

    fn raster_width(&self) -> u32 {
        let columns = (self.viewer.layout().page_width() / CELL_SIZE_PX.0).round() as u32;
        columns.max(1) * RASTER_PX_PER_COLUMN
    }

    fn close_prompt(&mut self) -> Option<Prompt> {
        self.mode = Mode::Normal;
        let prompt = self.prompt.take();
        if prompt.is_some() {
            self.resize(self.terminal_size);
        }
        prompt
    }
}
