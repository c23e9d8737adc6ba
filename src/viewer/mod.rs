//! Viewer controller: which pages are materialized, which page is current, and
//! how that page is mirrored into the URL.

mod layout;
mod nav;
mod resolver;
mod visibility;
mod zoom;

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::url::{HistoryBackend, HistoryMode, Location, UrlSynchronizer};

pub use layout::PageLayout;
pub use nav::{NavigationController, NavigationPhase, NavigationRequest, NavigationSettings};
pub use resolver::{CurrentPageResolver, VisibilityObservation, dominant_page};
pub use visibility::{RetentionPolicy, compute_buffered_set, retain_pages};
pub use zoom::{ZoomMode, ZoomState, base_width_for};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentState {
    Loading,
    Ready { total_pages: usize },
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: if width.is_finite() { width.max(0.0) } else { 0.0 },
            height: if height.is_finite() { height.max(0.0) } else { 0.0 },
        }
    }
}

/// Where the host should scroll for a programmatic navigation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub page: usize,
    pub offset: f32,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerSettings {
    pub navigation: NavigationSettings,
    pub visibility_threshold: f32,
    pub debounce: Duration,
    pub page_gap: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for ViewerSettings {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            navigation: NavigationSettings {
                buffer_radius: config.buffer_radius,
                retention: config.retention_policy(),
                settle_delay: config.settle_delay(),
                initial_settle_delay: config.initial_settle_delay(),
                scroll_end_grace: config.debounce(),
            },
            visibility_threshold: config.visibility_threshold,
            debounce: config.debounce(),
            page_gap: config.page_gap,
        }
    }
}

pub struct Viewer<H> {
    title: String,
    state: DocumentState,
    settings: ViewerSettings,
    nav: NavigationController,
    resolver: CurrentPageResolver,
    zoom: ZoomState,
    layout: PageLayout,
    url: UrlSynchronizer<H>,
    viewport: Viewport,
    scroll_top: f32,
    pending_initial_page: usize,
}

impl<H: HistoryBackend> Viewer<H> {
    /// Builds a viewer for `document`; the initial page is read from the URL.
    pub fn new(
        document: impl Into<String>,
        title: impl Into<String>,
        history: H,
        settings: ViewerSettings,
        viewport: Viewport,
    ) -> Self {
        let url = UrlSynchronizer::new(document, history);
        let pending_initial_page = url.read_page();
        Self {
            title: title.into(),
            state: DocumentState::Loading,
            settings,
            nav: NavigationController::new(settings.navigation),
            resolver: CurrentPageResolver::new(settings.visibility_threshold, settings.debounce),
            zoom: ZoomState::default(),
            layout: PageLayout::empty(),
            url,
            viewport,
            scroll_top: 0.0,
            pending_initial_page,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn document_state(&self) -> &DocumentState {
        &self.state
    }

    pub fn total_pages(&self) -> Option<usize> {
        self.nav.total_pages()
    }

    pub fn current_page(&self) -> usize {
        self.nav.current_page()
    }

    pub fn rendered_pages(&self) -> &BTreeSet<usize> {
        self.nav.rendered_pages()
    }

    pub fn is_rendered(&self, page: usize) -> bool {
        self.nav.rendered_pages().contains(&page)
    }

    pub fn phase(&self) -> NavigationPhase {
        self.nav.phase()
    }

    pub fn zoom(&self) -> ZoomState {
        self.zoom
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn location(&self) -> &Location {
        self.url.location()
    }

    pub fn history(&self) -> &H {
        self.url.history()
    }

    pub fn render_width(&self) -> u32 {
        self.layout.page_width().round().max(1.0) as u32
    }

    pub fn on_document_loaded(&mut self, total_pages: usize, now: Instant) -> Option<ScrollRequest> {
        if total_pages == 0 {
            self.on_document_failed("document has no pages");
            return None;
        }

        info!(title = %self.title, total_pages, "document loaded");
        self.state = DocumentState::Ready { total_pages };
        self.nav.reset(total_pages);
        self.resolver.reset();
        self.layout = PageLayout::new(
            total_pages,
            self.zoom.render_width(self.viewport.width),
            self.settings.page_gap,
        );
        self.scroll_top = 0.0;

        let request = self.nav.seed_initial_page(self.pending_initial_page, now)?;
        Some(self.apply_navigation(request))
    }

    pub fn on_document_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(title = %self.title, %message, "document failed to load");
        self.state = DocumentState::Failed { message };
        self.nav.clear();
        self.resolver.reset();
        self.layout = PageLayout::empty();
        self.scroll_top = 0.0;
    }

    pub fn next_page(&mut self, now: Instant) -> Option<ScrollRequest> {
        let request = self.nav.next_page(now)?;
        Some(self.apply_navigation(request))
    }

    pub fn previous_page(&mut self, now: Instant) -> Option<ScrollRequest> {
        let request = self.nav.previous_page(now)?;
        Some(self.apply_navigation(request))
    }

    /// Explicit navigation; before the document loads, a positive page is kept as
    /// the page to open at.
    pub fn go_to_page(&mut self, page: usize, now: Instant) -> Option<ScrollRequest> {
        if self.state == DocumentState::Loading {
            if page >= 1 {
                self.pending_initial_page = page;
            }
            return None;
        }
        let request = self.nav.go_to_page(page, now)?;
        Some(self.apply_navigation(request))
    }

    /// Jump-to-page form input. Anything but a page number is dropped silently.
    pub fn submit_page_input(&mut self, input: &str, now: Instant) -> Option<ScrollRequest> {
        let page = input.trim().parse::<usize>().ok()?;
        self.go_to_page(page, now)
    }

    pub fn scroll_by(&mut self, delta: f32, now: Instant) {
        self.on_scroll(self.scroll_top + delta, now);
    }

    /// A scroll position reported by the host.
    pub fn on_scroll(&mut self, scroll_top: f32, now: Instant) {
        self.scroll_top = self.clamp_scroll(scroll_top);
        if self.nav.suppresses_passive_updates() {
            self.resolver.reset();
            return;
        }
        let observations = self.layout.observe(self.scroll_top, self.viewport.height);
        self.resolver.observe(&observations, self.nav.current_page(), now);
    }

    pub fn on_scroll_end(&mut self, generation: u64, now: Instant) -> bool {
        self.nav.on_scroll_end(generation, now)
    }

    /// Advances timers. Returns the page committed by scroll tracking, if any.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        if self.nav.tick(now) {
            // Re-evaluate from where the viewport actually ended up.
            let observations = self.layout.observe(self.scroll_top, self.viewport.height);
            self.resolver.observe(&observations, self.nav.current_page(), now);
        }
        if self.nav.suppresses_passive_updates() {
            return None;
        }

        let page = self.resolver.poll(now)?;
        if !self.nav.commit_passive(page) {
            return None;
        }
        debug!(page, "current page follows scroll");
        self.url.write_page(page, HistoryMode::Replace);
        Some(page)
    }

    /// A page finished rendering; its real aspect ratio refines the layout.
    pub fn on_page_rendered(&mut self, page: usize, aspect_ratio: f32) -> bool {
        if !self.layout.record_aspect_ratio(page, aspect_ratio) {
            return false;
        }
        if let NavigationPhase::Seeking { target, .. } = self.nav.phase() {
            self.scroll_top = self.clamp_scroll(self.layout.offset_of(target));
        }
        true
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.relayout();
    }

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
        self.relayout();
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
        self.relayout();
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
        self.relayout();
    }

    pub fn fit_to_width(&mut self) {
        self.zoom.set_fit_to_width();
        self.relayout();
    }

    pub fn fit_to_page(&mut self) {
        let aspect = self.layout.aspect_ratio(self.current_page());
        self.zoom
            .set_fit_to_page(self.viewport.width, self.viewport.height, aspect);
        self.relayout();
    }

    fn apply_navigation(&mut self, request: NavigationRequest) -> ScrollRequest {
        self.resolver.reset();
        self.url.write_page(request.page, request.history);
        self.scroll_top = self.clamp_scroll(self.layout.offset_of(request.page));
        ScrollRequest {
            page: request.page,
            offset: self.scroll_top,
            generation: request.generation,
        }
    }

    // A new page width re-anchors the current page at the top; otherwise the
    // scroll position only has to stay in range.
    fn relayout(&mut self) {
        let page_width = self.zoom.render_width(self.viewport.width);
        let width_changed = (page_width - self.layout.page_width()).abs() > f32::EPSILON;
        self.layout.set_page_width(page_width);
        if self.nav.total_pages().is_none() {
            return;
        }
        let anchor = if width_changed {
            self.layout.offset_of(self.current_page())
        } else {
            self.scroll_top
        };
        self.scroll_top = self.clamp_scroll(anchor);
    }

    fn clamp_scroll(&self, scroll_top: f32) -> f32 {
        if !scroll_top.is_finite() {
            return 0.0;
        }
        scroll_top.clamp(0.0, self.layout.max_scroll(self.viewport.height))
    }
}
