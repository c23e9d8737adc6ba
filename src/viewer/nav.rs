use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::url::HistoryMode;

use super::visibility::{RetentionPolicy, retain_pages};

/// Who owns the current page right now.
///
/// Passive scroll tracking only has authority in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPhase {
    Idle,
    /// A programmatic scroll is in flight.
    Seeking {
        target: usize,
        generation: u64,
        deadline: Instant,
    },
    /// The scroll landed; layout gets a short window to stop moving.
    Settling { generation: u64, deadline: Instant },
}

impl NavigationPhase {
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Seeking { generation, .. } | Self::Settling { generation, .. } => {
                Some(*generation)
            }
        }
    }

    fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::Seeking { deadline, .. } | Self::Settling { deadline, .. } => Some(*deadline),
        }
    }
}

/// A navigation the host has to carry out: scroll to `page`, write the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationRequest {
    pub page: usize,
    pub generation: u64,
    pub history: HistoryMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationSettings {
    pub buffer_radius: usize,
    pub retention: RetentionPolicy,
    pub settle_delay: Duration,
    pub initial_settle_delay: Duration,
    pub scroll_end_grace: Duration,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            buffer_radius: 2,
            retention: RetentionPolicy::SlidingWindow { eviction_radius: 6 },
            settle_delay: Duration::from_millis(1000),
            initial_settle_delay: Duration::from_millis(2000),
            scroll_end_grace: Duration::from_millis(150),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    settings: NavigationSettings,
    total_pages: Option<usize>,
    current_page: usize,
    focus_page: usize,
    rendered: BTreeSet<usize>,
    phase: NavigationPhase,
    generation: u64,
}

impl NavigationController {
    pub fn new(settings: NavigationSettings) -> Self {
        Self {
            settings,
            total_pages: None,
            current_page: 1,
            focus_page: 1,
            rendered: BTreeSet::new(),
            phase: NavigationPhase::Idle,
            generation: 0,
        }
    }

    pub fn total_pages(&self) -> Option<usize> {
        self.total_pages
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn focus_page(&self) -> usize {
        self.focus_page
    }

    pub fn rendered_pages(&self) -> &BTreeSet<usize> {
        &self.rendered
    }

    pub fn phase(&self) -> NavigationPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while passive visibility updates must not touch the current page.
    pub fn suppresses_passive_updates(&self) -> bool {
        self.phase != NavigationPhase::Idle
    }

    /// Starts a fresh session at page 1 for a newly loaded document.
    pub fn reset(&mut self, total_pages: usize) {
        self.total_pages = (total_pages > 0).then_some(total_pages);
        self.current_page = 1;
        self.focus_page = 1;
        self.rendered.clear();
        self.invalidate();
        self.refocus(1);
    }

    /// Forgets the document, e.g. after a load failure.
    pub fn clear(&mut self) {
        self.total_pages = None;
        self.current_page = 1;
        self.focus_page = 1;
        self.rendered.clear();
        self.invalidate();
    }

    pub fn next_page(&mut self, now: Instant) -> Option<NavigationRequest> {
        let total = self.total_pages?;
        if self.current_page >= total {
            return None;
        }
        self.go_to_page(self.current_page + 1, now)
    }

    pub fn previous_page(&mut self, now: Instant) -> Option<NavigationRequest> {
        if self.total_pages.is_none() || self.current_page <= 1 {
            return None;
        }
        self.go_to_page(self.current_page - 1, now)
    }

    /// Explicit navigation. Out-of-range targets leave every piece of state untouched.
    pub fn go_to_page(&mut self, page: usize, now: Instant) -> Option<NavigationRequest> {
        let total = self.total_pages?;
        if page < 1 || page > total {
            debug!(page, total, "rejected out-of-range navigation");
            return None;
        }

        Some(self.begin_seek(
            page,
            HistoryMode::Push,
            self.settings.settle_delay,
            now,
        ))
    }

    /// Moves to the page a shared link points at, without adding history.
    ///
    /// The page is clamped into the document; page 1 needs no seek.
    pub fn seed_initial_page(&mut self, page: usize, now: Instant) -> Option<NavigationRequest> {
        let total = self.total_pages?;
        let page = page.clamp(1, total);
        if page == 1 {
            return None;
        }
        Some(self.begin_seek(
            page,
            HistoryMode::Replace,
            self.settings.initial_settle_delay,
            now,
        ))
    }

    /// The host reports that the scroll for `generation` came to rest.
    pub fn on_scroll_end(&mut self, generation: u64, now: Instant) -> bool {
        let NavigationPhase::Seeking {
            generation: active,
            deadline,
            ..
        } = self.phase
        else {
            return false;
        };
        if active != generation {
            return false;
        }

        let grace_deadline = (now + self.settings.scroll_end_grace).min(deadline);
        self.phase = NavigationPhase::Settling {
            generation,
            deadline: grace_deadline,
        };
        true
    }

    /// Expires settle deadlines. Returns true when passive tracking resumes.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase.deadline() {
            Some(deadline) if now >= deadline => {
                debug!(generation = self.generation, "navigation settled");
                self.phase = NavigationPhase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Applies a page picked by scroll tracking. Ignored while a navigation owns the page.
    pub fn commit_passive(&mut self, page: usize) -> bool {
        if self.suppresses_passive_updates() {
            return false;
        }
        let Some(total) = self.total_pages else {
            return false;
        };
        if page < 1 || page > total || page == self.current_page {
            return false;
        }

        self.current_page = page;
        self.refocus(page);
        true
    }

    fn begin_seek(
        &mut self,
        page: usize,
        history: HistoryMode,
        settle: Duration,
        now: Instant,
    ) -> NavigationRequest {
        self.generation = self.generation.saturating_add(1);
        self.current_page = page;
        self.refocus(page);
        self.phase = NavigationPhase::Seeking {
            target: page,
            generation: self.generation,
            deadline: now + settle,
        };
        debug!(page, generation = self.generation, ?history, "navigation started");

        NavigationRequest {
            page,
            generation: self.generation,
            history,
        }
    }

    fn refocus(&mut self, page: usize) {
        self.focus_page = page;
        self.rendered = retain_pages(
            &self.rendered,
            page,
            self.total_pages,
            self.settings.buffer_radius,
            self.settings.retention,
        );
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.saturating_add(1);
        self.phase = NavigationPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::{Duration, Instant};

    use crate::url::HistoryMode;

    use super::{NavigationController, NavigationPhase, NavigationSettings};

    fn loaded(total: usize) -> NavigationController {
        let mut nav = NavigationController::new(NavigationSettings::default());
        nav.reset(total);
        nav
    }

    #[test]
    fn reset_renders_the_first_window() {
        let nav = loaded(20);
        assert_eq!(nav.current_page(), 1);
        assert_eq!(nav.rendered_pages(), &BTreeSet::from([1, 2, 3]));
        assert_eq!(nav.phase(), NavigationPhase::Idle);
    }

    #[test]
    fn go_to_page_seeks_and_pushes() {
        let now = Instant::now();
        let mut nav = loaded(20);

        let request = nav.go_to_page(5, now).expect("page 5 exists");
        assert_eq!(request.page, 5);
        assert_eq!(request.history, HistoryMode::Push);
        assert_eq!(nav.current_page(), 5);
        assert!(nav.rendered_pages().is_superset(&BTreeSet::from([3, 4, 5, 6, 7])));
        assert!(nav.suppresses_passive_updates());
    }

    #[test]
    fn out_of_range_navigation_changes_nothing() {
        let now = Instant::now();
        let mut nav = loaded(10);
        let before = nav.rendered_pages().clone();
        let generation = nav.generation();

        assert_eq!(nav.go_to_page(0, now), None);
        assert_eq!(nav.go_to_page(11, now), None);
        assert_eq!(nav.current_page(), 1);
        assert_eq!(nav.rendered_pages(), &before);
        assert_eq!(nav.generation(), generation);
        assert_eq!(nav.phase(), NavigationPhase::Idle);
    }

    #[test]
    fn navigation_without_document_is_ignored() {
        let mut nav = NavigationController::new(NavigationSettings::default());
        assert_eq!(nav.go_to_page(3, Instant::now()), None);
        assert_eq!(nav.next_page(Instant::now()), None);
        assert!(nav.rendered_pages().is_empty());
    }

    #[test]
    fn next_and_previous_stop_at_bounds() {
        let now = Instant::now();
        let mut nav = loaded(2);
        assert_eq!(nav.previous_page(now), None);
        assert!(nav.next_page(now).is_some());
        assert_eq!(nav.current_page(), 2);
        assert_eq!(nav.next_page(now), None);
        assert!(nav.previous_page(now).is_some());
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn passive_commits_are_suppressed_until_settled() {
        let now = Instant::now();
        let mut nav = loaded(20);
        nav.go_to_page(5, now);

        assert!(!nav.commit_passive(3));
        assert_eq!(nav.current_page(), 5);

        assert!(!nav.tick(now + Duration::from_millis(999)));
        assert!(nav.tick(now + Duration::from_millis(1000)));
        assert!(nav.commit_passive(3));
        assert_eq!(nav.current_page(), 3);
    }

    #[test]
    fn scroll_end_shortens_settle_for_matching_generation_only() {
        let now = Instant::now();
        let mut nav = loaded(20);
        let first = nav.go_to_page(5, now).expect("navigates");
        let second = nav.go_to_page(9, now).expect("navigates");

        assert!(!nav.on_scroll_end(first.generation, now));
        assert!(nav.on_scroll_end(second.generation, now + Duration::from_millis(100)));
        assert!(matches!(nav.phase(), NavigationPhase::Settling { .. }));
        assert!(nav.tick(now + Duration::from_millis(250)));
        assert_eq!(nav.phase(), NavigationPhase::Idle);
    }

    #[test]
    fn newer_navigation_replaces_older_deadline() {
        let now = Instant::now();
        let mut nav = loaded(20);
        nav.go_to_page(5, now);
        nav.go_to_page(7, now + Duration::from_millis(900));

        // The first deadline passing must not end the second seek.
        assert!(!nav.tick(now + Duration::from_millis(1000)));
        assert!(nav.suppresses_passive_updates());
        assert!(nav.tick(now + Duration::from_millis(1900)));
    }

    #[test]
    fn seeding_clamps_and_uses_replace() {
        let now = Instant::now();
        let mut nav = loaded(8);

        assert_eq!(nav.seed_initial_page(1, now), None);
        let request = nav.seed_initial_page(50, now).expect("clamped to last page");
        assert_eq!(request.page, 8);
        assert_eq!(request.history, HistoryMode::Replace);

        assert!(!nav.tick(now + Duration::from_millis(1999)));
        assert!(nav.tick(now + Duration::from_millis(2000)));
    }

    #[test]
    fn navigating_to_current_page_still_pushes() {
        let now = Instant::now();
        let mut nav = loaded(5);
        let request = nav.go_to_page(1, now).expect("page exists");
        assert_eq!(request.history, HistoryMode::Push);
        assert_eq!(nav.current_page(), 1);
    }
}
