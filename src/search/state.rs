use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::AppResult;

use super::engine::{SearchEngine, SearchEvent};

/// What the UI knows about the latest search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    query: String,
    case_sensitive: bool,
    generation: u64,
    in_progress: bool,
    scanned_pages: usize,
    total_pages: usize,
    match_count: usize,
    last_error: Option<String>,
}

impl SearchState {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts a search over `location`. A blank query just resets to zero matches.
    pub fn submit(
        &mut self,
        engine: &mut SearchEngine,
        location: &Path,
        query: &str,
    ) -> AppResult<()> {
        self.reset_counts();
        if query.trim().is_empty() {
            self.query.clear();
            if self.generation != 0 {
                self.generation = engine.cancel()?;
            }
            return Ok(());
        }

        self.query = query.to_string();
        self.generation = engine.submit(location, query, self.case_sensitive)?;
        self.in_progress = true;
        info!(query, generation = self.generation, "search started");
        Ok(())
    }

    /// Applies one worker event. Returns false when it belongs to an older search.
    pub fn apply(&mut self, event: SearchEvent) -> bool {
        if event.generation() != self.generation {
            debug!(
                stale = event.generation(),
                latest = self.generation,
                "dropping stale search event"
            );
            return false;
        }

        match event {
            SearchEvent::Progress {
                scanned_pages,
                total_pages,
                match_count,
                ..
            } => {
                self.scanned_pages = scanned_pages;
                self.total_pages = total_pages;
                self.match_count = match_count;
            }
            SearchEvent::Completed { match_count, .. } => {
                self.in_progress = false;
                self.scanned_pages = self.total_pages.max(self.scanned_pages);
                self.match_count = match_count;
                info!(generation = self.generation, match_count, "search finished");
            }
            SearchEvent::Failed { message, .. } => {
                warn!(generation = self.generation, %message, "search failed");
                self.in_progress = false;
                self.match_count = 0;
                self.last_error = Some(message);
            }
        }
        true
    }

    /// Drains the engine and applies everything current. Returns true if anything changed.
    pub fn drain(&mut self, engine: &mut SearchEngine) -> bool {
        let mut changed = false;
        for event in engine.drain_events() {
            changed |= self.apply(event);
        }
        changed
    }

    pub fn status_segment(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        if self.last_error.is_some() {
            return Some(format!("\"{}\": search failed", self.query));
        }
        if self.in_progress {
            return Some(format!(
                "\"{}\": {} matches ({}/{} pages)",
                self.query, self.match_count, self.scanned_pages, self.total_pages
            ));
        }
        Some(format!("\"{}\": {} matches", self.query, self.match_count))
    }

    fn reset_counts(&mut self) {
        self.in_progress = false;
        self.scanned_pages = 0;
        self.total_pages = 0;
        self.match_count = 0;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use crate::search::{SearchEngine, SearchEvent};
    use crate::test_support::{StubDocument, StubLoader};

    use super::SearchState;

    fn engine() -> SearchEngine {
        let loader = StubLoader::default().with(StubDocument::new("/docs/a.pdf", &["a b a"]));
        SearchEngine::with_loader(Arc::new(loader)).expect("search engine should start")
    }

    #[test]
    fn stale_events_are_dropped() {
        let mut engine = engine();
        let mut state = SearchState::default();
        let location = Path::new("/docs/a.pdf");

        state.submit(&mut engine, location, "a").expect("first");
        let first = state.generation();
        state.submit(&mut engine, location, "b").expect("second");

        assert!(!state.apply(SearchEvent::Completed {
            generation: first,
            match_count: 99,
        }));
        assert_eq!(state.match_count(), 0);
        assert!(state.in_progress());

        assert!(state.apply(SearchEvent::Completed {
            generation: state.generation(),
            match_count: 1,
        }));
        assert_eq!(state.match_count(), 1);
        assert!(!state.in_progress());
    }

    #[test]
    fn empty_query_resets_without_a_job() {
        let mut engine = engine();
        let mut state = SearchState::default();
        let location = Path::new("/docs/a.pdf");

        state.submit(&mut engine, location, "   ").expect("blank");
        assert_eq!(state.generation(), 0);
        assert_eq!(engine.latest_generation(), 0);
        assert_eq!(state.match_count(), 0);
        assert_eq!(state.status_segment(), None);

        state.submit(&mut engine, location, "a").expect("real query");
        let running = state.generation();
        state.submit(&mut engine, location, "").expect("clear");
        assert!(state.generation() > running);
        assert!(!state.in_progress());
        assert!(!state.apply(SearchEvent::Completed {
            generation: running,
            match_count: 2,
        }));
    }

    #[test]
    fn failure_resets_count_and_progress() {
        let mut engine = engine();
        let mut state = SearchState::default();
        state
            .submit(&mut engine, Path::new("/docs/a.pdf"), "a")
            .expect("submit");
        let generation = state.generation();

        state.apply(SearchEvent::Progress {
            generation,
            scanned_pages: 1,
            total_pages: 3,
            match_count: 4,
        });
        assert_eq!(state.match_count(), 4);

        state.apply(SearchEvent::Failed {
            generation,
            message: "bad page".to_string(),
        });
        assert_eq!(state.match_count(), 0);
        assert!(!state.in_progress());
        assert_eq!(state.last_error(), Some("bad page"));
    }

    #[test]
    fn status_segment_reports_progress() {
        let mut engine = engine();
        let mut state = SearchState::default();
        state
            .submit(&mut engine, Path::new("/docs/a.pdf"), "a")
            .expect("submit");
        state.apply(SearchEvent::Progress {
            generation: state.generation(),
            scanned_pages: 1,
            total_pages: 2,
            match_count: 2,
        });
        assert_eq!(
            state.status_segment().as_deref(),
            Some("\"a\": 2 matches (1/2 pages)")
        );
    }
}
