//! Keeps the current page mirrored in the URL path as `/{document}/{page}`.

mod history;
mod location;

use tracing::debug;

use crate::registry::{page_path, parse_page_segment};

pub use history::{HistoryBackend, HistoryMode, MemoryHistory};
pub use location::Location;

#[derive(Debug, Clone)]
pub struct UrlSynchronizer<H> {
    document: String,
    history: H,
}

impl<H: HistoryBackend> UrlSynchronizer<H> {
    pub fn new(document: impl Into<String>, history: H) -> Self {
        Self {
            document: document.into(),
            history,
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn location(&self) -> &Location {
        self.history.location()
    }

    /// Page encoded in the current URL, 1 when absent or malformed.
    pub fn read_page(&self) -> usize {
        let mut segments = self.history.location().segments();
        if segments.next() != Some(self.document.as_str()) {
            return 1;
        }
        match (segments.next(), segments.next()) {
            (Some(page), None) => parse_page_segment(page).unwrap_or(1),
            _ => 1,
        }
    }

    /// Writes `page` into the path, keeping the query string and fragment.
    ///
    /// Returns `false` when a replace would not change the URL.
    pub fn write_page(&mut self, page: usize, mode: HistoryMode) -> bool {
        let next = self
            .history
            .location()
            .with_path(page_path(&self.document, page));

        match mode {
            HistoryMode::Push => {
                debug!(url = %next, "push url");
                self.history.push(next);
                true
            }
            HistoryMode::Replace => {
                if self.history.location() == &next {
                    return false;
                }
                debug!(url = %next, "replace url");
                self.history.replace(next);
                true
            }
        }
    }
}
