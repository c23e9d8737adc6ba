use super::location::Location;

/// Whether a URL write adds a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Replace,
}

pub trait HistoryBackend {
    fn location(&self) -> &Location;
    fn push(&mut self, location: Location);
    fn replace(&mut self, location: Location);
}

/// Session history kept in memory, with back/forward traversal.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Location>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }
}

impl HistoryBackend for MemoryHistory {
    fn location(&self) -> &Location {
        &self.entries[self.index]
    }

    fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, location: Location) {
        self.entries[self.index] = location;
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryBackend, MemoryHistory};
    use crate::url::Location;

    #[test]
    fn push_drops_forward_entries() {
        let mut history = MemoryHistory::new(Location::new("/a"));
        history.push(Location::new("/b"));
        history.push(Location::new("/c"));
        assert!(history.back());
        assert!(history.back());
        assert!(!history.back());

        history.push(Location::new("/d"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.location().path, "/d");
        assert!(!history.forward());
    }

    #[test]
    fn replace_keeps_entry_count() {
        let mut history = MemoryHistory::new(Location::new("/a"));
        history.replace(Location::new("/b"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.location().path, "/b");
    }
}
