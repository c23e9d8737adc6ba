use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::DocumentConfig;
use crate::error::{AppError, AppResult};

/// Where unknown or malformed routes are sent.
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub name: String,
    pub location: PathBuf,
    pub title: String,
}

impl DocumentEntry {
    pub fn new(name: impl Into<String>, location: impl AsRef<Path>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.as_ref().to_path_buf(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Viewer { name: String, initial_page: usize },
    Redirect { to: String },
}

#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    entries: BTreeMap<String, DocumentEntry>,
}

impl DocumentRegistry {
    pub fn from_config(documents: &[DocumentConfig]) -> AppResult<Self> {
        let mut registry = Self::default();
        for document in documents {
            let title = document
                .title
                .clone()
                .unwrap_or_else(|| document.name.clone());
            registry.insert(DocumentEntry {
                name: document.name.clone(),
                location: document.location.clone(),
                title,
            })?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, entry: DocumentEntry) -> AppResult<()> {
        if !is_valid_name(&entry.name) {
            return Err(AppError::invalid_argument(format!(
                "document name must be a non-empty [A-Za-z0-9_-] slug: {:?}",
                entry.name
            )));
        }
        if self.entries.contains_key(&entry.name) {
            return Err(AppError::invalid_argument(format!(
                "duplicate document name: {}",
                entry.name
            )));
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&DocumentEntry> {
        self.entries.get(name)
    }

    pub fn lookup(&self, name: &str) -> AppResult<&DocumentEntry> {
        self.get(name)
            .ok_or_else(|| AppError::not_found(format!("no document named {name:?}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maps `/{name}` and `/{name}/{page}` onto a viewer route.
    ///
    /// A page segment that is not a positive integer is ignored; clamping a
    /// too-large page happens once the page count is known.
    pub fn resolve_route(&self, path: &str) -> Route {
        let path = strip_query(path);
        let segments: Vec<&str> = path.split('/').filter(|seg| !seg.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            [name] => self.viewer_route(name, 1),
            [name, page] => self.viewer_route(name, parse_page_segment(page).unwrap_or(1)),
            _ => redirect_home(),
        }
    }

    fn viewer_route(&self, name: &str, initial_page: usize) -> Route {
        if self.get(name).is_none() {
            return redirect_home();
        }
        Route::Viewer {
            name: name.to_string(),
            initial_page,
        }
    }
}

pub fn document_path(name: &str) -> String {
    format!("/{name}")
}

pub fn page_path(name: &str, page: usize) -> String {
    format!("/{name}/{page}")
}

pub(crate) fn parse_page_segment(segment: &str) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|page| *page >= 1)
}

pub(crate) fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn redirect_home() -> Route {
    Route::Redirect {
        to: HOME_PATH.to_string(),
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}
