#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pagelink::backend::{DocumentBackend, DocumentLoader, RenderedPage, RgbaFrame};
use pagelink::error::{AppError, AppResult};

/// In-memory document: fixed page size and per-page text.
#[derive(Debug, Clone)]
pub struct TextDocument {
    location: PathBuf,
    pages: Vec<String>,
}

impl TextDocument {
    pub fn new(location: impl AsRef<Path>, pages: &[&str]) -> Self {
        Self {
            location: location.as_ref().to_path_buf(),
            pages: pages.iter().map(|text| text.to_string()).collect(),
        }
    }

    fn check(&self, page: usize) -> AppResult<usize> {
        if page == 0 || page > self.pages.len() {
            return Err(AppError::invalid_argument(format!("page {page} out of range")));
        }
        Ok(page - 1)
    }
}

impl DocumentBackend for TextDocument {
    fn location(&self) -> &Path {
        &self.location
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> AppResult<(f32, f32)> {
        self.check(page)?;
        Ok((200.0, 300.0))
    }

    fn render_page(&self, page: usize, target_width: u32) -> AppResult<RenderedPage> {
        self.check(page)?;
        let width = target_width.max(1);
        let height = width * 3 / 2;
        Ok(RenderedPage {
            page,
            frame: RgbaFrame {
                width,
                height,
                pixels: Arc::from(vec![255_u8; (width * height * 4) as usize]),
            },
            aspect_ratio: 1.5,
        })
    }

    fn extract_text(&self, page: usize) -> AppResult<String> {
        let index = self.check(page)?;
        Ok(self.pages[index].clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextLoader {
    documents: Vec<TextDocument>,
}

impl TextLoader {
    pub fn with(mut self, document: TextDocument) -> Self {
        self.documents.push(document);
        self
    }
}

impl DocumentLoader for TextLoader {
    fn open(&self, location: &Path) -> AppResult<Box<dyn DocumentBackend>> {
        self.documents
            .iter()
            .find(|document| document.location == location)
            .map(|document| Box::new(document.clone()) as Box<dyn DocumentBackend>)
            .ok_or_else(|| AppError::document_load(location, "no such document"))
    }
}
