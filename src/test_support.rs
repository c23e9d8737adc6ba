use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::backend::{DocumentBackend, DocumentLoader, RenderedPage, RgbaFrame};
use crate::error::{AppError, AppResult};

pub(crate) fn unique_temp_path(suffix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("pagelink_{suffix}_{}_{}", process::id(), nanos));
    path
}

/// Minimal single-font PDF with one 300x300 page per entry.
pub(crate) fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
    let streams: Vec<String> = if page_texts.is_empty() {
        vec![String::new()]
    } else {
        page_texts
            .iter()
            .map(|text| format!("BT /F1 14 Tf 36 260 Td ({}) Tj ET", escape_literal(text)))
            .collect()
    };

    let mut objects = vec!["<< /Type /Catalog /Pages 2 0 R >>".to_string()];
    let kids = (0..streams.len())
        .map(|index| format!("{} 0 R", 4 + index * 2))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!(
        "<< /Type /Pages /Kids [{kids}] /Count {} >>",
        streams.len()
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
    for (index, stream) in streams.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 300 300] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + index * 2
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }

    let mut bytes = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        offsets.push(bytes.len());
        bytes.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", index + 1).as_bytes());
    }

    let xref_start = bytes.len();
    bytes.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    bytes.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        bytes.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    bytes.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    bytes
}

fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// In-memory document: each page is its extracted text, or an extraction error.
#[derive(Debug, Clone)]
pub(crate) struct StubDocument {
    location: PathBuf,
    pages: Vec<Result<String, String>>,
    aspect_ratio: f32,
}

impl StubDocument {
    pub(crate) fn new(location: impl AsRef<Path>, texts: &[&str]) -> Self {
        Self {
            location: location.as_ref().to_path_buf(),
            pages: texts.iter().map(|text| Ok((*text).to_string())).collect(),
            aspect_ratio: 1.5,
        }
    }

    pub(crate) fn with_broken_page(mut self, page: usize) -> Self {
        if let Some(slot) = page.checked_sub(1).and_then(|index| self.pages.get_mut(index)) {
            *slot = Err("glyph table is corrupt".to_string());
        }
        self
    }
}

impl DocumentBackend for StubDocument {
    fn location(&self) -> &Path {
        &self.location
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> AppResult<(f32, f32)> {
        if page == 0 || page > self.pages.len() {
            return Err(AppError::invalid_argument(format!("page {page} out of range")));
        }
        Ok((200.0, 200.0 * self.aspect_ratio))
    }

    fn render_page(&self, page: usize, target_width: u32) -> AppResult<RenderedPage> {
        self.page_size(page)?;
        let width = target_width.max(1);
        let height = (width as f32 * self.aspect_ratio).round() as u32;
        Ok(RenderedPage {
            page,
            frame: RgbaFrame {
                width,
                height,
                pixels: Arc::from(vec![255_u8; (width * height * 4) as usize]),
            },
            aspect_ratio: self.aspect_ratio,
        })
    }

    fn extract_text(&self, page: usize) -> AppResult<String> {
        match page.checked_sub(1).and_then(|index| self.pages.get(index)) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(AppError::text_extraction(page, message.clone())),
            None => Err(AppError::invalid_argument(format!("page {page} out of range"))),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StubLoader {
    documents: HashMap<PathBuf, StubDocument>,
}

impl StubLoader {
    pub(crate) fn with(mut self, document: StubDocument) -> Self {
        self.documents.insert(document.location.clone(), document);
        self
    }
}

impl DocumentLoader for StubLoader {
    fn open(&self, location: &Path) -> AppResult<Box<dyn DocumentBackend>> {
        self.documents
            .get(location)
            .cloned()
            .map(|document| Box::new(document) as Box<dyn DocumentBackend>)
            .ok_or_else(|| AppError::document_load(location, "no such stub document"))
    }
}
