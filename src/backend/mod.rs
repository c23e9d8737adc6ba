use std::path::Path;

use crate::error::AppResult;

mod hayro;
mod traits;

pub use hayro::{HayroDocument, HayroLoader};
pub use traits::{
    DocumentBackend, DocumentLoader, NOMINAL_ASPECT_RATIO, RenderedPage, RgbaFrame,
    aspect_ratio_of,
};

pub fn open_document(path: impl AsRef<Path>) -> AppResult<Box<dyn DocumentBackend>> {
    HayroDocument::open(path).map(|doc| Box::new(doc) as Box<dyn DocumentBackend>)
}
