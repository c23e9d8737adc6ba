use std::path::PathBuf;

pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("failed to load document {}: {message}", location.display())]
    DocumentLoad { location: PathBuf, message: String },
    #[error("page render failed for page {page}")]
    PageRender {
        page: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("text extraction failed for page {page}: {message}")]
    TextExtraction { page: usize, message: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl From<std::io::Error> for AppError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl AppError {
    pub fn io_with_context(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    pub fn document_load(location: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DocumentLoad {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn page_render(page: usize, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::PageRender {
            page,
            source: Box::new(source),
        }
    }

    pub fn text_extraction(page: usize, message: impl Into<String>) -> Self {
        Self::TextExtraction {
            page,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn page_render_error_wraps_page_and_source() {
        let err = AppError::page_render(7, AppError::invalid_argument("bad page"));
        assert!(matches!(err, AppError::PageRender { page: 7, .. }));
        assert_eq!(err.to_string(), "page render failed for page 7");
    }

    #[test]
    fn document_load_error_names_location() {
        let err = AppError::document_load("docs/manual.pdf", "bad header");
        assert_eq!(
            err.to_string(),
            "failed to load document docs/manual.pdf: bad header"
        );
    }
}
