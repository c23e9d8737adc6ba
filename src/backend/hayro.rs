use std::path::{Path, PathBuf};
use std::sync::Arc;

use hayro::hayro_interpret::font::Glyph;
use hayro::hayro_interpret::util::{PageExt, RectExt};
use hayro::hayro_interpret::{
    BlendMode, ClipPath, Context, Device, GlyphDrawMode, Image, InterpreterSettings, Paint,
    PathDrawMode, SoftMask, interpret_page,
};
use hayro::hayro_syntax::Pdf;
use hayro::hayro_syntax::page::Page;
use hayro::vello_cpu::color::palette::css::WHITE;
use hayro::{RenderSettings, render};
use kurbo::{Affine, BezPath, Point};

use crate::error::{AppError, AppResult};

use super::traits::{DocumentBackend, DocumentLoader, RenderedPage, RgbaFrame, aspect_ratio_of};

const MAX_RENDER_WIDTH: u32 = 4096;

pub struct HayroDocument {
    location: PathBuf,
    pdf: Pdf,
}

#[derive(Debug, Default)]
pub struct HayroLoader;

impl DocumentLoader for HayroLoader {
    fn open(&self, location: &Path) -> AppResult<Box<dyn DocumentBackend>> {
        super::open_document(location)
    }
}

impl DocumentBackend for HayroDocument {
    fn location(&self) -> &Path {
        &self.location
    }

    fn page_count(&self) -> usize {
        self.pdf.pages().len()
    }

    fn page_size(&self, page: usize) -> AppResult<(f32, f32)> {
        Ok(self.page(page)?.render_dimensions())
    }

    fn render_page(&self, page: usize, target_width: u32) -> AppResult<RenderedPage> {
        let page_ref = self.page(page)?;
        let (width_pt, height_pt) = page_ref.render_dimensions();
        if width_pt <= 0.0 || height_pt <= 0.0 {
            return Err(AppError::page_render(
                page,
                AppError::invalid_argument("page has an empty media box"),
            ));
        }

        let target_width = target_width.clamp(1, MAX_RENDER_WIDTH);
        let scale = target_width as f32 / width_pt;
        let render_settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            bg_color: WHITE,
            ..Default::default()
        };
        let pixmap = render(page_ref, &InterpreterSettings::default(), &render_settings);

        Ok(RenderedPage {
            page,
            frame: RgbaFrame {
                width: pixmap.width() as u32,
                height: pixmap.height() as u32,
                pixels: pixmap.data_as_u8_slice().to_vec().into(),
            },
            aspect_ratio: aspect_ratio_of(width_pt, height_pt),
        })
    }

    fn extract_text(&self, page: usize) -> AppResult<String> {
        let page_ref = self.page(page)?;
        Ok(collect_page_text(page_ref).trim().to_owned())
    }
}

impl HayroDocument {
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(AppError::invalid_argument("document path must not be empty"));
        }
        if !path.exists() {
            return Err(AppError::io_with_context(
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing file"),
                format!("document not found: {}", path.display()),
            ));
        }
        if !path.is_file() {
            return Err(AppError::invalid_argument(
                "document path must be a regular file",
            ));
        }

        let bytes = std::fs::read(path).map_err(|source| {
            AppError::io_with_context(source, format!("failed to read {}", path.display()))
        })?;
        Self::from_bytes(path, Arc::new(bytes))
    }

    pub fn from_bytes(path: impl AsRef<Path>, bytes: Arc<Vec<u8>>) -> AppResult<Self> {
        let path = path.as_ref();
        if !bytes.as_slice().starts_with(b"%PDF-") {
            return Err(AppError::document_load(path, "missing %PDF- header"));
        }
        let pdf = Pdf::new(bytes)
            .map_err(|_| AppError::document_load(path, "document could not be parsed"))?;
        if pdf.pages().len() == 0 {
            return Err(AppError::document_load(path, "document has no pages"));
        }

        Ok(Self {
            location: path.to_path_buf(),
            pdf,
        })
    }

    fn page(&self, page: usize) -> AppResult<&Page<'_>> {
        if page == 0 {
            return Err(AppError::invalid_argument("page numbers start at 1"));
        }
        self.pdf
            .pages()
            .get(page - 1)
            .ok_or(AppError::invalid_argument("page number is out of range"))
    }
}

fn collect_page_text(page: &Page<'_>) -> String {
    let mut context = Context::new(
        page.initial_transform(true),
        page.intersected_crop_box().to_kurbo(),
        page.xref(),
        InterpreterSettings::default(),
    );
    let mut sink = TextSink::default();
    interpret_page(page, &mut context, &mut sink);
    sink.text
}

/// Glyph positions closer than this on the y axis share a line.
const SAME_LINE_TOLERANCE: f64 = 6.0;

#[derive(Default)]
struct TextSink {
    text: String,
    baseline: Option<f64>,
    // Fake-bold text draws each glyph twice at the same spot.
    last_glyph: Option<(char, i64, i64)>,
}

impl TextSink {
    fn accept(&mut self, ch: char, at: Point) {
        let key = (ch, (at.x * 100.0).round() as i64, (at.y * 100.0).round() as i64);
        if self.last_glyph == Some(key) {
            return;
        }
        self.last_glyph = Some(key);

        if ch.is_whitespace() {
            let separator = if ch == '\n' || ch == '\r' { '\n' } else { ' ' };
            self.separate(separator);
            self.baseline = Some(at.y);
            return;
        }

        if let Some(baseline) = self.baseline
            && (at.y - baseline).abs() > SAME_LINE_TOLERANCE
        {
            self.separate('\n');
        }
        self.text.push(ch);
        self.baseline = Some(at.y);
    }

    fn separate(&mut self, separator: char) {
        if self.text.is_empty() || self.text.ends_with(['\n', ' ']) {
            return;
        }
        self.text.push(separator);
    }
}

impl<'a> Device<'a> for TextSink {
    fn set_soft_mask(&mut self, _mask: Option<SoftMask<'a>>) {}

    fn set_blend_mode(&mut self, _blend_mode: BlendMode) {}

    fn draw_path(
        &mut self,
        _path: &BezPath,
        _transform: Affine,
        _paint: &Paint<'a>,
        _draw_mode: &PathDrawMode,
    ) {
    }

    fn push_clip_path(&mut self, _clip_path: &ClipPath) {}

    fn push_transparency_group(
        &mut self,
        _opacity: f32,
        _mask: Option<SoftMask<'a>>,
        _blend_mode: BlendMode,
    ) {
    }

    fn draw_glyph(
        &mut self,
        glyph: &Glyph<'a>,
        transform: Affine,
        glyph_transform: Affine,
        _paint: &Paint<'a>,
        _draw_mode: &GlyphDrawMode,
    ) {
        if let Some(ch) = glyph.as_unicode() {
            self.accept(ch, (transform * glyph_transform) * Point::ORIGIN);
        }
    }

    fn draw_image(&mut self, _image: Image<'a, '_>, _transform: Affine) {}

    fn pop_clip_path(&mut self) {}

    fn pop_transparency_group(&mut self) {}
}
