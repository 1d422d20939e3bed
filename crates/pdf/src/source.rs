use image::{DynamicImage, RgbImage};
use thiserror::Error;

use prospekt_core::{PageLink, PageSummary, PageText};

use crate::raster::RasterImage;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("PDF runtime unavailable: {0}")]
    Runtime(String),
    #[error("Failed to open document '{path}': {message}")]
    Open { path: String, message: String },
    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: u32 },
    #[error("Failed to render page {page}: {message}")]
    Render { page: u32, message: String },
}

/// Read-only access to one document, one extraction pass per call.
///
/// Implementations must open the underlying handle at the start of each
/// call and release it on every exit path. Failures below pass granularity
/// (a single unreadable page or image) are logged and skipped by the
/// implementation; only whole-pass failures surface as errors.
pub trait DocumentSource {
    /// Per-page text length and image presence, in page order.
    fn page_summaries(&self) -> Result<Vec<PageSummary>, DocumentError>;

    /// The native text layer, in page order. With `include_empty` false,
    /// pages whose text is only whitespace are omitted.
    fn extract_text(&self, include_empty: bool) -> Result<Vec<PageText>, DocumentError>;

    /// Embedded raster images in page-then-enumeration order, already
    /// filtered by minimum pixel size and normalized out of exotic color
    /// spaces.
    fn extract_images(&self) -> Result<Vec<RasterImage>, DocumentError>;

    /// URI annotations in page order. A failing page contributes nothing
    /// but never aborts later pages.
    fn extract_links(&self) -> Result<Vec<PageLink>, DocumentError>;

    /// Rasterize one page (1-indexed) at the given resolution.
    fn render_page(&self, page: u32, dpi: u32) -> Result<RasterImage, DocumentError>;
}

// ── Mock source (always available, used for tests) ────────────────────────────

/// One synthetic page for [`MockDocument`].
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub text: String,
    pub images: Vec<DynamicImage>,
    pub links: Vec<String>,
    /// Returned from `render_page` regardless of DPI; a blank white render
    /// is substituted when unset.
    pub rendered: Option<DynamicImage>,
    /// Make `render_page` fail for this page, for exercising best-effort
    /// error paths.
    pub render_fails: bool,
}

impl MockPage {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }
}

/// In-memory document for exercising the pipeline without a PDF runtime.
#[derive(Debug, Clone, Default)]
pub struct MockDocument {
    pub pages: Vec<MockPage>,
}

impl MockDocument {
    pub fn new(pages: Vec<MockPage>) -> Self {
        Self { pages }
    }

    fn page(&self, page: u32) -> Result<&MockPage, DocumentError> {
        self.pages
            .get(page.checked_sub(1).unwrap_or(u32::MAX) as usize)
            .ok_or(DocumentError::PageOutOfRange { page, count: self.pages.len() as u32 })
    }
}

impl DocumentSource for MockDocument {
    fn page_summaries(&self) -> Result<Vec<PageSummary>, DocumentError> {
        Ok(self
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| PageSummary {
                page: i as u32 + 1,
                text_len: p.text.trim().len(),
                has_images: !p.images.is_empty(),
            })
            .collect())
    }

    fn extract_text(&self, include_empty: bool) -> Result<Vec<PageText>, DocumentError> {
        Ok(self
            .pages
            .iter()
            .enumerate()
            .filter(|(_, p)| include_empty || !p.text.trim().is_empty())
            .map(|(i, p)| PageText { page: i as u32 + 1, content: p.text.clone() })
            .collect())
    }

    fn extract_images(&self) -> Result<Vec<RasterImage>, DocumentError> {
        Ok(self
            .pages
            .iter()
            .enumerate()
            .flat_map(|(i, p)| {
                p.images
                    .iter()
                    .map(move |img| RasterImage::new(i as u32 + 1, img.clone()))
            })
            .collect())
    }

    fn extract_links(&self) -> Result<Vec<PageLink>, DocumentError> {
        Ok(self
            .pages
            .iter()
            .enumerate()
            .flat_map(|(i, p)| {
                p.links
                    .iter()
                    .map(move |uri| PageLink { page: i as u32 + 1, uri: uri.clone() })
            })
            .collect())
    }

    fn render_page(&self, page: u32, _dpi: u32) -> Result<RasterImage, DocumentError> {
        let mock = self.page(page)?;
        if mock.render_fails {
            return Err(DocumentError::Render { page, message: "mock render failure".into() });
        }
        let image = mock.rendered.clone().unwrap_or_else(|| {
            DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, image::Rgb([255, 255, 255])))
        });
        Ok(RasterImage::new(page, image))
    }
}
