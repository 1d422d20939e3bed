use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use prospekt_core::{PageLink, PageSummary, PageText};

use crate::raster::{ChannelLayout, RasterImage};
use crate::source::{DocumentError, DocumentSource};

enum BrochureData {
    File(PathBuf),
    Memory(Vec<u8>),
}

impl BrochureData {
    fn describe(&self) -> String {
        match self {
            BrochureData::File(path) => path.display().to_string(),
            BrochureData::Memory(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

/// A brochure PDF, read through pdfium.
///
/// Every [`DocumentSource`] method opens the document, performs one pass,
/// and releases the handle when it returns — error paths included.
pub struct PdfBrochure {
    pdfium: Pdfium,
    data: BrochureData,
    min_image_px: u32,
}

impl PdfBrochure {
    /// Open a brochure from a file on disk.
    pub fn open(path: impl AsRef<Path>, min_image_px: u32) -> Result<Self, DocumentError> {
        Self::new(BrochureData::File(path.as_ref().to_path_buf()), min_image_px)
    }

    /// Open a brochure from PDF bytes already in memory.
    pub fn from_bytes(bytes: Vec<u8>, min_image_px: u32) -> Result<Self, DocumentError> {
        Self::new(BrochureData::Memory(bytes), min_image_px)
    }

    /// Bind the pdfium library (a local build next to the executable first,
    /// then the system library) and verify the document loads. An unreadable
    /// document is the pipeline's one fatal error, so it surfaces here
    /// rather than mid-extraction.
    fn new(data: BrochureData, min_image_px: u32) -> Result<Self, DocumentError> {
        let bindings =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| DocumentError::Runtime(e.to_string()))?;

        let brochure = Self { pdfium: Pdfium::new(bindings), data, min_image_px };

        let document = brochure.load()?;
        info!(
            source = %brochure.data.describe(),
            pages = document.pages().len(),
            "Opened brochure"
        );
        drop(document);

        Ok(brochure)
    }

    fn load(&self) -> Result<PdfDocument<'_>, DocumentError> {
        let loaded = match &self.data {
            BrochureData::File(path) => self.pdfium.load_pdf_from_file(path, None),
            BrochureData::Memory(bytes) => self.pdfium.load_pdf_from_byte_slice(bytes, None),
        };
        loaded.map_err(|e| DocumentError::Open {
            path: self.data.describe(),
            message: e.to_string(),
        })
    }
}

impl DocumentSource for PdfBrochure {
    fn page_summaries(&self) -> Result<Vec<PageSummary>, DocumentError> {
        let document = self.load()?;
        let mut summaries = Vec::with_capacity(document.pages().len() as usize);

        for (index, page) in document.pages().iter().enumerate() {
            let page_no = index as u32 + 1;
            let text_len = match page.text() {
                Ok(text) => text.all().trim().len(),
                Err(e) => {
                    warn!(page = page_no, error = %e, "Text layer unreadable, counting as empty");
                    0
                }
            };
            let has_images = page
                .objects()
                .iter()
                .any(|object| object.as_image_object().is_some());

            summaries.push(PageSummary { page: page_no, text_len, has_images });
        }

        Ok(summaries)
    }

    fn extract_text(&self, include_empty: bool) -> Result<Vec<PageText>, DocumentError> {
        let document = self.load()?;
        let mut pages = Vec::new();

        for (index, page) in document.pages().iter().enumerate() {
            let page_no = index as u32 + 1;
            let content = match page.text() {
                Ok(text) => text.all(),
                Err(e) => {
                    warn!(page = page_no, error = %e, "Text extraction failed for page");
                    String::new()
                }
            };
            if include_empty || !content.trim().is_empty() {
                pages.push(PageText { page: page_no, content });
            }
        }

        Ok(pages)
    }

    fn extract_images(&self) -> Result<Vec<RasterImage>, DocumentError> {
        let document = self.load()?;
        let mut images = Vec::new();

        for (index, page) in document.pages().iter().enumerate() {
            let page_no = index as u32 + 1;

            for object in page.objects().iter() {
                let Some(image_object) = object.as_image_object() else {
                    continue;
                };
                let raw = match image_object.get_raw_image() {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!(page = page_no, error = %e, "Skipping undecodable embedded image");
                        continue;
                    }
                };
                // Icons and decorations are noise for recognition.
                if raw.width() <= self.min_image_px || raw.height() <= self.min_image_px {
                    debug!(
                        page = page_no,
                        width = raw.width(),
                        height = raw.height(),
                        "Skipping small embedded image"
                    );
                    continue;
                }

                let raster = RasterImage::new(page_no, raw);
                let raster = match raster.channel_layout() {
                    ChannelLayout::Rgb | ChannelLayout::Gray => raster,
                    _ => RasterImage::new(page_no, DynamicImage::ImageRgb8(raster.to_rgb8())),
                };
                images.push(raster);
            }
        }

        debug!(count = images.len(), "Embedded images extracted");
        Ok(images)
    }

    fn extract_links(&self) -> Result<Vec<PageLink>, DocumentError> {
        let document = self.load()?;
        let mut links = Vec::new();

        for (index, page) in document.pages().iter().enumerate() {
            let page_no = index as u32 + 1;

            for link in page.links().iter() {
                let Some(action) = link.action() else {
                    continue;
                };
                if let PdfAction::Uri(uri_action) = action {
                    match uri_action.uri() {
                        Ok(uri) if !uri.is_empty() => {
                            links.push(PageLink { page: page_no, uri });
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(page = page_no, error = %e, "Unreadable link annotation");
                        }
                    }
                }
            }
        }

        Ok(links)
    }

    fn render_page(&self, page: u32, dpi: u32) -> Result<RasterImage, DocumentError> {
        let document = self.load()?;
        let pages = document.pages();
        let count = pages.len() as u32;
        if page == 0 || page > count {
            return Err(DocumentError::PageOutOfRange { page, count });
        }

        let pdf_page = pages
            .get((page - 1) as u16)
            .map_err(|e| DocumentError::Render { page, message: e.to_string() })?;

        // PDF points are 72 per inch.
        let scale = dpi as f32 / 72.0;
        let pixel_width = (pdf_page.width().value * scale) as i32;
        let pixel_height = (pdf_page.height().value * scale) as i32;

        let bitmap = pdf_page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(pixel_width)
                    .set_target_height(pixel_height)
                    .render_form_data(true)
                    .render_annotations(true),
            )
            .map_err(|e| DocumentError::Render { page, message: e.to_string() })?;

        Ok(RasterImage::new(page, bitmap.as_image()))
    }
}
