use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use prospekt_core::{clean_text, DocKind, OcrSource, PipelineConfig, Signal};
use prospekt_ocr::{scan_codes, EngineOptions, RecognizerFactory, RecognizerPool};
use prospekt_pdf::{DocumentError, DocumentSource};

use crate::classifier::classify;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Document access failed: {0}")]
    Document(#[from] DocumentError),
}

/// Counts of processed and skipped units, for observability. Not part of the
/// text contract.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AssemblyReport {
    pub pages: usize,
    pub rendered_pages_recognized: usize,
    pub embedded_images_recognized: usize,
    pub codes_found: usize,
    pub links_found: usize,
    /// Pages or images whose extraction, render, or recognition failed and
    /// contributed no signal.
    pub units_failed: usize,
}

#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub kind: DocKind,
    /// Native text first, then labeled sections, each present only when
    /// non-empty.
    pub text: String,
    pub report: AssemblyReport,
}

/// Fuses the document's recoverable signals — native text, rendered-page and
/// embedded-image recognition, machine-readable codes, annotation links —
/// into one ordered text stream.
///
/// Failure semantics are best-effort at page/image granularity: a failing
/// unit is logged, counted, and skipped. Only document-level access failures
/// abort assembly.
pub struct Assembler<'a, D: DocumentSource, F: RecognizerFactory> {
    source: &'a D,
    pool: &'a RecognizerPool<F>,
    config: &'a PipelineConfig,
}

impl<'a, D: DocumentSource, F: RecognizerFactory> Assembler<'a, D, F> {
    pub fn new(source: &'a D, pool: &'a RecognizerPool<F>, config: &'a PipelineConfig) -> Self {
        Self { source, pool, config }
    }

    pub fn assemble(&self) -> Result<AssembledDocument, PipelineError> {
        let mut report = AssemblyReport::default();

        let summaries = self.source.page_summaries()?;
        report.pages = summaries.len();
        let kind = classify(&summaries, self.config);
        info!(kind = %kind, pages = report.pages, "Assembling document");

        let engine_options = EngineOptions {
            orientation_correction: self.config.orientation_correction,
        };

        // Signals are append-only; they are ordered and deduplicated below
        // but never edited after creation.
        let mut signals: Vec<Signal> = Vec::new();

        // Native text layer first; recognition only fills the gaps.
        let text_pages = self.source.extract_text(true)?;
        let mut page_text_len: HashMap<u32, usize> = HashMap::new();
        for page in text_pages {
            let cleaned = clean_text(&page.content);
            page_text_len.insert(page.page, cleaned.trim().len());
            signals.push(Signal::Text { page: page.page, content: cleaned });
        }

        // Full-page recognition: every page of a scanned document, and the
        // thin pages of a hybrid one. A page that yields text this way is
        // fully covered — its embedded images must not be recognized again.
        let mut fully_covered: HashSet<u32> = HashSet::new();
        if matches!(kind, DocKind::Scanned | DocKind::Hybrid) {
            for summary in &summaries {
                let text_len = page_text_len.get(&summary.page).copied().unwrap_or(0);
                if kind != DocKind::Scanned && text_len >= self.config.min_text_chars {
                    continue;
                }
                match self.source.render_page(summary.page, self.config.ocr_render_dpi) {
                    Ok(raster) => {
                        match self.pool.recognize(&raster, OcrSource::Rendered, engine_options) {
                            Ok(text) if !text.trim().is_empty() => {
                                debug!(page = summary.page, chars = text.len(), "Recognized rendered page");
                                fully_covered.insert(summary.page);
                                report.rendered_pages_recognized += 1;
                                signals.push(Signal::RecognizedText {
                                    page: summary.page,
                                    content: text,
                                    source: OcrSource::Rendered,
                                });
                            }
                            Ok(_) => {}
                            Err(e) => {
                                report.units_failed += 1;
                                warn!(page = summary.page, error = %e, "Rendered-page recognition failed");
                            }
                        }
                    }
                    Err(e) => {
                        report.units_failed += 1;
                        warn!(page = summary.page, error = %e, "Page render failed");
                    }
                }
            }
        }

        // Embedded images feed two consumers: recognition (digital/hybrid
        // only) and code scanning (always).
        let images = self.source.extract_images()?;

        if matches!(kind, DocKind::Digital | DocKind::Hybrid) {
            for image in &images {
                if fully_covered.contains(&image.page) {
                    debug!(page = image.page, "Skipping embedded image on fully recognized page");
                    continue;
                }
                match self.pool.recognize(image, OcrSource::Embedded, engine_options) {
                    Ok(text) if !text.trim().is_empty() => {
                        debug!(page = image.page, chars = text.len(), "Recognized embedded image");
                        report.embedded_images_recognized += 1;
                        signals.push(Signal::RecognizedText {
                            page: image.page,
                            content: text,
                            source: OcrSource::Embedded,
                        });
                    }
                    Ok(_) => {}
                    Err(e) => {
                        report.units_failed += 1;
                        warn!(page = image.page, error = %e, "Embedded-image recognition failed");
                    }
                }
            }
        }

        // Codes: rendered pages in page order, then embedded images in
        // enumeration order; the first (page, value) hit wins.
        let mut codes: Vec<(u32, String)> = Vec::new();
        for summary in &summaries {
            match self.source.render_page(summary.page, self.config.qr_render_dpi) {
                Ok(raster) => {
                    for value in scan_codes(&raster) {
                        codes.push((summary.page, value));
                    }
                }
                Err(e) => {
                    report.units_failed += 1;
                    warn!(page = summary.page, error = %e, "Page render for code scan failed");
                }
            }
        }
        for image in &images {
            for value in scan_codes(image) {
                codes.push((image.page, value));
            }
        }
        for (page, value) in dedup_page_values(codes) {
            report.codes_found += 1;
            signals.push(Signal::Code { page, value });
        }

        let links = self.source.extract_links()?;
        let link_pairs = dedup_page_values(links.into_iter().map(|l| (l.page, l.uri)).collect());
        for (page, uri) in link_pairs {
            report.links_found += 1;
            signals.push(Signal::Link { page, uri });
        }

        let text = render_sections(&signals);
        info!(
            chars = text.len(),
            codes = report.codes_found,
            links = report.links_found,
            units_failed = report.units_failed,
            "Assembly complete"
        );

        Ok(AssembledDocument { kind, text, report })
    }
}

/// Drop repeated `(page, value)` pairs, keeping the first occurrence.
fn dedup_page_values(items: Vec<(u32, String)>) -> Vec<(u32, String)> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|(page, value)| seen.insert((*page, value.clone())))
        .collect()
}

/// Render the fused signal stream into the fixed section order: native text,
/// recognized text, codes, links. A section with no lines is omitted. Within
/// each section, signals keep the order they were appended in.
fn render_sections(signals: &[Signal]) -> String {
    let mut native: Vec<&str> = Vec::new();
    let mut ocr: Vec<&str> = Vec::new();
    let mut code_lines: Vec<String> = Vec::new();
    let mut link_lines: Vec<String> = Vec::new();

    for signal in signals {
        match signal {
            Signal::Text { content, .. } => native.push(content),
            Signal::RecognizedText { content, .. } => ocr.push(content),
            Signal::Code { page, value } => code_lines.push(format!("page {page}: {value}")),
            Signal::Link { page, uri } => link_lines.push(format!("page {page}: {uri}")),
        }
    }

    let mut sections: Vec<String> = Vec::new();
    if native.iter().any(|part| !part.trim().is_empty()) {
        sections.push(native.join("\n\n"));
    }
    if !ocr.is_empty() {
        sections.push(format!("=== OCR EXTRACTED TEXT ===\n\n{}", ocr.join("\n\n")));
    }
    if !code_lines.is_empty() {
        sections.push(format!("=== QR CODES ===\n\n{}", code_lines.join("\n")));
    }
    if !link_lines.is_empty() {
        sections.push(format!("=== ANNOTATION LINKS ===\n\n{}", link_lines.join("\n")));
    }

    let mut text = sections.join("\n\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use prospekt_ocr::{MockRecognizerFactory, OcrError, TextRecognizer};
    use prospekt_pdf::{MockDocument, MockPage};

    /// Echoes the input dimensions, so tests can tell rendered-page results
    /// (mock renders are 100×100) from embedded-image results.
    struct SizeEchoRecognizer;

    impl TextRecognizer for SizeEchoRecognizer {
        fn recognize_lines(&self, image: &RgbImage) -> Result<Vec<String>, OcrError> {
            Ok(vec![format!("ocr {}x{}", image.width(), image.height())])
        }
    }

    #[derive(Default)]
    struct SizeEchoFactory;

    impl RecognizerFactory for SizeEchoFactory {
        type Engine = SizeEchoRecognizer;

        fn create(&self, _options: EngineOptions) -> Result<SizeEchoRecognizer, OcrError> {
            Ok(SizeEchoRecognizer)
        }
    }

    fn white(side: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(side, side, Rgb([255, 255, 255])))
    }

    fn assemble<D: DocumentSource>(doc: &D) -> AssembledDocument {
        let config = PipelineConfig::default();
        let pool = RecognizerPool::new(SizeEchoFactory, config.max_embedded_dimension);
        Assembler::new(doc, &pool, &config).assemble().unwrap()
    }

    fn three_page_doc(page2_text_len: usize) -> MockDocument {
        MockDocument::new(vec![
            MockPage::with_text("t".repeat(500)),
            MockPage {
                text: "u".repeat(page2_text_len),
                images: vec![white(60)],
                ..MockPage::default()
            },
            MockPage { images: vec![white(80)], ..MockPage::default() },
        ])
    }

    #[test]
    fn hybrid_with_rich_page2_recognizes_its_embedded_image() {
        // Pages 1 and 2 clear the text threshold; only page 3 is rendered.
        let doc = three_page_doc(100);
        let result = assemble(&doc);

        assert_eq!(result.kind, DocKind::Hybrid);
        // Rendered result (page 3, 100×100 mock render) precedes the
        // embedded result (page 2, 60×60). Page 3's own embedded image is
        // skipped: that page is fully covered by rendered recognition.
        assert!(result.text.contains(
            "=== OCR EXTRACTED TEXT ===\n\nocr 100x100\n\nocr 60x60"
        ));
        assert!(!result.text.contains("ocr 80x80"));
        assert_eq!(result.report.rendered_pages_recognized, 1);
        assert_eq!(result.report.embedded_images_recognized, 1);
    }

    #[test]
    fn hybrid_with_thin_page2_renders_it_and_skips_its_image() {
        // Page 2 text (10 chars) is under the threshold, so pages 2 and 3
        // both get full-page recognition and no embedded image is touched.
        let doc = three_page_doc(10);
        let result = assemble(&doc);

        assert_eq!(result.kind, DocKind::Hybrid);
        assert_eq!(result.report.rendered_pages_recognized, 2);
        assert_eq!(result.report.embedded_images_recognized, 0);
        assert!(!result.text.contains("ocr 60x60"));
        assert!(!result.text.contains("ocr 80x80"));
    }

    #[test]
    fn native_text_section_keeps_empty_pages_in_order() {
        let doc = three_page_doc(100);
        let result = assemble(&doc);
        // Page 1 then page 2 then the empty page 3, joined page-wise.
        let native_end = result.text.find("=== OCR EXTRACTED TEXT ===").unwrap();
        let native = &result.text[..native_end];
        assert!(native.starts_with(&"t".repeat(500)));
        assert!(native.contains(&"u".repeat(100)));
    }

    #[test]
    fn scanned_document_never_recognizes_embedded_images() {
        let doc = MockDocument::new(vec![
            MockPage { images: vec![white(64)], ..MockPage::default() },
            MockPage::default(),
        ]);
        let result = assemble(&doc);

        assert_eq!(result.kind, DocKind::Scanned);
        assert_eq!(result.report.rendered_pages_recognized, 2);
        assert_eq!(result.report.embedded_images_recognized, 0);
        assert!(!result.text.contains("ocr 64x64"));
    }

    #[test]
    fn digital_document_has_no_ocr_section_when_recognition_finds_nothing() {
        let doc = MockDocument::new(vec![MockPage::with_text("d".repeat(200))]);
        let config = PipelineConfig::default();
        let factory = MockRecognizerFactory::new(Vec::<String>::new());
        let pool = RecognizerPool::new(factory, config.max_embedded_dimension);
        let result = Assembler::new(&doc, &pool, &config).assemble().unwrap();

        assert_eq!(result.kind, DocKind::Digital);
        assert!(!result.text.contains("=== OCR EXTRACTED TEXT ==="));
        assert!(!result.text.contains("=== QR CODES ==="));
        assert!(!result.text.contains("=== ANNOTATION LINKS ==="));
    }

    #[test]
    fn links_are_deduplicated_by_page_and_value() {
        let doc = MockDocument::new(vec![
            MockPage {
                text: "x".repeat(200),
                links: vec![
                    "https://a.example".into(),
                    "https://a.example".into(),
                    "https://b.example".into(),
                ],
                ..MockPage::default()
            },
            MockPage {
                text: "y".repeat(200),
                links: vec!["https://a.example".into()],
                ..MockPage::default()
            },
        ]);
        let result = assemble(&doc);

        let section = result
            .text
            .split("=== ANNOTATION LINKS ===")
            .nth(1)
            .unwrap()
            .trim();
        assert_eq!(
            section.lines().collect::<Vec<_>>(),
            vec![
                "page 1: https://a.example",
                "page 1: https://b.example",
                "page 2: https://a.example",
            ]
        );
        assert_eq!(result.report.links_found, 3);
    }

    #[test]
    fn dedup_keeps_first_occurrence_across_scan_sources() {
        let items = vec![
            (1, "QRVALUE".to_string()),
            (2, "QRVALUE".to_string()),
            (1, "QRVALUE".to_string()),
            (1, "OTHER".to_string()),
        ];
        assert_eq!(
            dedup_page_values(items),
            vec![
                (1, "QRVALUE".to_string()),
                (2, "QRVALUE".to_string()),
                (1, "OTHER".to_string()),
            ]
        );
    }

    #[test]
    fn render_failures_are_counted_and_do_not_abort() {
        let doc = MockDocument::new(vec![
            MockPage { render_fails: true, ..MockPage::default() },
            MockPage::default(),
        ]);
        let result = assemble(&doc);

        assert_eq!(result.kind, DocKind::Scanned);
        // Page 1 fails both its recognition render and its code-scan render.
        assert_eq!(result.report.units_failed, 2);
        // Page 2 still contributed its rendered recognition.
        assert_eq!(result.report.rendered_pages_recognized, 1);
        assert!(result.text.contains("ocr 100x100"));
    }

    #[test]
    fn empty_document_assembles_to_empty_text() {
        let doc = MockDocument::default();
        let result = assemble(&doc);
        assert_eq!(result.kind, DocKind::Scanned);
        assert!(result.text.is_empty());
    }
}
