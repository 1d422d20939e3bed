use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Recognition engine construction failed: {0}")]
    Construct(String),
    #[error("Recognition engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// The part of the engine configuration that forces a distinct instance.
/// The pool caches one engine per distinct value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineOptions {
    /// Ask the engine to detect and correct rotated text.
    pub orientation_correction: bool,
}

/// Abstraction over a recognition engine.
/// Implementations accept a 3-channel raster and return the detected line
/// fragments in reading order; an empty list means nothing was found.
pub trait TextRecognizer: Send + Sync {
    fn recognize_lines(&self, image: &RgbImage) -> Result<Vec<String>, OcrError>;
}

/// Constructs engines on demand. Construction is the expensive step — the
/// pool calls this once per distinct [`EngineOptions`] value.
pub trait RecognizerFactory: Send + Sync {
    type Engine: TextRecognizer;

    fn create(&self, options: EngineOptions) -> Result<Self::Engine, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set fragment list — lets the assembly and pool logic be
/// tested without any recognition engine installed.
pub struct MockRecognizer {
    lines: Vec<String>,
    recognitions: Arc<AtomicUsize>,
}

impl MockRecognizer {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines, recognitions: Arc::new(AtomicUsize::new(0)) }
    }
}

impl TextRecognizer for MockRecognizer {
    fn recognize_lines(&self, _image: &RgbImage) -> Result<Vec<String>, OcrError> {
        self.recognitions.fetch_add(1, Ordering::SeqCst);
        Ok(self.lines.clone())
    }
}

/// Factory for [`MockRecognizer`]s that counts constructions and
/// recognitions, so tests can assert on engine reuse and on calls that must
/// never reach an engine.
#[derive(Clone, Default)]
pub struct MockRecognizerFactory {
    pub lines: Vec<String>,
    pub created: Arc<AtomicUsize>,
    pub recognitions: Arc<AtomicUsize>,
}

impl MockRecognizerFactory {
    pub fn new(lines: Vec<impl Into<String>>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            created: Arc::new(AtomicUsize::new(0)),
            recognitions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn engines_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn recognitions_run(&self) -> usize {
        self.recognitions.load(Ordering::SeqCst)
    }
}

impl RecognizerFactory for MockRecognizerFactory {
    type Engine = MockRecognizer;

    fn create(&self, _options: EngineOptions) -> Result<MockRecognizer, OcrError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(MockRecognizer {
            lines: self.lines.clone(),
            recognitions: self.recognitions.clone(),
        })
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use std::io::Cursor;
    use std::sync::Mutex;

    use image::RgbImage;
    use leptess::{LepTess, Variable};

    use super::{EngineOptions, OcrError, RecognizerFactory, TextRecognizer};

    pub struct TesseractRecognizer {
        // LepTess mutates internal state per image; the pool shares engines,
        // so serialize access here.
        engine: Mutex<LepTess>,
    }

    impl TextRecognizer for TesseractRecognizer {
        fn recognize_lines(&self, image: &RgbImage) -> Result<Vec<String>, OcrError> {
            let mut png = Vec::new();
            image::DynamicImage::ImageRgb8(image.clone())
                .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                .map_err(|e| OcrError::Engine(e.to_string()))?;

            let mut engine = self.engine.lock().unwrap_or_else(|e| e.into_inner());
            engine
                .set_image_from_mem(&png)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            let text = engine
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))?;

            Ok(text
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect())
        }
    }

    pub struct TesseractRecognizerFactory {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizerFactory {
        /// Tesseract runs on CPU only; the pipeline's GPU flag has no effect
        /// on this backend.
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl RecognizerFactory for TesseractRecognizerFactory {
        type Engine = TesseractRecognizer;

        fn create(&self, options: EngineOptions) -> Result<TesseractRecognizer, OcrError> {
            let mut engine = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Construct(e.to_string()))?;
            // PSM 1 = automatic segmentation with orientation/script detection.
            let psm = if options.orientation_correction { "1" } else { "3" };
            engine
                .set_variable(Variable::TesseditPagesegMode, psm)
                .map_err(|e| OcrError::Construct(e.to_string()))?;
            Ok(TesseractRecognizer { engine: Mutex::new(engine) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn mock_returns_preset_lines() {
        let r = MockRecognizer::new(vec!["PRIZES".into(), "1st 2500".into()]);
        let img = RgbImage::from_pixel(32, 32, image::Rgb([255, 255, 255]));
        assert_eq!(r.recognize_lines(&img).unwrap(), vec!["PRIZES", "1st 2500"]);
    }

    #[test]
    fn mock_factory_counts_constructions() {
        let factory = MockRecognizerFactory::new(vec!["x"]);
        let opts = EngineOptions { orientation_correction: true };
        let _a = factory.create(opts).unwrap();
        let _b = factory.create(opts).unwrap();
        assert_eq!(factory.engines_created(), 2);
    }

    #[test]
    fn mock_factory_counts_recognitions_across_engines() {
        let factory = MockRecognizerFactory::new(vec!["x"]);
        let engine = factory
            .create(EngineOptions { orientation_correction: false })
            .unwrap();
        let img = RgbImage::from_pixel(32, 32, image::Rgb([0, 0, 0]));
        engine.recognize_lines(&img).unwrap();
        engine.recognize_lines(&img).unwrap();
        assert_eq!(factory.recognitions_run(), 2);
    }
}
