use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use prospekt_core::OcrSource;
use prospekt_pdf::RasterImage;

use crate::preprocess::{prepare_for_recognition, MIN_RECOGNIZABLE_PX};
use crate::recognizer::{EngineOptions, OcrError, RecognizerFactory, TextRecognizer};

/// Lazily constructed, never-evicted cache of recognition engines.
///
/// Engine construction (model loading) dwarfs per-image recognition cost, so
/// the pool keeps at most one engine per distinct [`EngineOptions`] value for
/// its whole lifetime. The cache is append-only behind a plain mutex; engines
/// themselves are stateless across calls beyond their cached weights, so a
/// shared pool is safe to call from concurrent workers.
pub struct RecognizerPool<F: RecognizerFactory> {
    factory: F,
    max_embedded_dimension: u32,
    engines: Mutex<HashMap<EngineOptions, Arc<F::Engine>>>,
}

impl<F: RecognizerFactory> RecognizerPool<F> {
    pub fn new(factory: F, max_embedded_dimension: u32) -> Self {
        Self {
            factory,
            max_embedded_dimension,
            engines: Mutex::new(HashMap::new()),
        }
    }

    /// Recognize text in one raster.
    ///
    /// Inputs below 20×20 px return an empty string without touching an
    /// engine. An engine *call* failure is logged and likewise yields an
    /// empty string — malformed rasters must not abort the caller's page
    /// loop. Only engine *construction* failure is an error, since nothing
    /// else will succeed afterwards either.
    pub fn recognize(
        &self,
        image: &RasterImage,
        source: OcrSource,
        options: EngineOptions,
    ) -> Result<String, OcrError> {
        if image.width() < MIN_RECOGNIZABLE_PX || image.height() < MIN_RECOGNIZABLE_PX {
            debug!(
                page = image.page,
                width = image.width(),
                height = image.height(),
                "Raster below recognizable size, skipping"
            );
            return Ok(String::new());
        }

        let prepared = prepare_for_recognition(image, source, self.max_embedded_dimension);
        let engine = self.engine(options)?;

        match engine.recognize_lines(&prepared) {
            Ok(lines) => Ok(lines.join("\n")),
            Err(e) => {
                warn!(page = image.page, error = %e, "Recognition failed, treating as empty");
                Ok(String::new())
            }
        }
    }

    fn engine(&self, options: EngineOptions) -> Result<Arc<F::Engine>, OcrError> {
        let mut cache = self.engines.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(engine) = cache.get(&options) {
            return Ok(Arc::clone(engine));
        }
        debug!(?options, "Constructing recognition engine");
        let engine = Arc::new(self.factory.create(options)?);
        cache.insert(options, Arc::clone(&engine));
        Ok(engine)
    }
}
