pub mod pool;
pub mod preprocess;
pub mod qr;
pub mod recognizer;

pub use pool::RecognizerPool;
pub use preprocess::{prepare_for_recognition, MIN_RECOGNIZABLE_PX};
pub use qr::{scan_codes, MIN_SCANNABLE_PX};
pub use recognizer::{
    EngineOptions, MockRecognizer, MockRecognizerFactory, OcrError, RecognizerFactory,
    TextRecognizer,
};
