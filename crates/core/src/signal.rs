use serde::{Deserialize, Serialize};
use std::fmt;

/// Composition verdict for a whole document, driving the OCR strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    /// Every page carries a usable native text layer.
    Digital,
    /// The text layer is absent or too thin to trust.
    Scanned,
    /// A text layer exists but some pages need recognition.
    Hybrid,
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocKind::Digital => write!(f, "digital"),
            DocKind::Scanned => write!(f, "scanned"),
            DocKind::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Where a recognized-text signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrSource {
    /// A full page rasterized at the OCR render resolution.
    Rendered,
    /// An image embedded in the page's content stream.
    Embedded,
}

/// The native text layer of one page. Pages are 1-indexed and never mutated
/// after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page: u32,
    pub content: String,
}

/// Per-page counts used by the classifier, cheap to compute in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub page: u32,
    /// Length of the trimmed native text layer.
    pub text_len: usize,
    pub has_images: bool,
}

/// A clickable URI annotation found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub page: u32,
    pub uri: String,
}

/// One recovered signal, tagged with the page it was found on. Signals are
/// append-only: the assembler orders and deduplicates them but never edits
/// one after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Text { page: u32, content: String },
    RecognizedText { page: u32, content: String, source: OcrSource },
    Code { page: u32, value: String },
    Link { page: u32, uri: String },
}

impl Signal {
    pub fn page(&self) -> u32 {
        match self {
            Signal::Text { page, .. }
            | Signal::RecognizedText { page, .. }
            | Signal::Code { page, .. }
            | Signal::Link { page, .. } => *page,
        }
    }
}
