pub mod assembler;
pub mod classifier;
pub mod chunker;
pub mod prize;

pub use assembler::{AssembledDocument, Assembler, AssemblyReport, PipelineError};
pub use chunker::chunk_text;
pub use classifier::classify;
pub use prize::{normalize_prizes, PrizeEntry};

use tracing::info;

use prospekt_core::{DocKind, PipelineConfig};
use prospekt_ocr::{RecognizerFactory, RecognizerPool};
use prospekt_pdf::DocumentSource;

/// The pipeline's final artifact: bounded chunks whose concatenation is the
/// full normalized text stream, plus the assembly accounting.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub kind: DocKind,
    pub chunks: Vec<String>,
    pub report: AssemblyReport,
}

/// Run the whole pipeline over one document: classify, assemble every
/// recoverable signal, recover flattened prize structure, and chunk.
pub fn process_document<D: DocumentSource, F: RecognizerFactory>(
    source: &D,
    pool: &RecognizerPool<F>,
    config: &PipelineConfig,
) -> Result<ProcessedDocument, PipelineError> {
    let assembled = Assembler::new(source, pool, config).assemble()?;
    let normalized = normalize_prizes(&assembled.text);
    let chunks = chunk_text(&normalized, config.max_chunk_chars);
    info!(kind = %assembled.kind, chunks = chunks.len(), "Document processed");

    Ok(ProcessedDocument {
        kind: assembled.kind,
        chunks,
        report: assembled.report,
    })
}
