use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use prospekt_core::PipelineConfig;
use prospekt_ocr::RecognizerPool;
use prospekt_pdf::PdfBrochure;
use prospekt_pipeline::process_document;

/// Extract every recoverable signal from a brochure PDF — native text,
/// recognized text, QR payloads, annotation links — into ordered, bounded
/// text chunks.
#[derive(Debug, Parser)]
#[command(name = "prospekt", version, about)]
struct Cli {
    /// Brochure PDF to process.
    input: PathBuf,

    /// TOML file overriding pipeline thresholds.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the chunks (defaults to `<input>_extracted.txt`).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Emit the chunks as a JSON array instead of the text format.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => prospekt_core::load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    #[cfg(feature = "tesseract")]
    let factory =
        prospekt_ocr::recognizer::tesseract_backend::TesseractRecognizerFactory::new(None, "eng");
    #[cfg(not(feature = "tesseract"))]
    let factory = {
        tracing::warn!(
            "built without an OCR backend (`tesseract` feature); recognition sections will be empty"
        );
        prospekt_ocr::MockRecognizerFactory::new(Vec::<String>::new())
    };

    let pool = RecognizerPool::new(factory, config.max_embedded_dimension);
    let source = PdfBrochure::open(&cli.input, config.min_image_px)?;

    let processed = process_document(&source, &pool, &config)?;

    let output_path = cli
        .output
        .unwrap_or_else(|| default_output_path(&cli.input));
    let rendered = if cli.json {
        let mut json = serde_json::to_string_pretty(&processed.chunks)?;
        json.push('\n');
        json
    } else {
        render_chunks(&processed.chunks)
    };
    std::fs::write(&output_path, rendered)
        .with_context(|| format!("writing {}", output_path.display()))?;

    tracing::info!(
        kind = %processed.kind,
        chunks = processed.chunks.len(),
        output = %output_path.display(),
        "Extraction complete"
    );
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("brochure");
    input.with_file_name(format!("{stem}_extracted.txt"))
}

fn render_chunks(chunks: &[String]) -> String {
    let mut out = String::new();
    for (index, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!("\n--- Chunk {} ---\n\n", index + 1));
        out.push_str(chunk);
    }
    out
}
