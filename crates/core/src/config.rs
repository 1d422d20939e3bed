use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable thresholds for the whole extraction pipeline.
///
/// Every field has a default matching the reference behavior, so a partial
/// TOML file (or none at all) is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// A page counts as text-bearing once its native text exceeds this.
    pub min_text_chars: usize,
    /// Below this share of text-bearing pages a document with images is
    /// treated as scanned.
    pub min_text_ratio: f64,
    /// Embedded images with a smaller width or height are ignored (icons,
    /// decorations).
    pub min_image_px: u32,
    /// Resolution for rendering pages destined for OCR.
    pub ocr_render_dpi: u32,
    /// Resolution for rendering pages destined for QR scanning.
    pub qr_render_dpi: u32,
    /// Embedded images are downscaled once either dimension exceeds this.
    pub max_embedded_dimension: u32,
    /// Soft upper bound on chunk size, in characters.
    pub max_chunk_chars: usize,
    /// Ask the recognition engine to correct rotated text.
    pub orientation_correction: bool,
    /// Allow the recognition engine to use GPU acceleration if its backend
    /// supports it.
    pub ocr_use_gpu: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 50,
            min_text_ratio: 0.3,
            min_image_px: 50,
            ocr_render_dpi: 300,
            qr_render_dpi: 200,
            max_embedded_dimension: 3000,
            max_chunk_chars: 2000,
            orientation_correction: true,
            ocr_use_gpu: false,
        }
    }
}

/// Load a `PipelineConfig` from a TOML file. Missing keys fall back to the
/// defaults above.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}
