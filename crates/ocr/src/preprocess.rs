use image::RgbImage;
use tracing::debug;

use prospekt_core::OcrSource;
use prospekt_pdf::RasterImage;

/// Recognition models are unreliable below this edge length; smaller inputs
/// are rejected before they reach an engine.
pub const MIN_RECOGNIZABLE_PX: u32 = 20;

/// Normalize a raster for recognition: three channels always, and an
/// aspect-preserving downscale for oversized embedded images. Rendered full
/// pages are produced at a controlled target resolution and are never
/// downscaled.
pub fn prepare_for_recognition(
    image: &RasterImage,
    source: OcrSource,
    max_embedded_dimension: u32,
) -> RgbImage {
    let rgb = image.to_rgb8();
    match source {
        OcrSource::Rendered => rgb,
        OcrSource::Embedded => downscale_if_oversized(rgb, max_embedded_dimension),
    }
}

fn downscale_if_oversized(rgb: RgbImage, max_dimension: u32) -> RgbImage {
    let (width, height) = rgb.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return rgb;
    }

    let scale = max_dimension as f64 / width.max(height) as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    debug!(width, height, new_width, new_height, "Downscaling oversized embedded image");

    // thumbnail() is a box filter — area averaging, no aliasing artifacts.
    image::imageops::thumbnail(&rgb, new_width, new_height)
}
