use tracing::debug;

use prospekt_pdf::RasterImage;

/// Below this edge length the finder patterns cannot resolve; such rasters
/// are skipped without attempting detection.
pub const MIN_SCANNABLE_PX: u32 = 24;

/// Decode machine-readable codes from a raster, returning zero, one, or many
/// payloads in detection order.
///
/// Detection runs over every candidate grid in the image (multi-code), and
/// each grid decodes independently — a malformed grid is dropped, not
/// propagated, since damaged embedded images are routine in brochures.
pub fn scan_codes(image: &RasterImage) -> Vec<String> {
    if image.width() < MIN_SCANNABLE_PX || image.height() < MIN_SCANNABLE_PX {
        return Vec::new();
    }

    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            gray.get_pixel(x as u32, y as u32)[0]
        });
    let grids = prepared.detect_grids();
    let mut payloads = Vec::new();

    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) if !content.is_empty() => payloads.push(content),
            Ok(_) => {}
            Err(e) => {
                debug!(page = image.page, error = %e, "Skipping undecodable code grid");
            }
        }
    }

    payloads
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    fn gray_raster(width: u32, height: u32, value: u8) -> RasterImage {
        RasterImage::new(
            1,
            DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value]))),
        )
    }

    #[test]
    fn undersized_raster_is_skipped() {
        assert!(scan_codes(&gray_raster(23, 100, 0)).is_empty());
        assert!(scan_codes(&gray_raster(100, 23, 0)).is_empty());
    }

    #[test]
    fn blank_raster_yields_no_codes() {
        assert!(scan_codes(&gray_raster(200, 200, 255)).is_empty());
    }

    #[test]
    fn noise_does_not_panic() {
        let img = GrayImage::from_fn(64, 64, |x, y| Luma([((x * 31 + y * 17) % 251) as u8]));
        let raster = RasterImage::new(1, DynamicImage::ImageLuma8(img));
        // Whatever the detector thinks of this, it must return, not panic.
        let _ = scan_codes(&raster);
    }
}
