use image::{ColorType, DynamicImage, GrayImage, RgbImage};

/// Broad channel-layout classification for a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Rgb,
    Gray,
    Rgba,
    /// CMYK-like or exotic buffers; consumers take the first three channels.
    Other,
}

/// A raster image recovered from a document, tagged with the 1-indexed page
/// it was found on. The pixel buffer is owned exclusively by whichever
/// extraction step produced it.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub page: u32,
    pub image: DynamicImage,
}

impl RasterImage {
    pub fn new(page: u32, image: DynamicImage) -> Self {
        Self { page, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn channel_layout(&self) -> ChannelLayout {
        match self.image.color() {
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => ChannelLayout::Rgb,
            ColorType::L8 | ColorType::L16 => ChannelLayout::Gray,
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => ChannelLayout::Rgba,
            _ => ChannelLayout::Other,
        }
    }

    /// Three-channel view for recognition. Alpha and extra channels are
    /// dropped; grayscale is expanded.
    pub fn to_rgb8(&self) -> RgbImage {
        self.image.to_rgb8()
    }

    /// Single-channel view for code scanning.
    pub fn to_luma8(&self) -> GrayImage {
        self.image.to_luma8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgba};

    #[test]
    fn channel_layout_classification() {
        let gray = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(2, 2, Luma([7u8])));
        assert_eq!(RasterImage::new(1, gray).channel_layout(), ChannelLayout::Gray);

        let rgba =
            DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba([1u8, 2, 3, 4])));
        assert_eq!(RasterImage::new(1, rgba).channel_layout(), ChannelLayout::Rgba);
    }

    #[test]
    fn to_rgb8_drops_alpha() {
        let rgba =
            DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba([10u8, 20, 30, 200])));
        let rgb = RasterImage::new(1, rgba).to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }
}
