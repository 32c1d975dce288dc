//! Source reader backed by the `image` crate decoders.

use image::DynamicImage;
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::heif::reader::ImageReader;
use crate::image_pipeline::raster::types::{PixelLayout, RasterImage};

/// Reader for any still-image format the `image` crate can guess from the
/// leading bytes (JPEG, PNG, TIFF).
///
/// HEIC is not among them; this reader stands in when libheif is not linked.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateReader;

impl ImageReader for ImageCrateReader {
    fn read_image(&self, data: &[u8]) -> Result<RasterImage> {
        debug!("Decoding source image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

        let width = decoded.width() as usize;
        let height = decoded.height() as usize;

        // Higher bit depths are narrowed to 8 bits per channel
        let (layout, pixels) = match decoded {
            DynamicImage::ImageLuma8(buf) => (PixelLayout::Gray8, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (PixelLayout::Rgb8, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (PixelLayout::Rgba8, buf.into_raw()),
            other if other.color().has_alpha() => (PixelLayout::Rgba8, other.to_rgba8().into_raw()),
            other if other.color().has_color() => (PixelLayout::Rgb8, other.to_rgb8().into_raw()),
            other => (PixelLayout::Gray8, other.to_luma8().into_raw()),
        };

        debug!("Decoded image: {}x{} {:?}", width, height, layout);

        RasterImage::new(width, height, layout, pixels)
    }
}
