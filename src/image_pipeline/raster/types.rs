//! Decoded raster image types

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Channel layout of an interleaved 8-bit raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// Single luminance channel
    Gray8,
    /// Interleaved [R, G, B, R, G, B, ...]
    Rgb8,
    /// Interleaved [R, G, B, A, R, G, B, A, ...]
    Rgba8,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Gray8 => 1,
            PixelLayout::Rgb8 => 3,
            PixelLayout::Rgba8 => 4,
        }
    }
}

/// Represents a decoded image held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Channel layout of `data`
    pub layout: PixelLayout,
    /// Pixel data, row-major with no padding between rows
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Builds a raster, rejecting buffers whose length does not match the geometry.
    pub fn new(width: usize, height: usize, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(layout.channels()))
            .ok_or(ConversionError::InvalidDimensions(width, height))?;

        if data.len() != expected {
            return Err(ConversionError::DecodeError(format!(
                "pixel buffer holds {} bytes, expected {} for {}x{} {:?}",
                data.len(),
                expected,
                width,
                height,
                layout
            )));
        }

        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Converts the raster to interleaved RGB8, the form every encoder accepts.
    ///
    /// Gray samples are replicated across the three channels and alpha is dropped.
    pub fn into_rgb8(self) -> RasterImage {
        let data = match self.layout {
            PixelLayout::Rgb8 => self.data,
            PixelLayout::Gray8 => self.data.iter().flat_map(|&v| [v, v, v]).collect(),
            PixelLayout::Rgba8 => self
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
        };

        RasterImage {
            width: self.width,
            height: self.height,
            layout: PixelLayout::Rgb8,
            data,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_short_buffer() {
        let result = RasterImage::new(2, 2, PixelLayout::Rgb8, vec![0u8; 11]);
        assert!(matches!(result, Err(ConversionError::DecodeError(_))));
    }

    #[test]
    fn test_gray_expands_to_rgb() {
        let image = RasterImage::new(2, 1, PixelLayout::Gray8, vec![10, 200]).unwrap();
        let rgb = image.into_rgb8();
        assert_eq!(rgb.layout, PixelLayout::Rgb8);
        assert_eq!(rgb.data, vec![10, 10, 10, 200, 200, 200]);
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let image = RasterImage::new(1, 2, PixelLayout::Rgba8, vec![1, 2, 3, 255, 4, 5, 6, 0]).unwrap();
        let rgb = image.into_rgb8();
        assert_eq!(rgb.data, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!((rgb.width, rgb.height), (1, 2));
    }

    #[test]
    fn test_rgb_is_untouched() {
        let data = vec![9u8; 3 * 4];
        let image = RasterImage::new(2, 2, PixelLayout::Rgb8, data.clone()).unwrap();
        assert_eq!(image.into_rgb8().data, data);
    }
}
