//! HEIF/HEIC reader implementation using libheif.
//!
//! Only the primary image of the container is decoded. Images carrying an
//! alpha plane are decoded as RGBA, everything else as RGB, both at 8 bits per
//! channel.

use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::heif::reader::ImageReader;
use crate::image_pipeline::raster::types::{PixelLayout, RasterImage};

/// HEIF/HEIC reader backed by the system libheif library.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibheifReader;

fn decode_error(e: impl std::fmt::Display) -> ConversionError {
    ConversionError::DecodeError(e.to_string())
}

impl ImageReader for LibheifReader {
    /// Decodes the primary image of a HEIF container into an interleaved raster.
    ///
    /// libheif rows may be padded; the stride is removed so the returned
    /// buffer is tightly packed.
    fn read_image(&self, data: &[u8]) -> Result<RasterImage> {
        debug!("Decoding HEIF image, {} bytes", data.len());

        let lib_heif = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(data).map_err(decode_error)?;
        let handle = ctx.primary_image_handle().map_err(decode_error)?;

        let (chroma, layout) = if handle.has_alpha_channel() {
            (RgbChroma::Rgba, PixelLayout::Rgba8)
        } else {
            (RgbChroma::Rgb, PixelLayout::Rgb8)
        };

        let image = lib_heif
            .decode(&handle, ColorSpace::Rgb(chroma), None)
            .map_err(decode_error)?;

        let planes = image.planes();
        let interleaved = planes
            .interleaved
            .ok_or_else(|| ConversionError::DecodeError("no interleaved plane in decoded image".to_string()))?;

        let width = interleaved.width as usize;
        let height = interleaved.height as usize;
        let row_len = width * layout.channels();

        debug!("Decoded HEIF image: {}x{}, stride {}", width, height, interleaved.stride);

        if interleaved.stride == 0 || interleaved.stride < row_len {
            return Err(ConversionError::DecodeError(format!(
                "plane stride {} is shorter than a row of {} bytes",
                interleaved.stride, row_len
            )));
        }

        let mut pixels = Vec::with_capacity(row_len * height);
        for row in interleaved.data.chunks(interleaved.stride).take(height) {
            let row = row.get(..row_len).ok_or_else(|| {
                ConversionError::DecodeError(format!("short row in decoded plane: {} < {}", row.len(), row_len))
            })?;
            pixels.extend_from_slice(row);
        }

        RasterImage::new(width, height, layout, pixels)
    }
}
