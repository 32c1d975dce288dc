use std::io::{Cursor, Write};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::encode::types::{EncoderConfig, TargetFormat, TiffCompression};
use crate::image_pipeline::encode::writer::ImageWriter;
use crate::image_pipeline::raster::types::{PixelLayout, RasterImage};

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardImageWriter;

fn encode_error(e: impl std::fmt::Display) -> ConversionError {
    ConversionError::EncodeError(e.to_string())
}

fn dimensions_u32(image: &RasterImage) -> Result<(u32, u32)> {
    match (u32::try_from(image.width), u32::try_from(image.height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(ConversionError::InvalidDimensions(image.width, image.height)),
    }
}

impl StandardImageWriter {
    fn encode_jpeg(&self, image: &RasterImage, width: u32, height: u32, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality)
            .write_image(&image.data, width, height, ExtendedColorType::Rgb8)
            .map_err(encode_error)?;
        Ok(buffer)
    }

    fn encode_png(&self, image: &RasterImage, width: u32, height: u32) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(&image.data, width, height, ExtendedColorType::Rgb8)
            .map_err(encode_error)?;
        Ok(buffer)
    }

    fn encode_tiff(&self, image: &RasterImage, width: u32, height: u32, compression: TiffCompression) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();

        let compression = match compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
        };

        let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(encode_error)?
            .with_compression(compression);

        encoder
            .write_image::<tiff::encoder::colortype::RGB8>(width, height, &image.data)
            .map_err(encode_error)?;

        Ok(buffer)
    }
}

impl ImageWriter for StandardImageWriter {
    fn supported_formats(&self) -> &[TargetFormat] {
        &TargetFormat::ALL
    }

    fn write_image(
        &self,
        image: &RasterImage,
        format: TargetFormat,
        output: &mut dyn Write,
        config: &EncoderConfig,
    ) -> Result<()> {
        debug!("Encoding {} image: {}x{}", format, image.width, image.height);

        let normalized;
        let image = if image.layout == PixelLayout::Rgb8 {
            image
        } else {
            normalized = image.clone().into_rgb8();
            &normalized
        };

        let (width, height) = dimensions_u32(image)?;

        let buffer = match format {
            TargetFormat::Jpeg => self.encode_jpeg(image, width, height, config.jpeg_quality)?,
            TargetFormat::Png => self.encode_png(image, width, height)?,
            TargetFormat::Tiff => self.encode_tiff(image, width, height, config.tiff_compression)?,
        };

        output.write_all(&buffer)?;

        debug!("{} encoding complete, {} bytes", format, buffer.len());
        Ok(())
    }
}
