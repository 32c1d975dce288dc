//! Output format and encoder configuration types

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::ConversionError;

/// Target formats a batch job may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    Jpeg,
    Png,
    Tiff,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 3] = [TargetFormat::Jpeg, TargetFormat::Png, TargetFormat::Tiff];

    /// File extension written for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Png => "png",
            TargetFormat::Tiff => "tiff",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "png" => Ok(TargetFormat::Png),
            "tiff" | "tif" => Ok(TargetFormat::Tiff),
            _ => Err(ConversionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression, fast level
    DeflateFast,
    /// Deflate compression, balanced level
    DeflateBalanced,
    /// Deflate compression, best ratio
    DeflateBest,
}

/// Settings passed to an [`ImageWriter`](super::ImageWriter) for every job
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
    /// Compression used inside TIFF containers
    pub tiff_compression: TiffCompression,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            tiff_compression: TiffCompression::None,
        }
    }
}

impl EncoderConfig {
    pub fn builder() -> EncoderConfigBuilder {
        EncoderConfigBuilder::default()
    }
}

/// Builder for EncoderConfig
#[derive(Default)]
pub struct EncoderConfigBuilder {
    jpeg_quality: Option<u8>,
    tiff_compression: Option<TiffCompression>,
}

impl EncoderConfigBuilder {
    /// Quality is clamped to 1..=100.
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality.clamp(1, 100));
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    pub fn build(self) -> EncoderConfig {
        let default = EncoderConfig::default();
        EncoderConfig {
            jpeg_quality: self.jpeg_quality.unwrap_or(default.jpeg_quality),
            tiff_compression: self.tiff_compression.unwrap_or(default.tiff_compression),
        }
    }
}
