//! Source image decoding module
//!
//! HEIF/HEIC decoding goes through libheif when the `heif` feature is enabled.
//! Without it the `image` crate decoder is used, which covers JPEG, PNG and TIFF
//! sources but not HEIC.

mod reader;
mod image_crate_reader;
#[cfg(feature = "heif")]
mod libheif_reader;

pub use reader::ImageReader;
pub use image_crate_reader::ImageCrateReader;
#[cfg(feature = "heif")]
pub use libheif_reader::LibheifReader;

#[cfg(feature = "heif")]
pub type DefaultImageReader = LibheifReader;

#[cfg(not(feature = "heif"))]
pub type DefaultImageReader = ImageCrateReader;

/// Whether the default reader can decode HEIC containers.
pub const HEIC_DECODING_AVAILABLE: bool = cfg!(feature = "heif");
