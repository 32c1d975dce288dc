//! Raster image module
//!
//! In-memory decoded images and the colour normalisation applied before encoding.

pub mod types;

pub use types::{PixelLayout, RasterImage};
