//! Output encoding module
//!
//! JPEG and PNG go through the `image` crate codecs, TIFF through the `tiff` encoder.

mod writer;
mod standard_writer;
pub mod types;

pub use writer::ImageWriter;
pub use standard_writer::StandardImageWriter;
pub use types::{EncoderConfig, EncoderConfigBuilder, TargetFormat, TiffCompression};
