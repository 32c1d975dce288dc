use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::encode::types::{EncoderConfig, TargetFormat};
use crate::image_pipeline::raster::types::RasterImage;

/// Encodes RGB8 rasters into one of the formats it declares.
pub trait ImageWriter: Send + Sync {
    fn supported_formats(&self) -> &[TargetFormat];

    fn write_image(
        &self,
        image: &RasterImage,
        format: TargetFormat,
        output: &mut dyn Write,
        config: &EncoderConfig,
    ) -> Result<()>;

    fn supports(&self, format: TargetFormat) -> bool {
        self.supported_formats().contains(&format)
    }
}
