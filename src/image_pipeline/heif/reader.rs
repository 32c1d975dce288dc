use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raster::types::RasterImage;

/// Decodes an encoded source image into a raster.
///
/// Implementations are shared across worker threads.
pub trait ImageReader: Send + Sync {
    fn read_image(&self, data: &[u8]) -> Result<RasterImage>;
}
