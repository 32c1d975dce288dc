//! HEIC batch conversion pipeline
//!
//! Sources are decoded by an [`ImageReader`], normalised to interleaved RGB8,
//! and re-encoded by an [`ImageWriter`]. The [`BatchConverter`] runs many such
//! conversions concurrently and collects one result per job.

pub mod batch;
pub mod common;
pub mod encode;
pub mod heif;
pub mod raster;
pub mod scan;

pub use common::{
    ConversionError,
    Result,
};

pub use raster::{
    PixelLayout,
    RasterImage,
};

pub use heif::{
    DefaultImageReader,
    HEIC_DECODING_AVAILABLE,
    ImageCrateReader,
    ImageReader,
};

#[cfg(feature = "heif")]
pub use heif::LibheifReader;

pub use encode::{
    EncoderConfig,
    EncoderConfigBuilder,
    ImageWriter,
    StandardImageWriter,
    TargetFormat,
    TiffCompression,
};

pub use batch::{
    BatchConfig,
    BatchConfigBuilder,
    BatchConverter,
    BatchError,
    BatchOutcome,
    BatchReport,
    CancellationFlag,
    ConversionJob,
    ConversionResult,
    ConversionSuccess,
    ConvertedOutput,
    FailurePolicy,
    JobFailure,
    JobSource,
    OutputTarget,
};
