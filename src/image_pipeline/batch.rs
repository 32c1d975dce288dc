//! Batch conversion module
//!
//! Fans independent conversion jobs out over a bounded worker pool, joins on
//! all of them and reduces the per-job results according to the failure policy.

mod cancel;
mod config;
mod converter;
mod outcome;
mod timing;
pub mod types;


pub use cancel::CancellationFlag;
pub use config::{BatchConfig, BatchConfigBuilder, DEFAULT_MAX_SOURCE_BYTES, FailurePolicy};
pub use converter::BatchConverter;
pub use outcome::{BatchError, BatchOutcome, BatchReport};
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use types::{ConversionJob, ConversionResult, ConversionSuccess, ConvertedOutput, JobFailure, JobSource, OutputTarget};
