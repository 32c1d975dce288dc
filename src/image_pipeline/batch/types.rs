//! Batch job and result types

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::image_pipeline::batch::timing::PipelineTimings;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::encode::types::TargetFormat;

/// Where a job's encoded source comes from
#[derive(Debug, Clone)]
pub enum JobSource {
    /// Read from the filesystem when the job runs
    Path(PathBuf),
    /// Already in memory, e.g. an uploaded body
    Bytes(Vec<u8>),
}

impl JobSource {
    /// Consumes the source and returns its bytes, enforcing the size limit.
    pub(crate) fn into_bytes(self, max_bytes: Option<u64>) -> Result<Vec<u8>> {
        match self {
            JobSource::Path(path) => {
                let open_error =
                    |e: std::io::Error| ConversionError::OpenError(format!("{}: {}", path.display(), e));

                let metadata = fs::metadata(&path).map_err(open_error)?;
                check_size(&path.display().to_string(), metadata.len(), max_bytes)?;
                fs::read(&path).map_err(open_error)
            }
            JobSource::Bytes(data) => {
                let len = u64::try_from(data.len()).unwrap_or(u64::MAX);
                check_size("in-memory source", len, max_bytes)?;
                Ok(data)
            }
        }
    }
}

fn check_size(label: &str, len: u64, max_bytes: Option<u64>) -> Result<()> {
    match max_bytes {
        Some(max) if len > max => Err(ConversionError::OpenError(format!(
            "{}: {} bytes exceeds the {} byte limit",
            label, len, max
        ))),
        _ => Ok(()),
    }
}

/// Where a successful job puts its encoded bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Keep the bytes in the result
    #[default]
    Memory,
    /// Write the bytes to this path, creating parent directories
    File(PathBuf),
}

impl OutputTarget {
    pub(crate) fn store(self, encoded: Vec<u8>) -> Result<ConvertedOutput> {
        match self {
            OutputTarget::Memory => Ok(ConvertedOutput::Bytes(encoded)),
            OutputTarget::File(path) => {
                write_output_file(&path, &encoded)?;
                Ok(ConvertedOutput::File(path))
            }
        }
    }
}

fn write_output_file(path: &Path, encoded: &[u8]) -> Result<()> {
    let write_error = |e: std::io::Error| ConversionError::OutputWriteError(format!("{}: {}", path.display(), e));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
    writer.write_all(encoded).map_err(write_error)?;
    writer.flush().map_err(write_error)?;
    Ok(())
}

/// One unit of work: a source, the requested format and an output target.
///
/// The requested format is kept as given so that an unknown format fails
/// this job alone.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub(crate) source_id: String,
    pub(crate) source: JobSource,
    pub(crate) target_format: String,
    pub(crate) output: OutputTarget,
}

impl ConversionJob {
    pub fn new(source_id: impl Into<String>, source: JobSource, target_format: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source,
            target_format: target_format.into(),
            output: OutputTarget::Memory,
        }
    }

    /// Job reading `path`, identified by its display form.
    pub fn from_path(path: impl Into<PathBuf>, target_format: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(path.display().to_string(), JobSource::Path(path), target_format)
    }

    pub fn from_bytes(source_id: impl Into<String>, data: Vec<u8>, target_format: impl Into<String>) -> Self {
        Self::new(source_id, JobSource::Bytes(data), target_format)
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_format(&self) -> &str {
        &self.target_format
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertedOutput {
    Bytes(Vec<u8>),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ConversionSuccess {
    pub source_id: String,
    pub format: TargetFormat,
    pub width: usize,
    pub height: usize,
    pub output: ConvertedOutput,
    pub timings: PipelineTimings,
}

impl ConversionSuccess {
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.output {
            ConvertedOutput::Bytes(bytes) => Some(bytes),
            ConvertedOutput::File(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.output {
            ConvertedOutput::File(path) => Some(path),
            ConvertedOutput::Bytes(_) => None,
        }
    }
}

#[derive(Error, Debug)]
#[error("{source_id}: {error}")]
pub struct JobFailure {
    pub source_id: String,
    #[source]
    pub error: ConversionError,
}

#[derive(Debug)]
pub enum ConversionResult {
    Success(ConversionSuccess),
    Failure(JobFailure),
}

impl ConversionResult {
    pub fn source_id(&self) -> &str {
        match self {
            ConversionResult::Success(s) => &s.source_id,
            ConversionResult::Failure(f) => &f.source_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }

    pub fn as_success(&self) -> Option<&ConversionSuccess> {
        match self {
            ConversionResult::Success(s) => Some(s),
            ConversionResult::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&JobFailure> {
        match self {
            ConversionResult::Failure(f) => Some(f),
            ConversionResult::Success(_) => None,
        }
    }
}
