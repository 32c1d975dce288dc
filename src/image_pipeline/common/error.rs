use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to open source: {0}")]
    OpenError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode source image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Unsupported target format: {0}")]
    UnsupportedFormat(String),

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConversionError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
