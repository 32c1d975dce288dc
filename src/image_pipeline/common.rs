//! Shared error type for every pipeline stage.

pub mod error;

pub use error::{ConversionError, Result};
