//! Batch conversion configuration types

use crate::image_pipeline::encode::types::EncoderConfig;

/// Default cap on a single encoded source (500 MiB).
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 500 << 20;

/// How a batch reacts to failed jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop scheduling work after the first failure and report only that failure
    FailFast,
    /// Convert everything and report successes and failures side by side
    #[default]
    BestEffort,
}

/// Configuration for a batch conversion run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Reduction and cancellation policy
    pub failure_policy: FailurePolicy,
    /// Worker pool size; `None` uses the available parallelism
    pub max_workers: Option<usize>,
    /// Whether to reject zero-sized or oversized images after decoding
    pub validate_dimensions: bool,
    /// Largest accepted width or height when validating
    pub max_dimension: Option<usize>,
    /// Largest accepted encoded source, in bytes
    pub max_source_bytes: Option<u64>,
    /// Settings handed to the encoder
    pub encoder: EncoderConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            max_workers: None,
            validate_dimensions: true,
            max_dimension: Some(50000),
            max_source_bytes: Some(DEFAULT_MAX_SOURCE_BYTES),
            encoder: EncoderConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }

    pub fn is_fail_fast(&self) -> bool {
        self.failure_policy == FailurePolicy::FailFast
    }
}

/// Builder for BatchConfig
#[derive(Default)]
pub struct BatchConfigBuilder {
    failure_policy: Option<FailurePolicy>,
    max_workers: Option<Option<usize>>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
    max_source_bytes: Option<Option<u64>>,
    encoder: Option<EncoderConfig>,
}

impl BatchConfigBuilder {
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    pub fn fail_fast(self, enable: bool) -> Self {
        self.failure_policy(if enable {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::BestEffort
        })
    }

    /// A zero worker count is treated as one.
    pub fn max_workers(mut self, workers: Option<usize>) -> Self {
        self.max_workers = Some(workers.map(|n| n.max(1)));
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn max_source_bytes(mut self, max: Option<u64>) -> Self {
        self.max_source_bytes = Some(max);
        self
    }

    pub fn encoder(mut self, encoder: EncoderConfig) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn build(self) -> BatchConfig {
        let default = BatchConfig::default();
        BatchConfig {
            failure_policy: self.failure_policy.unwrap_or(default.failure_policy),
            max_workers: self.max_workers.unwrap_or(default.max_workers),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            max_source_bytes: self.max_source_bytes.unwrap_or(default.max_source_bytes),
            encoder: self.encoder.unwrap_or(default.encoder),
        }
    }
}
