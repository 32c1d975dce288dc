use std::sync::OnceLock;

use rayon::prelude::*;
use tracing::{Span, debug, info, info_span, instrument, warn};

use crate::image_pipeline::{
    batch::{
        cancel::CancellationFlag,
        config::{BatchConfig, FailurePolicy},
        outcome::BatchOutcome,
        timing::{PipelineTimings, Timer},
        types::{ConversionJob, ConversionResult, ConversionSuccess, JobFailure},
    },
    common::error::{ConversionError, Result},
    encode::{ImageWriter, StandardImageWriter, TargetFormat},
    heif::{DefaultImageReader, ImageReader},
};

/// Converts batches of independent jobs on a fixed-size worker pool.
///
/// Every submitted job produces exactly one result. Under
/// [`FailurePolicy::FailFast`] the first failure raises a cancellation flag
/// that pending jobs observe between stages.
pub struct BatchConverter<R: ImageReader, W: ImageWriter> {
    reader: R,
    writer: W,
    config: BatchConfig,
    pool: rayon::ThreadPool,
}

impl BatchConverter<DefaultImageReader, StandardImageWriter> {
    pub fn new(config: BatchConfig) -> Result<Self> {
        Self::with_custom(DefaultImageReader::default(), StandardImageWriter, config)
    }
}

impl<R: ImageReader, W: ImageWriter> BatchConverter<R, W> {
    pub fn with_custom(reader: R, writer: W, config: BatchConfig) -> Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("heic-batch-{}", i));
        if let Some(workers) = config.max_workers {
            builder = builder.num_threads(workers.max(1));
        }
        let pool = builder
            .build()
            .map_err(|e| ConversionError::WorkerPool(e.to_string()))?;

        Ok(Self {
            reader,
            writer,
            config,
            pool,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Converts every job and blocks until all of them have finished.
    pub fn convert_batch(&self, jobs: Vec<ConversionJob>) -> BatchOutcome {
        self.convert_batch_with_cancel(jobs, &CancellationFlag::new())
    }

    /// Like [`convert_batch`](Self::convert_batch), with a flag the caller can
    /// raise to stop pending jobs.
    #[instrument(skip(self, jobs, cancel), fields(jobs = jobs.len()))]
    pub fn convert_batch_with_cancel(&self, jobs: Vec<ConversionJob>, cancel: &CancellationFlag) -> BatchOutcome {
        info!(
            workers = self.workers(),
            policy = ?self.config.failure_policy,
            "Starting batch conversion"
        );

        let first_failure = OnceLock::new();
        let parent = Span::current();

        let results: Vec<ConversionResult> = self.pool.install(|| {
            jobs.into_par_iter()
                .enumerate()
                .map(|(index, job)| self.run_job(index, job, cancel, &first_failure, &parent))
                .collect()
        });

        let outcome = BatchOutcome::new(results, first_failure.into_inner(), self.config.failure_policy);

        info!(
            succeeded = outcome.success_count(),
            failed = outcome.failure_count(),
            "Batch conversion complete"
        );
        outcome
    }

    fn run_job(
        &self,
        index: usize,
        job: ConversionJob,
        cancel: &CancellationFlag,
        first_failure: &OnceLock<usize>,
        parent: &Span,
    ) -> ConversionResult {
        let span = info_span!(parent: parent, "job", source_id = %job.source_id, format = %job.target_format);
        let _entered = span.enter();

        let source_id = job.source_id.clone();
        match self.convert_job(job, cancel) {
            Ok(success) => {
                debug!(
                    width = success.width,
                    height = success.height,
                    timings = %success.timings.summary(),
                    "Job converted"
                );
                ConversionResult::Success(success)
            }
            Err(error) => {
                if error.is_cancelled() {
                    debug!("Job cancelled");
                } else {
                    warn!(error = %error, "Job failed");
                    // OnceLock::set succeeds for exactly one failing job
                    if first_failure.set(index).is_ok() && self.config.failure_policy == FailurePolicy::FailFast {
                        info!("Cancelling remaining jobs after first failure");
                        cancel.cancel();
                    }
                }
                ConversionResult::Failure(JobFailure { source_id, error })
            }
        }
    }

    fn convert_job(&self, job: ConversionJob, cancel: &CancellationFlag) -> Result<ConversionSuccess> {
        let ConversionJob {
            source_id,
            source,
            target_format,
            output,
        } = job;
        let mut timings = PipelineTimings::new();

        // Format is checked before the source so a bad request always reports as such
        let format = self.resolve_format(&target_format)?;
        cancel.check()?;

        let timer = Timer::start("read_source");
        let input = source.into_bytes(self.config.max_source_bytes)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);
        cancel.check()?;

        let raster = {
            let _span = info_span!("decode", input_size = input.len()).entered();
            let timer = Timer::start("decode");
            let raster = self.reader.read_image(&input)?;
            let (name, duration) = timer.stop();
            timings.add_step(name, duration);
            raster
        };
        drop(input);

        self.validate_dimensions(raster.width, raster.height)?;

        let timer = Timer::start("normalize");
        let raster = raster.into_rgb8();
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);
        cancel.check()?;

        let encoded = {
            let _span = info_span!("encode", width = raster.width, height = raster.height).entered();
            let timer = Timer::start("encode");
            let mut encoded = Vec::new();
            self.writer
                .write_image(&raster, format, &mut encoded, &self.config.encoder)?;
            let (name, duration) = timer.stop();
            timings.add_step(name, duration);
            encoded
        };
        cancel.check()?;

        let timer = Timer::start("write_output");
        let output = output.store(encoded)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        Ok(ConversionSuccess {
            source_id,
            format,
            width: raster.width,
            height: raster.height,
            output,
            timings,
        })
    }

    fn resolve_format(&self, requested: &str) -> Result<TargetFormat> {
        let format: TargetFormat = requested.parse()?;
        if !self.writer.supports(format) {
            return Err(ConversionError::UnsupportedFormat(requested.to_string()));
        }
        Ok(format)
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(ConversionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }
}
