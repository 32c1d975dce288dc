//! Batch outcome and its reduction into a caller-facing report

use thiserror::Error;

use crate::image_pipeline::batch::config::FailurePolicy;
use crate::image_pipeline::batch::types::{ConversionResult, ConversionSuccess, JobFailure};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("{0}")]
    FailFast(JobFailure),

    #[error("{} of {total} conversions failed: {}", .failures.len(), join_failures(.failures))]
    Aggregate { failures: Vec<JobFailure>, total: usize },
}

fn join_failures(failures: &[JobFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl BatchError {
    /// Every failure carried by the error, in outcome order.
    pub fn failures(&self) -> &[JobFailure] {
        match self {
            BatchError::FailFast(failure) => std::slice::from_ref(failure),
            BatchError::Aggregate { failures, .. } => failures,
        }
    }
}

/// Exactly one result per submitted job.
///
/// Results are stored in submission order; jobs may have finished in any order.
#[derive(Debug)]
pub struct BatchOutcome {
    results: Vec<ConversionResult>,
    first_failure: Option<usize>,
    policy: FailurePolicy,
}

impl BatchOutcome {
    pub(crate) fn new(results: Vec<ConversionResult>, first_failure: Option<usize>, policy: FailurePolicy) -> Self {
        Self {
            results,
            first_failure,
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn results(&self) -> &[ConversionResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ConversionResult> {
        self.results
    }

    pub fn successes(&self) -> impl Iterator<Item = &ConversionSuccess> {
        self.results.iter().filter_map(ConversionResult::as_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobFailure> {
        self.results.iter().filter_map(ConversionResult::as_failure)
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Index of the earliest observed failure.
    ///
    /// Falls back to the first failure in submission order when every
    /// failure is a cancellation raised by the caller.
    fn first_failure_index(&self) -> Option<usize> {
        self.first_failure
            .or_else(|| self.results.iter().position(|r| !r.is_success()))
    }

    pub fn first_error(&self) -> Option<&JobFailure> {
        self.first_failure_index()
            .and_then(|idx| self.results.get(idx))
            .and_then(ConversionResult::as_failure)
    }

    /// Applies the batch's failure policy.
    ///
    /// Fail-fast keeps only the first failure and drops every success.
    /// Best-effort keeps all successes and folds the failures into one error.
    pub fn reduce(self) -> BatchReport {
        match self.policy {
            FailurePolicy::FailFast => self.reduce_fail_fast(),
            FailurePolicy::BestEffort => self.reduce_best_effort(),
        }
    }

    fn reduce_fail_fast(mut self) -> BatchReport {
        if let Some(idx) = self.first_failure_index() {
            if let ConversionResult::Failure(failure) = self.results.swap_remove(idx) {
                return BatchReport {
                    successes: Vec::new(),
                    error: Some(BatchError::FailFast(failure)),
                };
            }
        }

        BatchReport {
            successes: self.successes_owned(),
            error: None,
        }
    }

    fn reduce_best_effort(self) -> BatchReport {
        let total = self.results.len();
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        for result in self.results {
            match result {
                ConversionResult::Success(s) => successes.push(s),
                ConversionResult::Failure(f) => failures.push(f),
            }
        }

        let error = if failures.is_empty() {
            None
        } else {
            Some(BatchError::Aggregate { failures, total })
        };

        BatchReport { successes, error }
    }

    fn successes_owned(self) -> Vec<ConversionSuccess> {
        self.results
            .into_iter()
            .filter_map(|r| match r {
                ConversionResult::Success(s) => Some(s),
                ConversionResult::Failure(_) => None,
            })
            .collect()
    }
}

/// What the caller acts on after reduction
#[derive(Debug)]
pub struct BatchReport {
    pub successes: Vec<ConversionSuccess>,
    pub error: Option<BatchError>,
}

impl BatchReport {
    pub fn into_result(self) -> Result<Vec<ConversionSuccess>, BatchError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.successes),
        }
    }
}
