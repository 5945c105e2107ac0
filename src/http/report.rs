use std::time::Duration;

use crate::error::HttpError;
use crate::metrics::LatencyHistogram;

use super::plan::StressPlan;

/// Upper bound on outcome slots reserved before any request completes.
const OUTCOME_PREALLOC: usize = 1024;

/// One completed request.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub index: usize,
    pub status: u16,
    pub body: String,
    pub latency: Duration,
}

/// Result of a stress run. Outcomes and failures are ordered by task index.
#[derive(Debug)]
pub struct StressReport {
    pub label: String,
    pub count: usize,
    pub elapsed: Duration,
    pub outcomes: Vec<TaskOutcome>,
    pub failures: Vec<HttpError>,
    latency: LatencyHistogram,
}

impl StressReport {
    pub(super) fn new(plan: &StressPlan) -> Result<Self, HttpError> {
        let latency =
            LatencyHistogram::new().map_err(|message| HttpError::Histogram { message })?;
        Ok(Self {
            label: plan.label(),
            count: plan.count,
            elapsed: Duration::ZERO,
            outcomes: Vec::with_capacity(plan.count.min(OUTCOME_PREALLOC)),
            failures: Vec::new(),
            latency,
        })
    }

    pub(super) fn record_success(&mut self, outcome: TaskOutcome) -> Result<(), HttpError> {
        self.latency
            .record(outcome.latency)
            .map_err(|message| HttpError::Histogram { message })?;
        self.outcomes.push(outcome);
        Ok(())
    }

    pub(super) fn record_failure(&mut self, error: HttpError) {
        self.failures.push(error);
    }

    pub(super) fn finish(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
        self.outcomes.sort_by_key(|outcome| outcome.index);
        self.failures
            .sort_by_key(|error| error.task_index().unwrap_or(usize::MAX));
    }

    /// `<N> requests: <elapsed>`.
    #[must_use]
    pub fn timing_line(&self) -> String {
        format!("{}: {:?}", self.label, self.elapsed)
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.len()
    }

    /// p50, p90, p99 latency in milliseconds.
    #[must_use]
    pub fn latency_percentiles(&self) -> (u64, u64, u64) {
        self.latency.percentiles()
    }

    /// Turn collected failures into a single error.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::TasksFailed`] naming the lowest failed index when
    /// any request failed.
    pub fn into_result(mut self) -> Result<Self, HttpError> {
        let mut failures = std::mem::take(&mut self.failures).into_iter();
        let Some(first) = failures.next() else {
            return Ok(self);
        };
        Err(HttpError::TasksFailed {
            failed: failures.len().saturating_add(1),
            total: self.count,
            first: Box::new(first),
        })
    }
}
