//! Timing decorator for business operations.
//!
//! Callers opt in explicitly at the call site:
//!
//! ```ignore
//! let students = interceptor
//!     .sync("find_all_students", move || async move { Ok::<_, CatalogError>(catalog.students()) })
//!     .await?;
//! ```
//!
//! The wrapped value comes back untouched. A failing operation comes back as
//! [`TrackingError::Instrumentation`] with the original error as its source.
//! Both outcomes produce exactly one sample.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::error::{BoxError, TrackingError};
use super::recorder::{BackgroundRecorder, Recorder};
use super::NewSample;

/// Where the sample write happens relative to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The caller waits for the store write before getting its result.
    Sync,
    /// The sample is queued on the background writer; the caller only pays
    /// for the operation itself.
    Deferred,
}

#[derive(Clone)]
pub struct Interceptor {
    recorder: Recorder,
    background: BackgroundRecorder,
}

impl Interceptor {
    pub fn new(recorder: Recorder, background: BackgroundRecorder) -> Self {
        Self {
            recorder,
            background,
        }
    }

    pub fn background(&self) -> &BackgroundRecorder {
        &self.background
    }

    pub async fn sync<T, E, F, Fut>(&self, operation: &str, op: F) -> Result<T, TrackingError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
        T: fmt::Debug,
    {
        self.intercept(Mode::Sync, operation, op).await
    }

    pub async fn deferred<T, E, F, Fut>(&self, operation: &str, op: F) -> Result<T, TrackingError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
        T: fmt::Debug,
    {
        self.intercept(Mode::Deferred, operation, op).await
    }

    /// Run `op` once, time it on the monotonic clock, submit a sample and
    /// hand back the outcome.
    pub async fn intercept<T, E, F, Fut>(
        &self,
        mode: Mode,
        operation: &str,
        op: F,
    ) -> Result<T, TrackingError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
        T: fmt::Debug,
    {
        debug!(operation, ?mode, "method execution started");

        let start = Instant::now();
        let outcome = op().await;
        let duration_millis = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let submitted = self
            .submit(mode, NewSample::new(operation, duration_millis))
            .await;

        match outcome {
            Ok(value) => {
                info!(
                    operation,
                    duration_millis,
                    result = ?value,
                    "method executed"
                );
                submitted?;
                Ok(value)
            }
            Err(cause) => {
                let cause = cause.into();
                error!(operation, duration_millis, error = %cause, "method execution failed");
                if let Err(e) = submitted {
                    warn!(operation, error = %e, "sample for failed call was not recorded");
                }
                Err(TrackingError::Instrumentation {
                    operation: operation.to_owned(),
                    source: cause,
                })
            }
        }
    }

    async fn submit(&self, mode: Mode, sample: NewSample) -> Result<(), TrackingError> {
        match mode {
            Mode::Sync => self.recorder.record_detached(sample).await.map(|_| ()),
            Mode::Deferred => {
                let operation = sample.operation_name.clone();
                self.background
                    .submit(sample)
                    .map_err(|closed| TrackingError::instrumentation(operation, closed))
            }
        }
    }
}
