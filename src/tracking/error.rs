use std::error::Error as StdError;

use thiserror::Error;

/// Boxed cause carried by an instrumentation failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The sample store could not complete a read or write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("sample serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown sample store backend `{0}` (expected `memory` or `redis`)")]
    InvalidBackend(String),
}

/// The background writer task is gone, so a deferred sample had nowhere to go.
#[derive(Debug, Clone, Copy, Error)]
#[error("background recorder has shut down")]
pub struct RecorderClosed;

#[derive(Debug, Error)]
pub enum TrackingError {
    /// The wrapped operation failed, or the interception machinery did.
    /// `source` is always the original cause.
    #[error("instrumented operation `{operation}` failed: {source}")]
    Instrumentation {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TrackingError {
    pub fn instrumentation(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Instrumentation {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// The original error behind an instrumentation failure.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Instrumentation { source, .. } => Some(source.as_ref()),
            Self::Store(_) => None,
        }
    }

    /// Downcast the original cause, e.g. to recover a domain not-found error.
    pub fn cause_as<E: StdError + 'static>(&self) -> Option<&E> {
        self.cause().and_then(|cause| cause.downcast_ref::<E>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("illegal state: {0}")]
    struct IllegalState(&'static str);

    #[test]
    fn instrumentation_keeps_cause_for_downcast() {
        let err = TrackingError::instrumentation("op", IllegalState("x"));
        assert_eq!(err.cause_as::<IllegalState>().map(|e| e.0), Some("x"));
        assert!(err.to_string().contains("`op`"));
    }

    #[test]
    fn store_error_has_no_cause() {
        let err = TrackingError::from(StoreError::InvalidBackend("sqlite".into()));
        assert!(err.cause().is_none());
    }
}
