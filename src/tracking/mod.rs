pub mod error;
pub mod interceptor;
pub mod percentiles;
pub mod recorder;
pub mod stats;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::{RecorderClosed, StoreError, TrackingError};
pub use interceptor::{Interceptor, Mode};
pub use percentiles::PercentileSet;
pub use recorder::{BackgroundRecorder, Recorder};
pub use stats::{AggregateStat, StatsAggregator};
pub use store::{MemoryStore, RedisStore, SampleStore};

/// One persisted execution-time measurement.
/// Immutable once the store has assigned its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Store-assigned, grows with insertion order
    pub id: u64,
    /// Logical name of the measured operation, e.g. "find_all_students"
    pub operation_name: String,
    /// Wall time spent inside the wrapped operation
    pub duration_millis: u64,
    pub recorded_at: DateTime<Utc>,
}

/// The "write" side: the interceptor builds these and the store turns
/// them into [`Sample`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSample {
    pub operation_name: String,
    pub duration_millis: u64,
    pub recorded_at: DateTime<Utc>,
}

impl NewSample {
    pub fn new(operation_name: impl Into<String>, duration_millis: u64) -> Self {
        Self {
            operation_name: operation_name.into(),
            duration_millis,
            recorded_at: Utc::now(),
        }
    }

    pub(crate) fn into_sample(self, id: u64) -> Sample {
        Sample {
            id,
            operation_name: self.operation_name,
            duration_millis: self.duration_millis,
            recorded_at: self.recorded_at,
        }
    }
}
