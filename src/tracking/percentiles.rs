use hdrhistogram::Histogram;
use serde::Serialize;
use tracing::warn;

/// 3 significant figures, auto-resizing so long calls never get dropped.
const HIST_SIGFIG: u8 = 3;

/// Latency distribution for one operation name, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileSet {
    pub min: u64,
    pub max: u64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
}

impl PercentileSet {
    /// Build the percentile breakdown for a batch of durations.
    pub fn from_durations(durations: impl IntoIterator<Item = u64>) -> Self {
        let mut hist = match Histogram::<u64>::new(HIST_SIGFIG) {
            Ok(hist) => hist,
            Err(_) => return Self::empty(),
        };
        for millis in durations {
            if let Err(e) = hist.record(millis) {
                warn!(millis, error = ?e, "duration left out of percentile histogram");
            }
        }
        Self::from_histogram(&hist)
    }

    /// Zeroed values if the histogram is empty.
    pub fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.len() == 0 {
            return Self::empty();
        }

        Self {
            min: hist.min(),
            max: hist.max(),
            p50: hist.value_at_quantile(0.50),
            p95: hist.value_at_quantile(0.95),
            p99: hist.value_at_quantile(0.99),
        }
    }

    pub fn empty() -> Self {
        Self {
            min: 0,
            max: 0,
            p50: 0,
            p95: 0,
            p99: 0,
        }
    }
}
