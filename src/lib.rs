//! Academic catalog service with method execution time tracking.
//!
//! Business operations are wrapped by [`tracking::Interceptor`], which times
//! each call and records a [`tracking::Sample`]; [`tracking::StatsAggregator`]
//! turns the stored samples into per-operation statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

pub mod catalog;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod tracking;

use catalog::{AcademicService, Catalog};
use tracking::{BackgroundRecorder, Interceptor, Recorder, SampleStore, StatsAggregator};

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Catalog operations, the tracked ones routed through the interceptor.
    pub academics: AcademicService,

    /// Read side of the sample store.
    pub stats: StatsAggregator,

    /// Queue behind deferred-mode tracking; flushed on shutdown.
    pub background: BackgroundRecorder,

    /// Period of the SSE stats snapshots.
    pub stats_stream_interval: Duration,
}

impl AppState {
    /// Wire the recorder, interceptor and aggregator around one sample store.
    ///
    /// Must run inside a Tokio runtime: it spawns the background writer and
    /// returns its handle.
    pub fn new(
        store: Arc<dyn SampleStore>,
        catalog: Arc<Catalog>,
        stats_stream_interval: Duration,
    ) -> (Self, JoinHandle<()>) {
        let recorder = Recorder::new(store.clone());
        let (background, writer) = BackgroundRecorder::spawn(recorder.clone());
        let interceptor = Interceptor::new(recorder, background.clone());

        let state = Self {
            academics: AcademicService::new(catalog, interceptor),
            stats: StatsAggregator::new(store),
            background,
            stats_stream_interval,
        };
        (state, writer)
    }
}
