use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::error::{RecorderClosed, StoreError, TrackingError};
use super::store::SampleStore;
use super::{NewSample, Sample};

/// Persists samples through a [`SampleStore`].
///
/// One submission is one write: no retry, no buffering.
#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn SampleStore>,
}

impl Recorder {
    pub fn new(store: Arc<dyn SampleStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, sample: NewSample) -> Result<Sample, StoreError> {
        let stored = self.store.append(sample).await?;
        debug!(
            id = stored.id,
            operation = %stored.operation_name,
            duration_millis = stored.duration_millis,
            "execution time sample saved"
        );
        Ok(stored)
    }

    /// Same write as [`record`](Self::record), but on its own task.
    ///
    /// Dropping the returned future does not cancel the write.
    pub async fn record_detached(&self, sample: NewSample) -> Result<Sample, TrackingError> {
        let operation = sample.operation_name.clone();
        let recorder = self.clone();
        let stored = tokio::spawn(async move { recorder.record(sample).await })
            .await
            .map_err(|join_err| TrackingError::instrumentation(operation, join_err))??;
        Ok(stored)
    }
}

// ─── Background writer for deferred mode ─────────────────────────

enum Command {
    Record(NewSample),
    Flush(oneshot::Sender<()>),
}

/// Handle to a single writer task fed by an unbounded FIFO queue.
///
/// `submit` never waits on the store. Every accepted sample is handed to the
/// [`Recorder`] exactly once; the task drains the queue before exiting, which
/// happens once every handle has been dropped.
#[derive(Clone)]
pub struct BackgroundRecorder {
    tx: mpsc::UnboundedSender<Command>,
}

impl BackgroundRecorder {
    pub fn spawn(recorder: Recorder) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(recorder, rx));
        (Self { tx }, handle)
    }

    pub fn submit(&self, sample: NewSample) -> Result<(), RecorderClosed> {
        self.tx.send(Command::Record(sample)).map_err(|_| RecorderClosed)
    }

    /// Resolves after every sample submitted before this call has been
    /// written (or has failed and been logged).
    pub async fn flush(&self) -> Result<(), RecorderClosed> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .map_err(|_| RecorderClosed)?;
        ack_rx.await.map_err(|_| RecorderClosed)
    }
}

async fn run(recorder: Recorder, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Record(sample) => {
                let operation = sample.operation_name.clone();
                if let Err(e) = recorder.record(sample).await {
                    error!(%operation, error = %e, "failed to save deferred execution time sample");
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("background recorder stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::store::{FailingStore, MemoryStore};

    fn memory_recorder() -> (Arc<MemoryStore>, Recorder) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Recorder::new(store))
    }

    #[tokio::test]
    async fn record_returns_stored_sample() {
        let (store, recorder) = memory_recorder();
        let saved = recorder.record(NewSample::new("op", 12)).await.unwrap();

        assert_eq!(saved.id, 1);
        assert_eq!(saved.operation_name, "op");
        assert_eq!(saved.duration_millis, 12);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn detached_write_survives_dropped_caller() {
        let (store, recorder) = memory_recorder();
        let fut = recorder.record_detached(NewSample::new("op", 1));
        // Poll once so the write task gets spawned, then abandon the caller.
        tokio::select! {
            biased;
            _ = fut => {}
            _ = std::future::ready(()) => {}
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn flush_waits_for_queued_samples() {
        let (store, recorder) = memory_recorder();
        let (background, _handle) = BackgroundRecorder::spawn(recorder);

        for i in 0..25 {
            background.submit(NewSample::new("queued", i)).unwrap();
        }
        background.flush().await.unwrap();

        assert_eq!(store.len(), 25);
    }

    #[tokio::test]
    async fn writer_drains_queue_when_handles_drop() {
        let (store, recorder) = memory_recorder();
        let (background, handle) = BackgroundRecorder::spawn(recorder);

        background.submit(NewSample::new("last", 3)).unwrap();
        drop(background);
        handle.await.unwrap();

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn submit_after_writer_exit_is_closed() {
        let (_store, recorder) = memory_recorder();
        let (background, handle) = BackgroundRecorder::spawn(recorder);
        handle.abort();
        let _ = handle.await;

        assert!(background.submit(NewSample::new("late", 1)).is_err());
        assert!(background.flush().await.is_err());
    }

    #[tokio::test]
    async fn writer_survives_failed_write() {
        let store = Arc::new(FailingStore::new(1));
        let (background, _handle) = BackgroundRecorder::spawn(Recorder::new(store.clone()));

        background.submit(NewSample::new("lost", 1)).unwrap();
        background.flush().await.unwrap();
        assert_eq!(store.len(), 0);

        background.submit(NewSample::new("kept", 2)).unwrap();
        background.flush().await.unwrap();
        let samples = store.samples().await.unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].operation_name, "kept");
    }

    #[tokio::test]
    async fn detached_write_reports_store_failure() {
        let recorder = Recorder::new(Arc::new(FailingStore::always()));
        let err = recorder
            .record_detached(NewSample::new("op", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::Store(StoreError::Redis(_))));
    }
}
