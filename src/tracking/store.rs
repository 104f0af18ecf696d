use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::{NewSample, Sample};

/// Append-only sample storage shared by the recorder (writes) and the
/// stats aggregator (reads).
///
/// A write that has returned `Ok` must be visible to every later read.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Persist one sample and hand back its stored form with the assigned id.
    async fn append(&self, sample: NewSample) -> Result<Sample, StoreError>;

    /// Up to `limit` samples in insertion order, skipping the first `offset`.
    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<Sample>, StoreError>;

    /// Every stored sample in insertion order.
    async fn samples(&self) -> Result<Vec<Sample>, StoreError>;
}

// ─── In-memory backend ───────────────────────────────────────────

/// Process-local store. Ids are assigned under the write lock, so they
/// always match insertion order.
#[derive(Default)]
pub struct MemoryStore {
    samples: RwLock<Vec<Sample>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn append(&self, sample: NewSample) -> Result<Sample, StoreError> {
        let mut samples = self.samples.write();
        let stored = sample.into_sample(samples.len() as u64 + 1);
        samples.push(stored.clone());
        Ok(stored)
    }

    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<Sample>, StoreError> {
        let samples = self.samples.read();
        Ok(samples.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn samples(&self) -> Result<Vec<Sample>, StoreError> {
        Ok(self.samples.read().clone())
    }
}

// ─── Redis backend ───────────────────────────────────────────────

/// Samples live in one Redis list, `{prefix}:samples`, as RPUSH-ed JSON.
///
/// An entry does not carry its id. The id is the entry's 1-based position:
/// `RPUSH` replies with the new list length, which is the id of the entry it
/// just appended. Id assignment and the append are therefore one atomic
/// command, so ids always match list order and never leave gaps.
///
/// `ConnectionManager` is cheaply cloneable and reconnects on its own.
pub struct RedisStore {
    conn: ConnectionManager,
    list_key: String,
}

/// List entry form of a sample: everything but the positional id.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    operation_name: String,
    duration_millis: u64,
    recorded_at: DateTime<Utc>,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, key_prefix: &str) -> Self {
        Self {
            conn,
            list_key: format!("{key_prefix}:samples"),
        }
    }

    /// Open a managed connection to `url` and wrap it.
    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, key_prefix))
    }
}

fn encode(sample: &NewSample) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&Entry {
        operation_name: sample.operation_name.clone(),
        duration_millis: sample.duration_millis,
        recorded_at: sample.recorded_at,
    })?)
}

/// Decode entries read starting at list index `offset`.
fn decode(offset: usize, raw: Vec<String>) -> Result<Vec<Sample>, StoreError> {
    raw.iter()
        .enumerate()
        .map(|(i, json)| -> Result<Sample, StoreError> {
            let entry: Entry = serde_json::from_str(json)?;
            Ok(Sample {
                id: (offset + i) as u64 + 1,
                operation_name: entry.operation_name,
                duration_millis: entry.duration_millis,
                recorded_at: entry.recorded_at,
            })
        })
        .collect()
}

#[async_trait]
impl SampleStore for RedisStore {
    async fn append(&self, sample: NewSample) -> Result<Sample, StoreError> {
        let json = encode(&sample)?;
        let mut conn = self.conn.clone();
        let id: u64 = conn.rpush(&self.list_key, json).await?;
        Ok(sample.into_sample(id))
    }

    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<Sample>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let start = offset as isize;
        let stop = (offset + limit - 1) as isize;
        let raw: Vec<String> = conn.lrange(&self.list_key, start, stop).await?;
        decode(offset, raw)
    }

    async fn samples(&self) -> Result<Vec<Sample>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(&self.list_key, 0, -1).await?;
        decode(0, raw)
    }
}

// ─── Test double ─────────────────────────────────────────────────

/// Memory store whose first `failures` appends fail as if Redis were down.
#[cfg(test)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    failures: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl FailingStore {
    pub(crate) fn new(failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: std::sync::atomic::AtomicUsize::new(failures),
        }
    }

    pub(crate) fn always() -> Self {
        Self::new(usize::MAX)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
#[async_trait]
impl SampleStore for FailingStore {
    async fn append(&self, sample: NewSample) -> Result<Sample, StoreError> {
        use std::sync::atomic::Ordering;

        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            let refused = redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"));
            return Err(refused.into());
        }
        self.inner.append(sample).await
    }

    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<Sample>, StoreError> {
        self.inner.page(offset, limit).await
    }

    async fn samples(&self) -> Result<Vec<Sample>, StoreError> {
        self.inner.samples().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_assigns_ids_in_insertion_order() {
        let store = MemoryStore::new();
        let a = store.append(NewSample::new("a", 5)).await.unwrap();
        let b = store.append(NewSample::new("b", 7)).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.samples().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn memory_store_page_past_end_is_empty() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store.append(NewSample::new("op", i)).await.unwrap();
        }

        let page = store.page(2, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 3);
        assert!(store.page(10, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn memory_store_concurrent_appends_lose_nothing() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..50u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(NewSample::new(format!("op_{i}"), i)).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let mut ids: Vec<u64> = store.samples().await.unwrap().iter().map(|s| s.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn redis_entries_take_their_id_from_list_position() {
        let raw = vec![
            encode(&NewSample::new("a", 5)).unwrap(),
            encode(&NewSample::new("b", 7)).unwrap(),
        ];
        assert!(!raw[0].contains("\"id\""));

        let samples = decode(10, raw).unwrap();
        assert_eq!(samples[0].id, 11);
        assert_eq!(samples[0].operation_name, "a");
        assert_eq!(samples[1].id, 12);
        assert_eq!(samples[1].duration_millis, 7);
    }

    #[test]
    fn corrupt_redis_entry_is_serialization_error() {
        let err = decode(0, vec!["not json".into()]).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn failing_store_recovers_after_its_failures() {
        let store = FailingStore::new(1);
        assert!(matches!(
            store.append(NewSample::new("a", 1)).await,
            Err(StoreError::Redis(_))
        ));
        let saved = store.append(NewSample::new("b", 2)).await.unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(store.len(), 1);
    }
}
