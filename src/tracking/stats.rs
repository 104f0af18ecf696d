use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::error::StoreError;
use super::percentiles::PercentileSet;
use super::store::SampleStore;
use super::Sample;

/// Largest page `list_page` will hand out; anything outside `(0, MAX]` is
/// bumped to it.
pub const MAX_PAGE_SIZE: usize = 50;

/// Per-operation summary, recomputed from the store on every query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStat {
    pub operation_name: String,
    pub count: u64,
    /// `total_duration / count`, milliseconds
    pub average_duration: f64,
    /// Sum of all durations, milliseconds
    pub total_duration: u64,
    pub latency: PercentileSet,
}

/// Read side of the sample store. Holds no aggregation state of its own.
#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn SampleStore>,
}

/// Running totals for one operation name while grouping.
#[derive(Default)]
struct Group {
    total: u64,
    durations: Vec<u64>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn SampleStore>) -> Self {
        Self { store }
    }

    /// Page `page_number` (1-indexed) of stored samples in insertion order.
    pub async fn list_page(
        &self,
        page_number: NonZeroU32,
        page_size: i64,
    ) -> Result<Vec<Sample>, StoreError> {
        let limit = effective_page_size(page_size);
        let offset = (page_number.get() as usize - 1).saturating_mul(limit);
        let page = self.store.page(offset, limit).await?;
        debug!(page_number = page_number.get(), limit, found = page.len(), "execution time samples page loaded");
        Ok(page)
    }

    /// Group every sample by operation name and summarise each group.
    ///
    /// An empty `names` slice means every operation. The result is sorted by
    /// ascending average; equal averages fall back to the operation name.
    pub async fn compute_stats(&self, names: &[String]) -> Result<Vec<AggregateStat>, StoreError> {
        let samples = self.store.samples().await?;

        // BTreeMap keeps group order independent of insertion order
        let mut groups: BTreeMap<String, Group> = BTreeMap::new();
        for sample in samples {
            if !names.is_empty() && !names.contains(&sample.operation_name) {
                continue;
            }
            let group = groups.entry(sample.operation_name).or_default();
            group.total = group.total.saturating_add(sample.duration_millis);
            group.durations.push(sample.duration_millis);
        }

        let mut stats: Vec<AggregateStat> = groups
            .into_iter()
            .map(|(operation_name, group)| {
                let count = group.durations.len() as u64;
                AggregateStat {
                    operation_name,
                    count,
                    average_duration: group.total as f64 / count as f64,
                    total_duration: group.total,
                    latency: PercentileSet::from_durations(group.durations),
                }
            })
            .collect();

        stats.sort_by(|a, b| {
            a.average_duration
                .total_cmp(&b.average_duration)
                .then_with(|| a.operation_name.cmp(&b.operation_name))
        });

        debug!(groups = stats.len(), filtered = !names.is_empty(), "execution time stats computed");
        Ok(stats)
    }
}

/// Clamp a requested page size into `(0, MAX_PAGE_SIZE]`.
pub fn effective_page_size(requested: i64) -> usize {
    if requested <= 0 || requested > MAX_PAGE_SIZE as i64 {
        MAX_PAGE_SIZE
    } else {
        requested as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::store::MemoryStore;
    use crate::tracking::NewSample;

    async fn aggregator_with(samples: &[(&str, u64)]) -> StatsAggregator {
        let store = Arc::new(MemoryStore::new());
        for (name, millis) in samples {
            store.append(NewSample::new(*name, *millis)).await.unwrap();
        }
        StatsAggregator::new(store)
    }

    fn page(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn page_size_clamps_to_fifty() {
        assert_eq!(effective_page_size(0), 50);
        assert_eq!(effective_page_size(-3), 50);
        assert_eq!(effective_page_size(1000), 50);
        assert_eq!(effective_page_size(50), 50);
        assert_eq!(effective_page_size(10), 10);
    }

    #[tokio::test]
    async fn total_and_average_match_recorded_durations() {
        let agg = aggregator_with(&[("op", 10), ("op", 20), ("op", 33)]).await;

        let stats = agg.compute_stats(&[]).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].total_duration, 63);
        assert!((stats[0].average_duration - 21.0).abs() < f64::EPSILON);
        assert_eq!(stats[0].latency.min, 10);
        assert_eq!(stats[0].latency.max, 33);
    }

    #[tokio::test]
    async fn sorted_by_average_then_name() {
        let agg = aggregator_with(&[
            ("zeta", 5),
            ("slow", 100),
            ("alpha", 5),
            ("mid", 40),
            ("mid", 60),
        ])
        .await;

        let stats = agg.compute_stats(&[]).await.unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.operation_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta", "mid", "slow"]);

        let again = agg.compute_stats(&[]).await.unwrap();
        assert_eq!(stats, again);
    }

    #[tokio::test]
    async fn filter_keeps_only_requested_names() {
        let agg = aggregator_with(&[("opA", 1), ("opB", 2), ("opA", 3)]).await;

        let stats = agg.compute_stats(&["opA".to_string()]).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].operation_name, "opA");
        assert_eq!(stats[0].total_duration, 4);
    }

    #[tokio::test]
    async fn filter_on_unknown_name_is_empty() {
        let agg = aggregator_with(&[("opA", 1)]).await;
        assert!(agg.compute_stats(&["nope".to_string()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_grow_with_new_samples() {
        let store = Arc::new(MemoryStore::new());
        let agg = StatsAggregator::new(store.clone());
        store.append(NewSample::new("op", 4)).await.unwrap();
        let before = agg.compute_stats(&[]).await.unwrap();

        store.append(NewSample::new("op", 8)).await.unwrap();
        let after = agg.compute_stats(&[]).await.unwrap();

        assert_eq!(before[0].total_duration, 4);
        assert_eq!(after[0].total_duration, 12);
        assert_eq!(after[0].count, 2);
    }

    #[tokio::test]
    async fn pages_walk_insertion_order() {
        let samples: Vec<(&str, u64)> = (0..25).map(|i| ("op", i)).collect();
        let agg = aggregator_with(&samples).await;

        let first = agg.list_page(page(1), 10).await.unwrap();
        let third = agg.list_page(page(3), 10).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].id, 1);
        assert_eq!(third.len(), 5);
        assert_eq!(third[0].id, 21);
        assert!(agg.list_page(page(9), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_page_size_behaves_as_fifty() {
        let samples: Vec<(&str, u64)> = (0..120).map(|i| ("op", i)).collect();
        let agg = aggregator_with(&samples).await;

        assert_eq!(agg.list_page(page(1), 0).await.unwrap().len(), 50);
        assert_eq!(agg.list_page(page(1), 1000).await.unwrap().len(), 50);
        let second = agg.list_page(page(2), 1000).await.unwrap();
        assert_eq!(second[0].id, 51);
    }
}
