//! Per-provider daily usage and cost accumulation.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use reelgen_core::provider::ProviderId;
use reelgen_core::JobId;

/// Estimated cost per rendered second, in USD.
pub fn rate_per_second(provider: ProviderId) -> f64 {
    match provider {
        ProviderId::Runway => 0.12,
        ProviderId::GeminiVeo => 0.08,
        // Local assembly still burns imagery and encoding budget.
        ProviderId::Slideshow => 0.01,
    }
}

/// Accumulated usage for one (provider, day) bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostRecord {
    pub units: f64,
    pub cost: f64,
    pub request_count: u64,
}

/// What a single `track_usage` call reports back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSummary {
    pub daily_cost: f64,
    pub total_requests: u64,
}

/// Process-wide cost accumulator keyed by (provider, date).
///
/// Buckets only ever grow within a day; there is no cross-day aggregation.
#[derive(Default)]
pub struct CostTracker {
    records: Mutex<HashMap<(ProviderId, NaiveDate), CostRecord>>,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `units` of usage for `provider` against today's bucket.
    ///
    /// Returns the bucket's running daily cost and request count.
    pub async fn track_usage(
        &self,
        provider: ProviderId,
        units: f64,
        job_id: Option<JobId>,
    ) -> UsageSummary {
        let cost = rate_per_second(provider) * units;
        let today = Utc::now().date_naive();

        let mut records = self.records.lock().await;
        let record = records.entry((provider, today)).or_default();
        record.units += units;
        record.cost += cost;
        record.request_count += 1;

        tracing::info!(
            provider = %provider,
            units,
            cost = format!("{cost:.4}"),
            job_id = job_id.map(|id| id.to_string()).unwrap_or_default(),
            "Cost tracked",
        );

        UsageSummary {
            daily_cost: record.cost,
            total_requests: record.request_count,
        }
    }

    /// Snapshot of all provider buckets for `date`.
    pub async fn daily_costs(&self, date: NaiveDate) -> HashMap<ProviderId, CostRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|((_, day), _)| *day == date)
            .map(|((provider, _), record)| (*provider, *record))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accumulates_within_a_day() {
        let tracker = CostTracker::new();

        let first = tracker.track_usage(ProviderId::Runway, 10.0, None).await;
        assert!((first.daily_cost - 1.2).abs() < 1e-9);
        assert_eq!(first.total_requests, 1);

        let second = tracker.track_usage(ProviderId::Runway, 5.0, None).await;
        assert!((second.daily_cost - 1.8).abs() < 1e-9);
        assert_eq!(second.total_requests, 2);
    }

    #[tokio::test]
    async fn providers_bucket_separately() {
        let tracker = CostTracker::new();
        tracker.track_usage(ProviderId::Runway, 10.0, None).await;
        tracker.track_usage(ProviderId::Slideshow, 10.0, None).await;

        let today = Utc::now().date_naive();
        let snapshot = tracker.daily_costs(today).await;
        assert_eq!(snapshot.len(), 2);
        assert!((snapshot[&ProviderId::Runway].cost - 1.2).abs() < 1e-9);
        assert!((snapshot[&ProviderId::Slideshow].cost - 0.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn other_dates_are_empty() {
        let tracker = CostTracker::new();
        tracker.track_usage(ProviderId::Runway, 1.0, None).await;

        let another_day = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert!(tracker.daily_costs(another_day).await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_same_day_writes_all_land() {
        let tracker = std::sync::Arc::new(CostTracker::new());
        let mut handles = Vec::new();
        for _ in 0..20 {
            let tracker = std::sync::Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                tracker.track_usage(ProviderId::GeminiVeo, 1.0, None).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let today = Utc::now().date_naive();
        let snapshot = tracker.daily_costs(today).await;
        assert_eq!(snapshot[&ProviderId::GeminiVeo].request_count, 20);
    }
}
