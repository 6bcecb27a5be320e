use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

const WINDOW_SECONDS: i64 = 24 * 60 * 60;

/// Per-minute traffic bucket for the admin monitor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinuteBucket {
    pub requests: u64,
    pub total_latency_ms: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Hourly aggregation returned by the read path.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HourlyPoint {
    pub hour: DateTime<Utc>,
    pub requests: u64,
    pub avg_latency_ms: f64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// In-memory sliding-window request metrics. Injected into the router and
/// shared by every request handler; the map is keyed by minute-aligned unix
/// timestamp and pruned to a trailing 24-hour window on every write.
#[derive(Debug, Clone, Default)]
pub struct MetricsRegistry {
    buckets: Arc<Mutex<BTreeMap<i64, MinuteBucket>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed request into the bucket for `completed_at`.
    pub fn record(
        &self,
        completed_at: DateTime<Utc>,
        latency_ms: u64,
        bytes_in: u64,
        bytes_out: u64,
    ) {
        let ts = completed_at.timestamp();
        let minute = ts - ts.rem_euclid(60);
        let cutoff = ts - WINDOW_SECONDS;

        let mut buckets = self.buckets.lock().unwrap();

        let bucket = buckets.entry(minute).or_default();
        bucket.requests += 1;
        bucket.total_latency_ms += latency_ms;
        bucket.bytes_in += bytes_in;
        bucket.bytes_out += bytes_out;

        // Monotonic prune: the map is ordered, so only leading keys can fall
        // outside the window.
        while let Some((&oldest, _)) = buckets.first_key_value() {
            if oldest >= cutoff {
                break;
            }
            buckets.remove(&oldest);
        }
    }

    /// Re-aggregate the minute buckets into hourly chart points. Buckets
    /// older than the window are skipped even if not yet pruned.
    pub fn hourly_points(&self, now: DateTime<Utc>) -> Vec<HourlyPoint> {
        let cutoff = now.timestamp() - WINDOW_SECONDS;
        let buckets = self.buckets.lock().unwrap();

        let mut hours: BTreeMap<i64, MinuteBucket> = BTreeMap::new();
        for (&minute, bucket) in buckets.iter() {
            if minute < cutoff {
                continue;
            }
            let hour = minute - minute.rem_euclid(3600);
            let agg = hours.entry(hour).or_default();
            agg.requests += bucket.requests;
            agg.total_latency_ms += bucket.total_latency_ms;
            agg.bytes_in += bucket.bytes_in;
            agg.bytes_out += bucket.bytes_out;
        }

        hours
            .into_iter()
            .filter_map(|(hour, agg)| {
                let hour = DateTime::from_timestamp(hour, 0)?;
                let avg_latency_ms = if agg.requests > 0 {
                    agg.total_latency_ms as f64 / agg.requests as f64
                } else {
                    0.0
                };
                Some(HourlyPoint {
                    hour,
                    requests: agg.requests,
                    avg_latency_ms,
                    bytes_in: agg.bytes_in,
                    bytes_out: agg.bytes_out,
                })
            })
            .collect()
    }

    /// Total requests currently inside the window.
    pub fn total_requests(&self) -> u64 {
        let buckets = self.buckets.lock().unwrap();
        buckets.values().map(|b| b.requests).sum()
    }

    /// Drop all recorded buckets.
    pub fn reset(&self) {
        self.buckets.lock().unwrap().clear();
    }
}

/// Middleware recording every completed request into the registry.
pub async fn track_request_metrics(
    State(metrics): State<MetricsRegistry>,
    request: Request,
    next: Next,
) -> Response {
    let bytes_in = content_length(request.headers());
    let started = Instant::now();

    let response = next.run(request).await;

    let latency_ms = started.elapsed().as_millis() as u64;
    let bytes_out = content_length(response.headers());
    metrics.record(Utc::now(), latency_ms, bytes_in, bytes_out);

    response
}

fn content_length(headers: &axum::http::HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_requests_bucketed_by_minute() {
        let metrics = MetricsRegistry::new();
        let now = Utc::now();

        metrics.record(now, 10, 100, 200);
        metrics.record(now, 30, 100, 200);

        let points = metrics.hourly_points(now);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].requests, 2);
        assert_eq!(points[0].avg_latency_ms, 20.0);
        assert_eq!(points[0].bytes_in, 200);
        assert_eq!(points[0].bytes_out, 400);
    }

    #[test]
    fn test_old_entries_never_returned() {
        let metrics = MetricsRegistry::new();
        let now = Utc::now();

        metrics.record(now - Duration::hours(25), 10, 1, 1);
        metrics.record(now - Duration::hours(2), 10, 1, 1);
        metrics.record(now, 10, 1, 1);

        let points = metrics.hourly_points(now);
        let total: u64 = points.iter().map(|p| p.requests).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_write_prunes_expired_buckets() {
        let metrics = MetricsRegistry::new();
        let start = Utc::now();

        metrics.record(start, 5, 1, 1);
        // A write 25 hours later evicts the first bucket entirely.
        metrics.record(start + Duration::hours(25), 5, 1, 1);

        assert_eq!(metrics.total_requests(), 1);
    }

    #[test]
    fn test_hourly_aggregation_groups_minutes() {
        let metrics = MetricsRegistry::new();
        let now = Utc::now();
        let base = now - Duration::hours(1);

        metrics.record(base, 10, 0, 0);
        metrics.record(base + Duration::minutes(5), 20, 0, 0);
        metrics.record(now, 30, 0, 0);

        let points = metrics.hourly_points(now);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_reset_empties_registry() {
        let metrics = MetricsRegistry::new();
        metrics.record(Utc::now(), 1, 1, 1);
        metrics.reset();
        assert_eq!(metrics.total_requests(), 0);
        assert!(metrics.hourly_points(Utc::now()).is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_writers_lose_no_updates() {
        let metrics = MetricsRegistry::new();
        let now = Utc::now();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let metrics = metrics.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..250 {
                    metrics.record(now, 1, 1, 1);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(metrics.total_requests(), 8 * 250);
    }
}
