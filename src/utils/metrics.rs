use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of recent API latency samples kept for averages and percentiles
pub const LATENCY_WINDOW: usize = 1024;

/// Global metrics collector for the application.
///
/// Tracks remote API usage, cache performance, request coalescing and
/// per-endpoint traffic. Thread-safe and cheap to clone.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    // API Metrics
    api_calls_total: AtomicUsize,
    api_calls_success: AtomicUsize,
    api_calls_failed: AtomicUsize,
    api_latency_ms: RwLock<VecDeque<u64>>,

    // Cache Metrics
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    cache_size: AtomicUsize,

    // Callers that joined an in-flight remote call instead of making their own
    coalesced_requests: AtomicUsize,

    // Lookups rejected before reaching the cache
    validation_failures: AtomicUsize,

    // Per-endpoint request counters
    endpoint_counters: DashMap<String, AtomicUsize>,

    // Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                api_calls_total: AtomicUsize::new(0),
                api_calls_success: AtomicUsize::new(0),
                api_calls_failed: AtomicUsize::new(0),
                api_latency_ms: RwLock::new(VecDeque::with_capacity(LATENCY_WINDOW)),
                cache_hits: AtomicUsize::new(0),
                cache_misses: AtomicUsize::new(0),
                cache_size: AtomicUsize::new(0),
                coalesced_requests: AtomicUsize::new(0),
                validation_failures: AtomicUsize::new(0),
                endpoint_counters: DashMap::new(),
                start_time: Instant::now(),
            }),
        }
    }

    // API Metrics
    pub fn record_api_call(&self, success: bool, duration: Duration) {
        self.inner.api_calls_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.inner.api_calls_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.api_calls_failed.fetch_add(1, Ordering::Relaxed);
        }

        let mut latency = self.inner.api_latency_ms.write();
        if latency.len() == LATENCY_WINDOW {
            latency.pop_front();
        }
        latency.push_back(duration.as_millis() as u64);
    }

    // Cache Metrics
    pub fn record_cache_hit(&self) {
        self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.inner.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_cache_size(&self, size: usize) {
        self.inner.cache_size.store(size, Ordering::Relaxed);
    }

    pub fn record_coalesced_request(&self) {
        self.inner.coalesced_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failure(&self) {
        self.inner.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Endpoint Metrics
    pub fn record_endpoint_request(&self, endpoint: &str) {
        self.inner.endpoint_counters
            .entry(endpoint.to_string())
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    // Get snapshot for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut api_latency: Vec<u64> = self.inner.api_latency_ms.read().iter().copied().collect();
        api_latency.sort_unstable();
        let api_latency_avg = avg(&api_latency);
        let api_latency_p50 = percentile(&api_latency, 0.5);
        let api_latency_p95 = percentile(&api_latency, 0.95);
        let api_latency_p99 = percentile(&api_latency, 0.99);

        let cache_hits = self.inner.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.inner.cache_misses.load(Ordering::Relaxed);
        let cache_total = cache_hits + cache_misses;
        let cache_hit_rate = if cache_total > 0 {
            cache_hits as f64 / cache_total as f64
        } else {
            0.0
        };

        let endpoint_requests = self
            .inner
            .endpoint_counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();

        MetricsSnapshot {
            api_calls_total: self.inner.api_calls_total.load(Ordering::Relaxed),
            api_calls_success: self.inner.api_calls_success.load(Ordering::Relaxed),
            api_calls_failed: self.inner.api_calls_failed.load(Ordering::Relaxed),
            api_latency_avg_ms: api_latency_avg,
            api_latency_p50_ms: api_latency_p50,
            api_latency_p95_ms: api_latency_p95,
            api_latency_p99_ms: api_latency_p99,
            cache_hits,
            cache_misses,
            cache_hit_rate,
            cache_size: self.inner.cache_size.load(Ordering::Relaxed),
            coalesced_requests: self.inner.coalesced_requests.load(Ordering::Relaxed),
            validation_failures: self.inner.validation_failures.load(Ordering::Relaxed),
            endpoint_requests,
            uptime_seconds: self.inner.start_time.elapsed().as_secs(),
        }
    }

    /// Generate Prometheus-format metrics
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = format!(
            r#"# HELP api_calls_total Total number of dictionary API calls made
# TYPE api_calls_total counter
api_calls_total {{}} {}

# HELP api_calls_success Number of successful dictionary API calls
# TYPE api_calls_success counter
api_calls_success {{}} {}

# HELP api_calls_failed Number of failed dictionary API calls
# TYPE api_calls_failed counter
api_calls_failed {{}} {}

# HELP api_latency_avg_ms Average API latency in milliseconds
# TYPE api_latency_avg_ms gauge
api_latency_avg_ms {{}} {}

# HELP cache_hit_rate Cache hit rate (0.0 to 1.0)
# TYPE cache_hit_rate gauge
cache_hit_rate {{}} {}

# HELP cache_size Current number of stored cache entries
# TYPE cache_size gauge
cache_size {{}} {}

# HELP coalesced_requests_total Requests that joined an in-flight API call
# TYPE coalesced_requests_total counter
coalesced_requests_total {{}} {}

# HELP validation_failures_total Lookups rejected by input validation
# TYPE validation_failures_total counter
validation_failures_total {{}} {}

# HELP uptime_seconds Application uptime in seconds
# TYPE uptime_seconds counter
uptime_seconds {{}} {}
"#,
            snapshot.api_calls_total,
            snapshot.api_calls_success,
            snapshot.api_calls_failed,
            snapshot.api_latency_avg_ms,
            snapshot.cache_hit_rate,
            snapshot.cache_size,
            snapshot.coalesced_requests,
            snapshot.validation_failures,
            snapshot.uptime_seconds,
        );

        if !snapshot.endpoint_requests.is_empty() {
            out.push_str("\n# HELP endpoint_requests_total Requests per HTTP endpoint\n");
            out.push_str("# TYPE endpoint_requests_total counter\n");
            for (endpoint, count) in &snapshot.endpoint_requests {
                let _ = writeln!(out, "endpoint_requests_total {{endpoint=\"{}\"}} {}", endpoint, count);
            }
        }

        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub api_calls_total: usize,
    pub api_calls_success: usize,
    pub api_calls_failed: usize,
    pub api_latency_avg_ms: u64,
    pub api_latency_p50_ms: u64,
    pub api_latency_p95_ms: u64,
    pub api_latency_p99_ms: u64,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub cache_hit_rate: f64,
    pub cache_size: usize,
    pub coalesced_requests: usize,
    pub validation_failures: usize,
    pub endpoint_requests: BTreeMap<String, usize>,
    pub uptime_seconds: u64,
}

/// `sorted` must be in ascending order
fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p) as usize;
    sorted[idx]
}

fn avg(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.iter().sum::<u64>() / values.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_api_call(true, Duration::from_millis(100));
        metrics.record_api_call(false, Duration::from_millis(50));
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        metrics.record_coalesced_request();
        metrics.record_validation_failure();
        metrics.update_cache_size(7);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.api_calls_total, 2);
        assert_eq!(snapshot.api_calls_success, 1);
        assert_eq!(snapshot.api_calls_failed, 1);
        assert_eq!(snapshot.api_latency_avg_ms, 75);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hit_rate, 0.5);
        assert_eq!(snapshot.cache_size, 7);
        assert_eq!(snapshot.coalesced_requests, 1);
        assert_eq!(snapshot.validation_failures, 1);
    }

    #[test]
    fn test_endpoint_counters() {
        let metrics = Metrics::new();
        metrics.record_endpoint_request("/lookup");
        metrics.record_endpoint_request("/lookup");
        metrics.record_endpoint_request("/languages");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.endpoint_requests.get("/lookup"), Some(&2));
        assert_eq!(snapshot.endpoint_requests.get("/languages"), Some(&1));
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.record_api_call(true, Duration::from_millis(100));
        metrics.record_endpoint_request("/lookup");

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("api_calls_total {} 1"));
        assert!(prometheus.contains("endpoint_requests_total {endpoint=\"/lookup\"} 1"));
    }

    #[test]
    fn test_latency_window_keeps_recent_samples() {
        let metrics = Metrics::new();
        for _ in 0..100 {
            metrics.record_api_call(true, Duration::from_millis(5000));
        }
        for _ in 0..LATENCY_WINDOW {
            metrics.record_api_call(true, Duration::from_millis(20));
        }

        assert_eq!(metrics.inner.api_latency_ms.read().len(), LATENCY_WINDOW);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.api_calls_total, 100 + LATENCY_WINDOW);
        assert_eq!(snapshot.api_latency_avg_ms, 20);
        assert_eq!(snapshot.api_latency_p99_ms, 20);
    }

    #[test]
    fn test_latency_percentiles() {
        let metrics = Metrics::new();
        for ms in (1..=100).rev() {
            metrics.record_api_call(true, Duration::from_millis(ms));
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.api_latency_p50_ms, 50);
        assert_eq!(snapshot.api_latency_p95_ms, 95);
        assert_eq!(snapshot.api_latency_p99_ms, 99);
    }
}
