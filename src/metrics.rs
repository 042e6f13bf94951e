//! Fetch latency and success tracking
//!
//! The poll loop records every fetch here and logs a summary on shutdown.

use crate::types::ErrorKind;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep for latency percentiles
const MAX_SAMPLES: usize = 100;

/// Metrics snapshot for the active fetcher
#[derive(Debug, Clone)]
pub struct ProviderMetrics {
    /// Name of the provider
    pub provider_name: String,
    /// 50th percentile latency of successful fetches in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful fetches in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of fetches
    pub total_requests: u64,
    /// Number of failed fetches
    pub failed_requests: u64,
    /// Failed fetches per error kind
    pub failures_by_kind: HashMap<ErrorKind, u64>,
}

impl ProviderMetrics {
    /// Creates metrics with no data
    pub fn empty(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
            failures_by_kind: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct Counters {
    samples: VecDeque<LatencySample>,
    total: u64,
    failed: u64,
    by_kind: HashMap<ErrorKind, u64>,
}

/// Collects and computes metrics for a fetcher
pub struct MetricsCollector {
    provider_name: String,
    counters: RwLock<Counters>,
}

impl MetricsCollector {
    /// Creates a new metrics collector for a provider
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            counters: RwLock::new(Counters {
                samples: VecDeque::with_capacity(MAX_SAMPLES),
                ..Counters::default()
            }),
        }
    }

    /// Records a fetch with its duration and outcome
    ///
    /// `failure` is `None` for a successful fetch.
    pub async fn record_request(&self, duration: Duration, failure: Option<ErrorKind>) {
        let mut counters = self.counters.write().await;
        counters.total += 1;

        if let Some(kind) = failure {
            counters.failed += 1;
            *counters.by_kind.entry(kind).or_insert(0) += 1;
        }

        if counters.samples.len() >= MAX_SAMPLES {
            counters.samples.pop_front();
        }
        counters.samples.push_back(LatencySample {
            duration_ms: duration.as_secs_f64() * 1000.0,
            success: failure.is_none(),
        });
    }

    /// Computes current metrics from collected samples
    pub async fn get_metrics(&self) -> ProviderMetrics {
        let counters = self.counters.read().await;

        if counters.total == 0 {
            return ProviderMetrics::empty(&self.provider_name);
        }

        let mut latencies: Vec<f64> = counters
            .samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();

        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        ProviderMetrics {
            provider_name: self.provider_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate: (counters.total - counters.failed) as f64 / counters.total as f64,
            total_requests: counters.total,
            failed_requests: counters.failed,
            failures_by_kind: counters.by_kind.clone(),
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
