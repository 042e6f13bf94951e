//! Poll loop
//!
//! Fetches one price per interval and prints it until the shutdown channel
//! flips to `true`. Fetch failures are reported and the loop carries on; only
//! shutdown ends it.
//!
//! ```text
//! Poller::run
//!     ↓
//! PriceFetcher::fetch_price  (awaited, never overlapped)
//!     ↓
//! stdout: ticker line  |  stderr: error report
//!     ↓
//! sleep(interval)  (cancelled by shutdown)
//! ```

use crate::{
    config::Config,
    metrics::{MetricsCollector, ProviderMetrics},
    provider::PriceFetcher,
    types::{Asset, ErrorKind},
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};

/// Iteration counts of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub successes: u64,
    pub failures: u64,
}

/// Periodic price poller
pub struct Poller {
    fetcher: Arc<dyn PriceFetcher>,
    asset: Asset,
    convert: String,
    interval: Duration,
    metrics: MetricsCollector,
}

impl Poller {
    /// Creates a poller for the asset, currency and interval in `config`
    pub fn new(fetcher: Arc<dyn PriceFetcher>, config: &Config) -> Self {
        let metrics = MetricsCollector::new(fetcher.provider_name());
        Self {
            fetcher,
            asset: config.asset(),
            convert: config.convert().to_string(),
            interval: config.poll_interval(),
            metrics,
        }
    }

    /// Runs until `shutdown` becomes `true` or its sender is dropped
    ///
    /// # Arguments
    /// * `out` - Receives one ticker line per successful fetch
    /// * `err` - Receives one report line per failed fetch
    /// * `shutdown` - Observed while fetching and while sleeping
    ///
    /// # Returns
    /// How many iterations succeeded and failed, or the first write error
    pub async fn run<O, E>(
        &self,
        out: &mut O,
        err: &mut E,
        mut shutdown: watch::Receiver<bool>,
    ) -> std::io::Result<PollSummary>
    where
        O: Write,
        E: Write,
    {
        tracing::info!(
            asset = self.asset.symbol(),
            convert = %self.convert,
            interval_secs = self.interval.as_secs(),
            provider = self.fetcher.provider_name(),
            "Starting price ticker"
        );

        let mut summary = PollSummary::default();

        loop {
            if *shutdown.borrow() {
                break;
            }

            let start = Instant::now();
            let result = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                result = self.fetcher.fetch_price(self.asset, &self.convert) => result,
            };

            match result {
                Ok(quote) => {
                    tracing::debug!(
                        source = %quote.source,
                        price = quote.price,
                        percent_change_24h = ?quote.percent_change_24h,
                        last_updated = %quote.last_updated,
                        "Price quote received"
                    );
                    writeln!(out, "{}", quote.ticker_line())?;
                    out.flush()?;
                    self.metrics.record_request(start.elapsed(), None).await;
                    summary.successes += 1;
                }
                Err(e) => {
                    let kind = e.kind();
                    tracing::debug!(kind = %kind, error = %e, "Price fetch failed");
                    writeln!(
                        err,
                        "Failed to fetch the price of {}: {}",
                        self.asset.name(),
                        e
                    )?;
                    err.flush()?;
                    self.metrics.record_request(start.elapsed(), Some(kind)).await;
                    summary.failures += 1;
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = sleep(self.interval) => {}
            }
        }

        let metrics = self.metrics.get_metrics().await;
        tracing::info!(
            successes = summary.successes,
            failures = summary.failures,
            network_failures = failures_of(&metrics, ErrorKind::Network),
            status_failures = failures_of(&metrics, ErrorKind::Status),
            malformed_failures = failures_of(&metrics, ErrorKind::MalformedResponse),
            success_rate = metrics.success_rate,
            latency_p50_ms = metrics.latency_p50_ms,
            latency_p99_ms = metrics.latency_p99_ms,
            "Price ticker stopped"
        );

        Ok(summary)
    }

    /// Returns fetch statistics collected so far
    pub async fn metrics(&self) -> ProviderMetrics {
        self.metrics.get_metrics().await
    }
}

fn failures_of(metrics: &ProviderMetrics, kind: ErrorKind) -> u64 {
    metrics.failures_by_kind.get(&kind).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{Outcome, ScriptedFetcher};

    fn lines(buf: &[u8]) -> Vec<String> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn config() -> Config {
        Config::new("test-key").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_continues_across_every_error_kind() {
        let (tx, rx) = watch::channel(false);
        let fetcher = Arc::new(
            ScriptedFetcher::new(vec![
                Outcome::Price(1.0),
                Outcome::Timeout,
                Outcome::Price(2.0),
                Outcome::Unauthorized,
                Outcome::Price(3.0),
                Outcome::RateLimited,
                Outcome::Price(4.0),
                Outcome::Malformed,
                Outcome::Price(34987.234),
            ])
            .with_shutdown(tx),
        );
        let poller = Poller::new(fetcher.clone(), &config());

        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = poller.run(&mut out, &mut err, rx).await.unwrap();

        assert_eq!(summary, PollSummary { successes: 5, failures: 4 });
        assert_eq!(fetcher.call_count(), 9);

        let out = lines(&out);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], "The current price of Bitcoin is $1.00");
        assert_eq!(out[4], "The current price of Bitcoin is $34987.23");

        let err = lines(&err);
        assert_eq!(err.len(), 4);
        assert!(err
            .iter()
            .all(|line| line.starts_with("Failed to fetch the price of Bitcoin: ")));

        let metrics = poller.metrics().await;
        assert_eq!(metrics.total_requests, 9);
        assert_eq!(metrics.failed_requests, 4);
        assert_eq!(metrics.failures_by_kind.get(&ErrorKind::Network), Some(&1));
        assert_eq!(metrics.failures_by_kind.get(&ErrorKind::Status), Some(&2));
        assert_eq!(
            metrics.failures_by_kind.get(&ErrorKind::MalformedResponse),
            Some(&1)
        );
        assert_eq!(failures_of(&metrics, ErrorKind::Status), 2);
        assert_eq!(failures_of(&ProviderMetrics::empty("mock"), ErrorKind::Status), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_sleep() {
        let (tx, rx) = watch::channel(false);
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Outcome::Price(10.0); 10]));
        let poller = Poller::new(fetcher.clone(), &config());

        let mut out = Vec::new();
        let mut err = Vec::new();
        let started = Instant::now();

        let (summary, _) = tokio::join!(poller.run(&mut out, &mut err, rx), async {
            sleep(Duration::from_millis(2500)).await;
            tx.send(true).unwrap();
        });

        // fetches at t=0s, 1s and 2s; the 3s fetch never starts
        assert_eq!(summary.unwrap(), PollSummary { successes: 3, failures: 0 });
        assert_eq!(fetcher.call_count(), 3);
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(err.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_from_config() {
        let (tx, rx) = watch::channel(false);
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Outcome::Price(10.0); 10]));
        let config = config().with_poll_interval_secs(5).unwrap();
        let poller = Poller::new(fetcher.clone(), &config);

        let mut out = Vec::new();
        let mut err = Vec::new();

        let (summary, _) = tokio::join!(poller.run(&mut out, &mut err, rx), async {
            sleep(Duration::from_secs(12)).await;
            tx.send(true).unwrap();
        });

        // t=0s, 5s, 10s
        assert_eq!(summary.unwrap().successes, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_never_fetches() {
        let (_tx, rx) = watch::channel(true);
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Outcome::Price(10.0)]));
        let poller = Poller::new(fetcher.clone(), &config());

        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = poller.run(&mut out, &mut err, rx).await.unwrap();

        assert_eq!(summary, PollSummary::default());
        assert_eq!(fetcher.call_count(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_loop() {
        let (tx, rx) = watch::channel(false);
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Outcome::Price(10.0); 3]));
        let poller = Poller::new(fetcher.clone(), &config());
        drop(tx);

        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = poller.run(&mut out, &mut err, rx).await.unwrap();

        assert_eq!(summary.successes, 0);
        assert_eq!(fetcher.call_count(), 0);
    }
}
