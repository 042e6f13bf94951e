use anyhow::Context;
use clap::{Parser, Subcommand};
use cmc_price_ticker::{
    constants::{DEFAULT_CONVERT, POLL_INTERVAL_SECS, REQUEST_TIMEOUT_SECS},
    signals::spawn_signal_listeners,
    Asset, CoinMarketCapFetcher, Config, Poller,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Cryptocurrency price tracker (CoinMarketCap API)
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Asset symbol to track (BTC, ETH, SOL, USDC, USDT, WBTC, WETH)
    #[arg(long, global = true, default_value = "BTC")]
    symbol: Asset,

    /// Currency to convert the price into
    #[arg(long, global = true, default_value = DEFAULT_CONVERT)]
    convert: String,

    /// Seconds between polls
    #[arg(long, global = true, default_value_t = POLL_INTERVAL_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = REQUEST_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Poll the price and print it until interrupted (default)
    Track,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout is reserved for ticker lines
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn track(config: Config) -> anyhow::Result<()> {
    let fetcher =
        Arc::new(CoinMarketCapFetcher::new(&config).context("Failed to build HTTP client")?);
    let poller = Poller::new(fetcher, &config);

    // shutdown_tx lives until the loop returns; listeners only hold clones
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let _listeners =
        spawn_signal_listeners(&shutdown_tx).context("Failed to install signal handlers")?;

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    poller
        .run(&mut stdout, &mut stderr, shutdown_rx)
        .await
        .context("Failed to write ticker output")?;

    println!("Stopped tracking {}. Goodbye!", config.asset().name());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = Config::from_env()
        .context("Failed to load configuration")?
        .with_asset(args.symbol)
        .with_convert(&args.convert)?
        .with_poll_interval_secs(args.interval)?
        .with_request_timeout(Duration::from_secs(args.timeout));

    tracing::debug!(?config, "Loaded configuration");

    match args.command.unwrap_or(Command::Track) {
        Command::Track => track(config).await,
    }
}
