//! funding-spread - cross-exchange funding-rate spread checker.
//!
//! Polls Hyperliquid and Lighter public market-data APIs for one perpetual
//! market, normalizes both responses, and prints the funding-rate spread with
//! a notional profit estimate. Read-only; never places orders.
//!
//! Usage:
//!   funding-spread [MARKET] [POSITION_USD]
//!   funding-spread ETH 5000
//!   funding-spread btc 2500 --json

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funding_spread::{
    models::Config,
    report, spread,
    transport::HttpTransport,
    venues::{HyperliquidVenue, LighterVenue, Venue},
};

const DEFAULT_POSITION_USD: f64 = 1000.0;

/// Cross-exchange funding-rate spread checker
#[derive(Parser, Debug)]
#[command(name = "funding-spread")]
#[command(about = "Estimate the funding-rate spread between Hyperliquid and Lighter")]
struct Cli {
    /// Perpetual market symbol (case-insensitive)
    #[arg(default_value = "ETH")]
    market: String,

    /// Position size in USD used to scale the profit estimate
    #[arg(default_value = "1000")]
    position_usd: String,

    /// Emit the estimate as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

/// Unparseable or non-finite or negative input falls back to the default with
/// a warning; the program does not abort on bad user input here.
fn parse_position(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            warn!(
                input = raw,
                default = DEFAULT_POSITION_USD,
                "position size not a valid non-negative number, using default"
            );
            DEFAULT_POSITION_USD
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so the stdout report stays machine-readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let position_usd = parse_position(&cli.position_usd);
    let config = Config::from_env();

    let transport = Arc::new(HttpTransport::new()?);
    let hyperliquid = HyperliquidVenue::new(config.hyperliquid_url, Arc::clone(&transport));
    let lighter = LighterVenue::new(config.lighter_url, transport);

    // Independent fetches, issued concurrently; both must succeed.
    let (a, b) = tokio::join!(
        hyperliquid.fetch_snapshot(&cli.market),
        lighter.fetch_snapshot(&cli.market)
    );

    let (a, b) = match (a, b) {
        (Ok(a), Ok(b)) => (a, b),
        (a, b) => {
            if let Err(e) = &a {
                error!(venue = hyperliquid.name(), market = %cli.market, error = %e, "fetch failed");
            }
            if let Err(e) = &b {
                error!(venue = lighter.name(), market = %cli.market, error = %e, "fetch failed");
            }
            error!("could not retrieve market data from one or both exchanges");
            std::process::exit(1);
        }
    };

    let estimate = spread::estimate(&a, &b, position_usd);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        print!("{}", report::render(&estimate));
    }

    Ok(())
}
