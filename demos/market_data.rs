//! Fetches recent daily bars and, for key-pair accounts, Polygon company details.
//!
//! ```sh
//! APCA_API_KEY_ID=... APCA_API_SECRET_KEY=... cargo run --example market_data --features tracing
//! ```

use alpaca_trade_api::types::{BarsRequest, TimeFrame};
use alpaca_trade_api::{Client, Config};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = Client::new(Config::from_env()?)?;

    let clock = client.clock().await?;
    info!(is_open = clock.is_open, next_open = %clock.next_open, "clock");

    let bars = client
        .bars(
            &BarsRequest::builder()
                .timeframe(TimeFrame::Day)
                .symbols(vec!["AAPL".to_owned(), "MSFT".to_owned()])
                .limit(5)
                .build(),
        )
        .await?;
    for (symbol, series) in &bars {
        if let Some(last) = series.last() {
            info!(symbol, time = %last.time, close = %last.close, volume = last.volume, "bar");
        }
    }

    match client.company("AAPL").await {
        Ok(company) => info!(name = %company["name"], "company"),
        Err(e) => warn!(error = %e, "polygon unavailable"),
    }

    Ok(())
}
