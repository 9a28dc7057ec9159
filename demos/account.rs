//! Prints the account, its configuration and the latest fills.
//!
//! ```sh
//! APCA_API_KEY_ID=... APCA_API_SECRET_KEY=... APCA_PAPER=true \
//!     RUST_LOG=alpaca_trade_api=debug cargo run --example account --features tracing
//! ```

use alpaca_trade_api::types::{ActivitiesRequest, ActivityType, SortDirection};
use alpaca_trade_api::{Client, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = Client::new(Config::from_env()?)?;
    info!(endpoint = %client.trading_url(), "connected");

    let account = client.account().await?;
    info!(
        status = ?account.status,
        equity = %account.equity,
        buying_power = %account.buying_power,
        "account"
    );

    let configurations = client.account_configurations().await?;
    info!(?configurations, "configurations");

    let fills = client
        .account_activities(
            &ActivitiesRequest::builder()
                .activity_types(vec![ActivityType::Fill])
                .direction(SortDirection::Desc)
                .page_size(10)
                .build(),
        )
        .await?;
    for fill in &fills {
        info!(
            symbol = fill.symbol.as_deref().unwrap_or_default(),
            qty = ?fill.qty,
            price = ?fill.price,
            "fill"
        );
    }

    Ok(())
}
