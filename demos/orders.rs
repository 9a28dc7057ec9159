//! Submits a far-from-market limit order on a paper account, replaces it, then cancels it.
//!
//! ```sh
//! APCA_API_KEY_ID=... APCA_API_SECRET_KEY=... APCA_PAPER=true \
//!     cargo run --example orders --features tracing
//! ```

use alpaca_trade_api::types::{
    CreateOrderRequest, OrderStatusFilter, OrdersRequest, RawOrderRequest, ReplaceOrderRequest,
};
use alpaca_trade_api::{Client, Config};
use rust_decimal_macros::dec;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = Client::new(Config::from_env()?)?;
    if client.trading_url().as_str() == "https://api.alpaca.markets/" {
        anyhow::bail!("refusing to place orders on a live account, set APCA_PAPER=true");
    }

    let request = CreateOrderRequest::from_raw(RawOrderRequest {
        symbol: "AAPL".to_owned(),
        qty: "1".to_owned(),
        side: "buy".to_owned(),
        order_type: "limit".to_owned(),
        time_in_force: "day".to_owned(),
        limit_price: Some("1.00".to_owned()),
        ..RawOrderRequest::default()
    })?;
    let order = client.create_order(&request).await?;
    info!(id = %order.id, status = ?order.status, "submitted");

    let replacement = client
        .replace_order(
            order.id,
            &ReplaceOrderRequest::default().with_limit_price(dec!(1.05)),
        )
        .await?;
    info!(id = %replacement.id, replaces = ?replacement.replaces, "replaced");

    let open = client
        .orders(
            &OrdersRequest::builder()
                .status(OrderStatusFilter::Open)
                .limit(50)
                .build(),
        )
        .await?;
    info!(count = open.len(), "open orders");

    if let Err(e) = client.cancel_order(replacement.id).await {
        warn!(error = %e, "cancel failed");
    }

    Ok(())
}
