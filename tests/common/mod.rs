#![allow(dead_code, reason = "each test binary uses a different subset of the fixtures")]

use alpaca_trade_api::{Client, Config};
use httpmock::MockServer;
use serde_json::{Value, json};
use url::Url;

pub const KEY_ID: &str = "PKTEST";
pub const SECRET_KEY: &str = "s3cr3t";

pub const ORDER_ID: &str = "61e69015-8549-4bfd-b9c3-01e75843f47d";
pub const ASSET_ID: &str = "b0b6dd9d-8b9b-48a9-ba46-b9d54906e415";

pub fn server_url(server: &MockServer) -> Url {
    Url::parse(&server.base_url()).expect("mock server url")
}

/// A key-pair client whose three hosts all point at `server`.
pub fn client(server: &MockServer) -> Client {
    let url = server_url(server);
    Client::new(
        Config::builder()
            .base_url(url.clone())
            .data_base_url(url.clone())
            .polygon_base_url(url)
            .key_id(KEY_ID)
            .secret_key(SECRET_KEY.to_owned())
            .build(),
    )
    .expect("valid client config")
}

pub fn account_json() -> Value {
    json!({
        "id": "904837e3-3b76-47ec-b432-046db621571b",
        "account_number": "PA2U9ORLVW3B",
        "status": "ACTIVE",
        "currency": "USD",
        "cash": "100000.00",
        "portfolio_value": "100123.4567",
        "pattern_day_trader": false,
        "trade_suspended_by_user": false,
        "trading_blocked": false,
        "transfers_blocked": false,
        "account_blocked": false,
        "created_at": "2019-06-12T22:47:07.99658Z",
        "shorting_enabled": true,
        "long_market_value": "123.4567",
        "short_market_value": "0",
        "equity": "100123.4567",
        "last_equity": "100000",
        "multiplier": "4",
        "buying_power": "400000",
        "initial_margin": "0",
        "maintenance_margin": "0",
        "sma": "0",
        "daytrade_count": 0,
        "last_maintenance_margin": "0",
        "daytrading_buying_power": "0",
        "regt_buying_power": "200000",
        "accrued_fees": "0"
    })
}

pub fn order_json(id: &str, symbol: &str, qty: &str) -> Value {
    json!({
        "id": id,
        "client_order_id": "eb9e2aaa-f71a-4f51-b5b4-52a6c565dad4",
        "created_at": "2021-03-16T18:38:01.942282Z",
        "updated_at": "2021-03-16T18:38:01.942282Z",
        "submitted_at": "2021-03-16T18:38:01.937734Z",
        "filled_at": null,
        "expired_at": null,
        "canceled_at": null,
        "failed_at": null,
        "asset_id": ASSET_ID,
        "symbol": symbol,
        "asset_class": "us_equity",
        "qty": qty,
        "filled_qty": "0",
        "type": "limit",
        "side": "buy",
        "time_in_force": "day",
        "limit_price": "187.50",
        "stop_price": null,
        "filled_avg_price": null,
        "status": "new",
        "extended_hours": false
    })
}

pub fn position_json(symbol: &str) -> Value {
    json!({
        "asset_id": ASSET_ID,
        "symbol": symbol,
        "exchange": "NASDAQ",
        "asset_class": "us_equity",
        "avg_entry_price": "100.0",
        "qty": "5",
        "side": "long",
        "market_value": "600.0",
        "cost_basis": "500.0",
        "unrealized_pl": "100.0",
        "unrealized_plpc": "0.20",
        "unrealized_intraday_pl": "10.0",
        "unrealized_intraday_plpc": "0.0084",
        "current_price": "120.0",
        "lastday_price": "119.0",
        "change_today": "0.0084"
    })
}

pub fn asset_json(symbol: &str) -> Value {
    json!({
        "id": ASSET_ID,
        "class": "us_equity",
        "exchange": "NASDAQ",
        "symbol": symbol,
        "status": "active",
        "tradable": true,
        "marginable": true,
        "shortable": true,
        "easy_to_borrow": true
    })
}
