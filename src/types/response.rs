use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    AccountStatus, ActivitySide, ActivityType, AssetClass, AssetStatus, DtbpCheck, OrderStatus,
    OrderType, PositionSide, Side, TimeInForce, TradeConfirmEmail, hour_minute,
};

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub account_number: String,
    pub status: AccountStatus,
    pub currency: String,
    pub cash: Decimal,
    pub portfolio_value: Decimal,
    pub pattern_day_trader: bool,
    pub trade_suspended_by_user: bool,
    pub trading_blocked: bool,
    pub transfers_blocked: bool,
    pub account_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub shorting_enabled: bool,
    pub long_market_value: Decimal,
    pub short_market_value: Decimal,
    pub equity: Decimal,
    pub last_equity: Decimal,
    pub multiplier: Decimal,
    pub buying_power: Decimal,
    pub initial_margin: Decimal,
    pub maintenance_margin: Decimal,
    pub sma: Decimal,
    pub daytrade_count: u64,
    pub last_maintenance_margin: Decimal,
    pub daytrading_buying_power: Decimal,
    pub regt_buying_power: Decimal,
}

/// One ledger entry. Trade activities (`FILL`) carry the order fields, other
/// activities carry `date`/`net_amount` and friends.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AccountActivity {
    pub activity_type: ActivityType,
    pub id: String,
    #[serde(default)]
    pub cum_qty: Option<Decimal>,
    #[serde(default)]
    pub leaves_qty: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub side: Option<ActivitySide>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<DateTime<Utc>>,
    /// `fill` or `partial_fill` for trade activities.
    #[serde(default, rename = "type")]
    pub fill_type: Option<String>,
    #[serde(default)]
    pub order_id: Option<Uuid>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub net_amount: Option<Decimal>,
    #[serde(default)]
    pub per_share_amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl AccountActivity {
    #[must_use]
    pub fn is_trade(&self) -> bool {
        self.activity_type == ActivityType::Fill
    }
}

/// Account-level trading settings. Used both as response and as update body.
#[non_exhaustive]
#[derive(bon::Builder, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AccountConfigurations {
    pub dtbp_check: DtbpCheck,
    pub no_shorting: bool,
    pub suspend_trade: bool,
    pub trade_confirm_email: TradeConfirmEmail,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub client_order_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub filled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expired_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replaced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replaced_by: Option<Uuid>,
    #[serde(default)]
    pub replaces: Option<Uuid>,
    pub asset_id: Uuid,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub qty: Decimal,
    pub filled_qty: Decimal,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: Side,
    pub time_in_force: TimeInForce,
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    #[serde(default)]
    pub filled_avg_price: Option<Decimal>,
    pub status: OrderStatus,
    #[serde(default)]
    pub extended_hours: bool,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Position {
    pub asset_id: Uuid,
    pub symbol: String,
    pub exchange: String,
    pub asset_class: AssetClass,
    pub avg_entry_price: Decimal,
    pub qty: Decimal,
    pub side: PositionSide,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub unrealized_pl: Decimal,
    pub unrealized_plpc: Decimal,
    pub unrealized_intraday_pl: Decimal,
    pub unrealized_intraday_plpc: Decimal,
    pub current_price: Decimal,
    pub lastday_price: Decimal,
    pub change_today: Decimal,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Asset {
    pub id: Uuid,
    pub class: AssetClass,
    pub exchange: String,
    pub symbol: String,
    pub status: AssetStatus,
    pub tradable: bool,
    pub marginable: bool,
    pub shortable: bool,
    pub easy_to_borrow: bool,
}

/// One trading day. `open` and `close` are exchange-local times.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Calendar {
    pub date: NaiveDate,
    #[serde(with = "hour_minute")]
    pub open: NaiveTime,
    #[serde(with = "hour_minute")]
    pub close: NaiveTime,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Clock {
    pub timestamp: DateTime<Utc>,
    pub is_open: bool,
    pub next_open: DateTime<Utc>,
    pub next_close: DateTime<Utc>,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Bar {
    #[serde(rename = "t", with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: Decimal,
    #[serde(rename = "h")]
    pub high: Decimal,
    #[serde(rename = "l")]
    pub low: Decimal,
    #[serde(rename = "c")]
    pub close: Decimal,
    #[serde(rename = "v")]
    pub volume: u64,
}

/// Bars keyed by symbol, each series in provider order.
pub type Bars = HashMap<String, Vec<Bar>>;

/// Per-order entry of the multi-status response to cancelling all orders.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CancelOrderStatus {
    pub id: Uuid,
    pub status: u16,
    /// The order on success, the upstream error object otherwise.
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

/// Per-symbol entry of the multi-status response to closing all positions.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClosePositionStatus {
    pub symbol: String,
    pub status: u16,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}
