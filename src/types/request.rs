use std::collections::BTreeMap;

use bon::Builder;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_with::formats::CommaSeparator;
use serde_with::{StringWithSeparator, serde_as};

use crate::Result;
use crate::error::Error;
use crate::types::{
    ActivityType, AssetClass, AssetStatus, OrderStatusFilter, OrderType, Side, SortDirection,
    TimeFrame, TimeInForce,
};

/// Longest client order id the trading API accepts.
pub const MAX_CLIENT_ORDER_ID_LEN: usize = 48;
pub const MAX_ORDERS_LIMIT: u32 = 500;
pub const MAX_ACTIVITIES_PAGE_SIZE: u32 = 100;
pub const MAX_BARS_LIMIT: u32 = 1000;

/// Extra query parameters passed through untouched to the Polygon endpoints.
pub type Params = BTreeMap<String, String>;

/// Raw order values, typically straight from user input or app-level config.
#[derive(Clone, Debug, Default)]
pub struct RawOrderRequest {
    pub symbol: String,
    pub qty: String,
    pub side: String,
    pub order_type: String,
    pub time_in_force: String,
    pub limit_price: Option<String>,
    pub stop_price: Option<String>,
    pub extended_hours: Option<bool>,
    pub client_order_id: Option<String>,
}

/// Body of `POST /orders`.
#[non_exhaustive]
#[derive(Builder, Clone, Debug, PartialEq, Serialize)]
pub struct CreateOrderRequest {
    #[builder(into)]
    pub symbol: String,
    pub qty: Decimal,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_hours: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub client_order_id: Option<String>,
}

impl CreateOrderRequest {
    /// Parses raw text values. Decimal text keeps its exact scale.
    pub fn from_raw(raw: RawOrderRequest) -> Result<Self> {
        let request = Self {
            symbol: raw.symbol,
            qty: parse_decimal("qty", &raw.qty)?,
            side: raw.side.parse()?,
            order_type: raw.order_type.parse()?,
            time_in_force: raw.time_in_force.parse()?,
            limit_price: raw
                .limit_price
                .as_deref()
                .map(|p| parse_decimal("limit_price", p))
                .transpose()?,
            stop_price: raw
                .stop_price
                .as_deref()
                .map(|p| parse_decimal("stop_price", p))
                .transpose()?,
            extended_hours: raw.extended_hours,
            client_order_id: raw.client_order_id,
        };
        request.validate()?;

        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_empty("symbol", &self.symbol)?;
        ensure_positive("qty", self.qty)?;
        if self.order_type == OrderType::Unknown {
            return Err(Error::validation("order type must not be Unknown"));
        }
        if self.time_in_force == TimeInForce::Unknown {
            return Err(Error::validation("time_in_force must not be Unknown"));
        }

        match self.limit_price {
            Some(price) => ensure_positive("limit_price", price)?,
            None if self.order_type.requires_limit_price() => {
                return Err(Error::validation(format!(
                    "{} orders require a limit_price",
                    self.order_type
                )));
            }
            None => {}
        }
        match self.stop_price {
            Some(price) => ensure_positive("stop_price", price)?,
            None if self.order_type.requires_stop_price() => {
                return Err(Error::validation(format!(
                    "{} orders require a stop_price",
                    self.order_type
                )));
            }
            None => {}
        }

        if self.extended_hours == Some(true)
            && (self.order_type != OrderType::Limit || self.time_in_force != TimeInForce::Day)
        {
            return Err(Error::validation(
                "extended_hours is only supported for limit day orders",
            ));
        }
        if let Some(id) = &self.client_order_id {
            ensure_client_order_id(id)?;
        }

        Ok(())
    }
}

/// Body of `PATCH /orders/{id}`. Unset fields keep their current value.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReplaceOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

impl ReplaceOrderRequest {
    #[must_use]
    pub const fn with_qty(mut self, qty: Decimal) -> Self {
        self.qty = Some(qty);
        self
    }

    #[must_use]
    pub const fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    #[must_use]
    pub const fn with_limit_price(mut self, limit_price: Decimal) -> Self {
        self.limit_price = Some(limit_price);
        self
    }

    #[must_use]
    pub const fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    #[must_use]
    pub fn with_client_order_id<S: Into<String>>(mut self, client_order_id: S) -> Self {
        self.client_order_id = Some(client_order_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if *self == Self::default() {
            return Err(Error::validation(
                "replace_order needs at least one of qty, time_in_force, limit_price, stop_price, client_order_id",
            ));
        }
        if let Some(qty) = self.qty {
            ensure_positive("qty", qty)?;
        }
        if self.time_in_force == Some(TimeInForce::Unknown) {
            return Err(Error::validation("time_in_force must not be Unknown"));
        }
        if let Some(price) = self.limit_price {
            ensure_positive("limit_price", price)?;
        }
        if let Some(price) = self.stop_price {
            ensure_positive("stop_price", price)?;
        }
        if let Some(id) = &self.client_order_id {
            ensure_client_order_id(id)?;
        }
        Ok(())
    }
}

/// Filters for `GET /orders`.
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Default, Serialize)]
pub struct OrdersRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatusFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl OrdersRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.limit {
            ensure_in_range("limit", limit, MAX_ORDERS_LIMIT)?;
        }
        ensure_ordered(self.after, self.until)
    }
}

/// Filters for `GET /account/activities`.
///
/// A single activity type is sent as a path segment, several as `activity_types=A,B`.
#[serde_as]
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Default, Serialize)]
pub struct ActivitiesRequest {
    #[builder(default)]
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, ActivityType>")]
    #[serde(skip_serializing_if = "at_most_one")]
    pub activity_types: Vec<ActivityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub page_token: Option<String>,
}

impl ActivitiesRequest {
    /// The activity type to address by path, when exactly one is requested.
    #[must_use]
    pub fn single_type(&self) -> Option<ActivityType> {
        match self.activity_types.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.activity_types.contains(&ActivityType::Unknown) {
            return Err(Error::validation("activity_types must not contain Unknown"));
        }
        if self.date.is_some() && (self.until.is_some() || self.after.is_some()) {
            return Err(Error::validation(
                "date cannot be combined with until or after",
            ));
        }
        if let Some(page_size) = self.page_size {
            ensure_in_range("page_size", page_size, MAX_ACTIVITIES_PAGE_SIZE)?;
        }
        ensure_ordered(self.after, self.until)
    }
}

fn at_most_one(types: &[ActivityType]) -> bool {
    types.len() <= 1
}

/// Filters for `GET /assets`.
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Default, Serialize)]
pub struct AssetsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_class: Option<AssetClass>,
}

impl AssetsRequest {
    pub fn validate(&self) -> Result<()> {
        if self.asset_class == Some(AssetClass::Unknown) {
            return Err(Error::validation("asset_class must not be Unknown"));
        }
        if self.status == Some(AssetStatus::Unknown) {
            return Err(Error::validation("status must not be Unknown"));
        }
        Ok(())
    }
}

/// Date range for `GET /calendar`. Both ends are inclusive.
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Default, Serialize)]
pub struct CalendarRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl CalendarRequest {
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(Error::validation(format!(
                "calendar start {start} is after end {end}"
            )));
        }
        Ok(())
    }
}

/// Query for `GET /bars/{timeframe}` on the data API.
#[serde_as]
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Serialize)]
pub struct BarsRequest {
    #[serde(skip)]
    pub timeframe: TimeFrame,
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    pub symbols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

impl BarsRequest {
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(Error::validation("bars require at least one symbol"));
        }
        for symbol in &self.symbols {
            ensure_non_empty("symbol", symbol)?;
            if symbol.contains(',') {
                return Err(Error::validation(format!(
                    "symbol `{symbol}` must not contain a comma"
                )));
            }
        }
        if let Some(limit) = self.limit {
            ensure_in_range("limit", limit, MAX_BARS_LIMIT)?;
        }
        if self.start.is_some() && self.after.is_some() {
            return Err(Error::validation("start cannot be combined with after"));
        }
        if self.end.is_some() && self.until.is_some() {
            return Err(Error::validation("end cannot be combined with until"));
        }
        ensure_ordered(self.start.or(self.after), self.end.or(self.until))
    }
}

pub(crate) fn ensure_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn ensure_positive(field: &str, value: Decimal) -> Result<()> {
    if value.is_zero() || value.is_sign_negative() {
        return Err(Error::validation(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn ensure_in_range(field: &str, value: u32, max: u32) -> Result<()> {
    if value == 0 || value > max {
        return Err(Error::validation(format!(
            "{field} must be between 1 and {max}, got {value}"
        )));
    }
    Ok(())
}

fn ensure_ordered(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<()> {
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(Error::validation(format!(
            "range start {from} is after range end {to}"
        )));
    }
    Ok(())
}

fn ensure_client_order_id(id: &str) -> Result<()> {
    ensure_non_empty("client_order_id", id)?;
    if id.chars().count() > MAX_CLIENT_ORDER_ID_LEN {
        return Err(Error::validation(format!(
            "client_order_id must be at most {MAX_CLIENT_ORDER_ID_LEN} characters"
        )));
    }
    Ok(())
}

/// Parses decimal text, failing instead of rounding when it does not fit exactly.
fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str_exact(value.trim())
        .map_err(|e| Error::validation(format!("invalid {field} `{value}`: {e}")))
}
