//! Wire types shared by the trading, data and Polygon endpoints.

pub mod request;
pub mod response;

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::Result;
use crate::error::Error;

pub use request::*;
pub use response::*;

pub use rust_decimal::Decimal;
pub use uuid::Uuid;

/// Parses a closed-set value from its wire text, e.g. `"buy"` into [`Side::Buy`].
fn parse_variant<T: DeserializeOwned>(name: &str, value: &str) -> Result<T> {
    T::deserialize(StrDeserializer::<ValueError>::new(value.trim()))
        .map_err(|e| Error::validation(format!("invalid {name} `{value}`: {e}")))
}

macro_rules! from_str_via_serde {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = Error;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    parse_variant($name, s)
                }
            }
        )+
    };
}

/// Like `from_str_via_serde!`, for enums whose `Unknown` fallback only exists for decoding.
macro_rules! from_str_rejecting_unknown {
    ($($ty:ident => $name:literal),+ $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = Error;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    match parse_variant($name, s)? {
                        $ty::Unknown => Err(Error::validation(format!("invalid {} `{s}`", $name))),
                        known => Ok(known),
                    }
                }
            }
        )+
    };
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    /// Decoded from order types this client cannot submit, e.g. `trailing_stop`.
    #[serde(other)]
    Unknown,
}

impl OrderType {
    #[must_use]
    pub const fn requires_limit_price(self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }

    #[must_use]
    pub const fn requires_stop_price(self) -> bool {
        matches!(self, OrderType::Stop | OrderType::StopLimit)
    }
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeInForce {
    /// Valid for the current trading day only.
    Day,
    /// Good till canceled.
    Gtc,
    /// Executes in the opening auction.
    Opg,
    /// Executes in the closing auction.
    Cls,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
    #[serde(other)]
    Unknown,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Status filter accepted when listing orders.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatusFilter {
    #[default]
    Open,
    Closed,
    All,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssetStatus {
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

/// Bar aggregation window on the data API.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "1Min", alias = "minute")]
    #[strum(serialize = "1Min")]
    Minute,
    #[serde(rename = "5Min")]
    #[strum(serialize = "5Min")]
    FiveMinutes,
    #[serde(rename = "15Min")]
    #[strum(serialize = "15Min")]
    FifteenMinutes,
    #[serde(rename = "1D", alias = "day")]
    #[strum(serialize = "1D")]
    Day,
}

/// Upstream account activity codes.
///
/// Decoding an unrecognized code yields [`ActivityType::Unknown`]; parsing one from text fails.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    /// Order fill, partial or full.
    Fill,
    /// Cash transaction.
    Trans,
    Misc,
    /// ACATS in/out, cash.
    Acatc,
    /// ACATS in/out, securities.
    Acats,
    /// Cash deposit.
    Csd,
    /// Cash receipt.
    Csr,
    /// Cash withdrawal.
    Csw,
    Div,
    Divcgl,
    Divcgs,
    Divfee,
    Divft,
    Divnra,
    Divroc,
    Divtw,
    Divtxex,
    Int,
    Intnra,
    Inttw,
    Jnl,
    Jnlc,
    Jnls,
    /// Merger/acquisition.
    Ma,
    /// Name change.
    Nc,
    Opasn,
    Opexp,
    Opxrc,
    /// Pass-through charge.
    Ptc,
    /// Pass-through rebate.
    Ptr,
    Reorg,
    /// Symbol change.
    Sc,
    Sso,
    Ssp,
    Fee,
    Cfee,
    #[serde(other)]
    Unknown,
}

impl FromStr for ActivityType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match parse_variant("activity type", &s.trim().to_ascii_uppercase())? {
            ActivityType::Unknown => Err(Error::validation(format!(
                "invalid activity type `{s}`"
            ))),
            activity => Ok(activity),
        }
    }
}

from_str_via_serde! {
    Side => "side",
    SortDirection => "direction",
    OrderStatusFilter => "order status",
    TimeFrame => "timeframe",
}

from_str_rejecting_unknown! {
    OrderType => "order type",
    TimeInForce => "time_in_force",
    AssetStatus => "asset status",
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    DoneForDay,
    Canceled,
    Expired,
    Replaced,
    PendingCancel,
    PendingReplace,
    Accepted,
    PendingNew,
    AcceptedForBidding,
    Stopped,
    Rejected,
    Suspended,
    Calculated,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether the order can no longer change server-side.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled
                | OrderStatus::Canceled
                | OrderStatus::Expired
                | OrderStatus::Replaced
                | OrderStatus::Rejected
        )
    }
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Onboarding,
    SubmissionFailed,
    Submitted,
    AccountUpdated,
    ApprovalPending,
    Active,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssetClass {
    UsEquity,
    Crypto,
    #[serde(other)]
    Unknown,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
    #[serde(other)]
    Unknown,
}

/// Side reported on trade activities.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivitySide {
    Buy,
    Sell,
    SellShort,
    #[serde(other)]
    Unknown,
}

/// Which day-trading buying power checks the account applies.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DtbpCheck {
    Both,
    Entry,
    Exit,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TradeConfirmEmail {
    All,
    None,
}

/// `HH:MM` session boundaries used by the calendar endpoint.
pub(crate) mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize as _, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
