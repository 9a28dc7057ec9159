//! Typed async client for the Alpaca trading API, its market data API and the
//! Polygon reference/market data endpoints.
//!
//! ```no_run
//! use alpaca_trade_api::types::{OrderStatusFilter, OrdersRequest};
//! use alpaca_trade_api::{Client, Config};
//!
//! # async fn run() -> alpaca_trade_api::Result<()> {
//! let client = Client::new(Config::from_env()?)?;
//! let account = client.account().await?;
//! let open = client
//!     .orders(&OrdersRequest::builder().status(OrderStatusFilter::Open).limit(50).build())
//!     .await?;
//! println!("{} open orders, buying power {}", open.len(), account.buying_power);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

use reqwest::Client as ReqwestClient;
use reqwest::Request;
use reqwest::{Method, StatusCode};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub use client::Client;
pub use config::Config;
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error body shapes returned by the trading API (`code`/`message`) and Polygon (`error`).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Executes `request` and decodes a successful JSON body into `T`.
///
/// Empty 2xx bodies decode as `null`, so `()` and `Option<_>` are valid targets.
pub(crate) async fn request<T: DeserializeOwned>(
    client: &ReqwestClient,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<T> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    if let Some(headers) = headers {
        request.headers_mut().extend(headers);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(%method, url = %request.url(), "sending request");

    let response = client.execute(request).await.map_err(Error::transport)?;
    let status_code = response.status();

    if !status_code.is_success() {
        let body = response.text().await;
        return Err(rejection(status_code, method, path, body));
    }

    let body = response.text().await.map_err(Error::transport)?;
    decode(&body)
}

/// Builds a [`error::Kind::Rejected`] error from a non-2xx response.
///
/// The status is kept even when the body could not be read; the read failure becomes the message.
fn rejection<E: std::fmt::Display>(
    status_code: StatusCode,
    method: Method,
    path: String,
    body: std::result::Result<String, E>,
) -> Error {
    let (code, message) = match body {
        Ok(body) => {
            let parsed = serde_json::from_str::<ErrorBody>(&body).unwrap_or_default();
            (parsed.code, parsed.message.or(parsed.error).unwrap_or(body))
        }
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(%method, %path, %status_code, error = %e, "failed to read rejection body");

            (None, format!("failed to read response body: {e}"))
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(%method, %path, %status_code, %message, "request rejected");

    Error::rejected(status_code, method, path, code, message)
}

#[cfg(not(feature = "tracing"))]
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}

#[cfg(feature = "tracing")]
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    let mut unknown = Vec::new();
    let mut de = serde_json::Deserializer::from_str(body);
    let value: T = serde_path_to_error::deserialize(serde_ignored::Deserializer::new(
        &mut de,
        &mut |path: serde_ignored::Path<'_>| unknown.push(path.to_string()),
    ))?;
    de.end()?;

    for field in unknown {
        tracing::trace!(
            %field,
            target_type = std::any::type_name::<T>(),
            "ignored unknown response field"
        );
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bodies_decode_as_null() {
        decode::<()>("").unwrap();
        assert_eq!(decode::<Option<u8>>("  ").unwrap(), None);
    }

    #[test]
    fn undecodable_bodies_are_internal_errors() {
        let err = decode::<Vec<u8>>("{\"not\":\"a list\"}").unwrap_err();

        assert_eq!(err.kind(), error::Kind::Internal);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let err = decode::<Vec<u8>>("[1, 2] trailing").unwrap_err();

        assert_eq!(err.kind(), error::Kind::Internal);
    }

    #[test]
    fn rejection_prefers_message_then_error_then_body() {
        let rejected = |body: &str| {
            let err = rejection::<String>(
                StatusCode::UNPROCESSABLE_ENTITY,
                Method::POST,
                "/v2/orders".to_owned(),
                Ok(body.to_owned()),
            );
            err.downcast_ref::<error::Rejected>().cloned().unwrap()
        };

        let alpaca = rejected(r#"{"code":40010001,"message":"qty must be > 0"}"#);
        assert_eq!(alpaca.code, Some(40_010_001));
        assert_eq!(alpaca.message, "qty must be > 0");
        assert_eq!(rejected(r#"{"error":"Unknown API Key"}"#).message, "Unknown API Key");
        assert_eq!(rejected("bad gateway").message, "bad gateway");
    }

    #[test]
    fn unreadable_rejection_body_keeps_status() {
        let err = rejection(
            StatusCode::SERVICE_UNAVAILABLE,
            Method::GET,
            "/v2/account".to_owned(),
            Err("connection reset by peer"),
        );

        assert_eq!(err.kind(), error::Kind::Rejected);
        let rejected = err.downcast_ref::<error::Rejected>().unwrap();
        assert_eq!(rejected.status_code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(rejected.code, None);
        assert_eq!(
            rejected.message,
            "failed to read response body: connection reset by peer"
        );
    }

    #[test]
    fn error_bodies_tolerate_either_shape() {
        let alpaca: ErrorBody =
            serde_json::from_str(r#"{"code":40310000,"message":"insufficient buying power"}"#)
                .unwrap();
        assert_eq!(alpaca.code, Some(40_310_000));
        assert_eq!(alpaca.message.as_deref(), Some("insufficient buying power"));

        let polygon: ErrorBody =
            serde_json::from_str(r#"{"status":"ERROR","error":"Unknown API Key"}"#).unwrap();
        assert_eq!(polygon.error.as_deref(), Some("Unknown API Key"));
    }
}
