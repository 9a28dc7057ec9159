use chrono::NaiveDate;
use reqwest::Client as ReqwestClient;
use reqwest::{Method, Request};
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::auth::Credentials;
use crate::config::Config;
use crate::error::{Error, Kind};
use crate::types::request::ensure_non_empty;
use crate::types::{
    Account, AccountActivity, AccountConfigurations, ActivitiesRequest, Asset, AssetsRequest,
    Bars, BarsRequest, Calendar, CalendarRequest, CancelOrderStatus, Clock, ClosePositionStatus,
    CreateOrderRequest, Order, OrdersRequest, Params, Position, ReplaceOrderRequest,
};

const DATA_API_VERSION: &str = "v1";
const POLYGON_API_VERSION: &str = "v1";
const POLYGON_V2: &str = "v2";
const DEFAULT_TICK_TYPE: &str = "trades";

const NO_QUERY: Option<&()> = None;
const NO_BODY: Option<&()> = None;

#[derive(Serialize)]
struct ByClientOrderId<'a> {
    client_order_id: &'a str,
}

/// Client for the trading API, the market data API and Polygon.
///
/// Configuration is fixed at construction; every call issues exactly one request and
/// no state is shared between calls, so a clone can be used from any task.
#[derive(Clone, Debug)]
pub struct Client {
    trading_url: Url,
    data_url: Url,
    polygon_url: Url,
    api_version: String,
    credentials: Credentials,
    headers: HeaderMap,
    client: ReqwestClient,
}

impl Client {
    /// Creates a client. Fails unless exactly one credential mode is configured.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_client(config, ReqwestClient::new())
    }

    /// Creates a client on top of a preconfigured HTTP client, e.g. one with timeouts.
    pub fn with_client(config: Config, client: ReqwestClient) -> Result<Self> {
        let resolved = config.resolve()?;
        let headers = resolved.credentials.headers()?;

        Ok(Self {
            trading_url: resolved.trading_url,
            data_url: resolved.data_url,
            polygon_url: resolved.polygon_url,
            api_version: resolved.api_version,
            credentials: resolved.credentials,
            headers,
            client,
        })
    }

    #[must_use]
    pub fn trading_url(&self) -> &Url {
        &self.trading_url
    }

    #[must_use]
    pub fn data_url(&self) -> &Url {
        &self.data_url
    }

    #[must_use]
    pub fn polygon_url(&self) -> &Url {
        &self.polygon_url
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // Transport

    /// Sends a request to `{trading}/{api_version}/{path}`.
    pub async fn http_request<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        self.trading(method, &split_path(path), query, body).await
    }

    /// Sends a request to `{data}/v1/{path}`.
    pub async fn data_http_request<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        self.data(method, &split_path(path), query, body).await
    }

    /// Sends a request to `{polygon}/{api_version}/{path}`, `v1` unless overridden.
    ///
    /// The key id is appended as the `apiKey` query parameter, so OAuth-only clients
    /// cannot reach Polygon.
    pub async fn polygon_http_request<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
        api_version: Option<&str>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        self.polygon(
            method,
            api_version.unwrap_or(POLYGON_API_VERSION),
            &split_path(path),
            query,
            body,
        )
        .await
    }

    // Account

    pub async fn account(&self) -> Result<Account> {
        self.trading(Method::GET, &["account"], NO_QUERY, NO_BODY)
            .await
    }

    pub async fn account_configurations(&self) -> Result<AccountConfigurations> {
        self.trading(
            Method::GET,
            &["account", "configurations"],
            NO_QUERY,
            NO_BODY,
        )
        .await
    }

    pub async fn update_account_configurations(
        &self,
        configurations: &AccountConfigurations,
    ) -> Result<AccountConfigurations> {
        self.trading(
            Method::PATCH,
            &["account", "configurations"],
            NO_QUERY,
            Some(configurations),
        )
        .await
    }

    pub async fn account_activities(
        &self,
        request: &ActivitiesRequest,
    ) -> Result<Vec<AccountActivity>> {
        request.validate()?;

        match request.single_type() {
            Some(activity_type) => {
                let activity_type = activity_type.to_string();
                self.trading(
                    Method::GET,
                    &["account", "activities", &activity_type],
                    Some(request),
                    NO_BODY,
                )
                .await
            }
            None => {
                self.trading(
                    Method::GET,
                    &["account", "activities"],
                    Some(request),
                    NO_BODY,
                )
                .await
            }
        }
    }

    // Orders

    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order> {
        request.validate()?;

        self.trading(Method::POST, &["orders"], NO_QUERY, Some(request))
            .await
    }

    pub async fn order(&self, id: Uuid) -> Result<Order> {
        let id = id.to_string();
        self.trading(Method::GET, &["orders", &id], NO_QUERY, NO_BODY)
            .await
    }

    pub async fn order_by_client_id(&self, client_order_id: &str) -> Result<Order> {
        ensure_non_empty("client_order_id", client_order_id)?;

        self.trading(
            Method::GET,
            &["orders:by_client_order_id"],
            Some(&ByClientOrderId { client_order_id }),
            NO_BODY,
        )
        .await
    }

    /// Lists orders in the order the server returns them.
    pub async fn orders(&self, request: &OrdersRequest) -> Result<Vec<Order>> {
        request.validate()?;

        self.trading(Method::GET, &["orders"], Some(request), NO_BODY)
            .await
    }

    pub async fn replace_order(&self, id: Uuid, request: &ReplaceOrderRequest) -> Result<Order> {
        request.validate()?;

        let id = id.to_string();
        self.trading(Method::PATCH, &["orders", &id], NO_QUERY, Some(request))
            .await
    }

    pub async fn cancel_order(&self, id: Uuid) -> Result<()> {
        let id = id.to_string();
        self.trading(Method::DELETE, &["orders", &id], NO_QUERY, NO_BODY)
            .await
    }

    pub async fn cancel_all_orders(&self) -> Result<Vec<CancelOrderStatus>> {
        self.trading(Method::DELETE, &["orders"], NO_QUERY, NO_BODY)
            .await
    }

    // Positions

    pub async fn position(&self, symbol: &str) -> Result<Position> {
        ensure_non_empty("symbol", symbol)?;

        self.trading(Method::GET, &["positions", symbol], NO_QUERY, NO_BODY)
            .await
    }

    pub async fn positions(&self) -> Result<Vec<Position>> {
        self.trading(Method::GET, &["positions"], NO_QUERY, NO_BODY)
            .await
    }

    /// Liquidates the position in `symbol`, returning the closing order.
    pub async fn close_position(&self, symbol: &str) -> Result<Order> {
        ensure_non_empty("symbol", symbol)?;

        self.trading(Method::DELETE, &["positions", symbol], NO_QUERY, NO_BODY)
            .await
    }

    pub async fn close_all_positions(&self) -> Result<Vec<ClosePositionStatus>> {
        self.trading(Method::DELETE, &["positions"], NO_QUERY, NO_BODY)
            .await
    }

    // Reference data

    pub async fn asset(&self, symbol: &str) -> Result<Asset> {
        ensure_non_empty("symbol", symbol)?;

        self.trading(Method::GET, &["assets", symbol], NO_QUERY, NO_BODY)
            .await
    }

    pub async fn assets(&self, request: &AssetsRequest) -> Result<Vec<Asset>> {
        request.validate()?;

        self.trading(Method::GET, &["assets"], Some(request), NO_BODY)
            .await
    }

    pub async fn calendar(&self, request: &CalendarRequest) -> Result<Vec<Calendar>> {
        request.validate()?;

        self.trading(Method::GET, &["calendar"], Some(request), NO_BODY)
            .await
    }

    pub async fn clock(&self) -> Result<Clock> {
        self.trading(Method::GET, &["clock"], NO_QUERY, NO_BODY)
            .await
    }

    // Market data

    pub async fn bars(&self, request: &BarsRequest) -> Result<Bars> {
        request.validate()?;

        let timeframe = request.timeframe.to_string();
        self.data(Method::GET, &["bars", &timeframe], Some(request), NO_BODY)
            .await
    }

    // Polygon. Payloads are passed through as opaque JSON.

    pub async fn exchanges(&self) -> Result<Value> {
        self.polygon_get(&["meta", "exchanges"], None).await
    }

    pub async fn symbol_type_map(&self) -> Result<Value> {
        self.polygon_get(&["meta", "symbol-types"], None).await
    }

    /// Condition codes for `tick_type` (`trades` unless given).
    pub async fn condition_map(&self, tick_type: Option<&str>) -> Result<Value> {
        let tick_type = tick_type.unwrap_or(DEFAULT_TICK_TYPE);
        ensure_non_empty("tick_type", tick_type)?;

        self.polygon_get(&["meta", "conditions", tick_type], None)
            .await
    }

    pub async fn symbol(&self, symbol: &str) -> Result<Value> {
        self.symbol_meta(symbol, None).await
    }

    pub async fn company(&self, symbol: &str) -> Result<Value> {
        self.symbol_meta(symbol, Some("company")).await
    }

    pub async fn analysts(&self, symbol: &str) -> Result<Value> {
        self.symbol_meta(symbol, Some("analysts")).await
    }

    pub async fn dividends(&self, symbol: &str) -> Result<Value> {
        self.symbol_meta(symbol, Some("dividends")).await
    }

    pub async fn earnings(&self, symbol: &str) -> Result<Value> {
        self.symbol_meta(symbol, Some("earnings")).await
    }

    pub async fn financials(&self, symbol: &str) -> Result<Value> {
        self.symbol_meta(symbol, Some("financials")).await
    }

    pub async fn splits(&self, symbol: &str) -> Result<Value> {
        self.symbol_meta(symbol, Some("splits")).await
    }

    pub async fn news(&self, symbol: &str) -> Result<Value> {
        self.symbol_meta(symbol, Some("news")).await
    }

    pub async fn last_trade(&self, symbol: &str) -> Result<Value> {
        ensure_non_empty("symbol", symbol)?;

        self.polygon_get(&["last", "stocks", symbol], None).await
    }

    pub async fn last_quote(&self, symbol: &str) -> Result<Value> {
        ensure_non_empty("symbol", symbol)?;

        self.polygon_get(&["last_quote", "stocks", symbol], None)
            .await
    }

    pub async fn historic_trades(
        &self,
        symbol: &str,
        date: NaiveDate,
        options: &Params,
    ) -> Result<Value> {
        ensure_non_empty("symbol", symbol)?;

        let date = date.to_string();
        self.polygon_get(&["historic", "trades", symbol, &date], Some(options))
            .await
    }

    pub async fn historic_quotes(
        &self,
        symbol: &str,
        date: NaiveDate,
        options: &Params,
    ) -> Result<Value> {
        ensure_non_empty("symbol", symbol)?;

        let date = date.to_string();
        self.polygon_get(&["historic", "quotes", symbol, &date], Some(options))
            .await
    }

    /// Aggregates of `size` (e.g. `minute`, `day`) for `symbol`.
    pub async fn historic_aggregates(
        &self,
        size: &str,
        symbol: &str,
        options: &Params,
    ) -> Result<Value> {
        ensure_non_empty("size", size)?;
        ensure_non_empty("symbol", symbol)?;

        self.polygon_get(&["historic", "agg", size, symbol], Some(options))
            .await
    }

    pub async fn historic_aggregates_v2(
        &self,
        symbol: &str,
        multiplier: u32,
        size: &str,
        from: NaiveDate,
        to: NaiveDate,
        options: &Params,
    ) -> Result<Value> {
        ensure_non_empty("symbol", symbol)?;
        ensure_non_empty("size", size)?;
        if multiplier == 0 {
            return Err(Error::validation("multiplier must be positive"));
        }
        if from > to {
            return Err(Error::validation(format!(
                "aggregate range start {from} is after end {to}"
            )));
        }

        let multiplier = multiplier.to_string();
        let (from, to) = (from.to_string(), to.to_string());
        self.polygon(
            Method::GET,
            POLYGON_V2,
            &["aggs", "ticker", symbol, "range", &multiplier, size, &from, &to],
            Some(options),
            NO_BODY,
        )
        .await
    }

    async fn symbol_meta(&self, symbol: &str, resource: Option<&str>) -> Result<Value> {
        ensure_non_empty("symbol", symbol)?;

        match resource {
            Some(resource) => {
                self.polygon_get(&["meta", "symbols", symbol, resource], None)
                    .await
            }
            None => self.polygon_get(&["meta", "symbols", symbol], None).await,
        }
    }

    async fn polygon_get(&self, segments: &[&str], options: Option<&Params>) -> Result<Value> {
        self.polygon(
            Method::GET,
            POLYGON_API_VERSION,
            segments,
            options,
            NO_BODY,
        )
        .await
    }

    async fn trading<T, Q, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let request = self.trading_request(method, segments, query, body)?;
        self.send(request).await
    }

    fn trading_request<Q, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Request>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = endpoint(&self.trading_url, &self.api_version, segments)?;
        self.build(method, with_query(url, query)?, body)
    }

    async fn data<T, Q, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let request = self.data_request(method, segments, query, body)?;
        self.send(request).await
    }

    fn data_request<Q, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Request>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = endpoint(&self.data_url, DATA_API_VERSION, segments)?;
        self.build(method, with_query(url, query)?, body)
    }

    async fn polygon<T, Q, B>(
        &self,
        method: Method,
        api_version: &str,
        segments: &[&str],
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let key_id = self.credentials.key_id().ok_or_else(|| {
            Error::validation("polygon requests require key_id/secret_key credentials")
        })?;

        let url = endpoint(&self.polygon_url, api_version, segments)?;
        let mut url = with_query(url, query)?;
        url.query_pairs_mut().append_pair("apiKey", key_id);
        let request = self.build(method, url, body)?;
        self.send(request).await
    }

    fn build<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Request> {
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
            .build()
            .map_err(|e| Error::with_source(Kind::Internal, e))
    }

    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        crate::request::<T>(&self.client, request, Some(self.headers.clone())).await
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Appends `version` and `segments` to `base`, percent-encoding each segment.
fn endpoint(base: &Url, version: &str, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::validation(format!("`{base}` cannot be used as a base URL")))?
        .pop_if_empty()
        .push(version)
        .extend(segments);
    Ok(url)
}

fn with_query<Q: Serialize + ?Sized>(mut url: Url, query: Option<&Q>) -> Result<Url> {
    if let Some(query) = query {
        let encoded = serde_html_form::to_string(query)?;
        if !encoded.is_empty() {
            url.set_query(Some(&encoded));
        }
    }
    Ok(url)
}
