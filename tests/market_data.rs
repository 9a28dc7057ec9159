mod common;

use alpaca_trade_api::error::Kind;
use alpaca_trade_api::types::{BarsRequest, Params, TimeFrame};
use alpaca_trade_api::{Client, Config};
use chrono::NaiveDate;
use futures_util::future::join;
use httpmock::prelude::*;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{KEY_ID, SECRET_KEY, account_json, client, server_url};

fn bars_json() -> serde_json::Value {
    json!({
        "AAPL": [
            { "t": 1_544_129_220, "o": 172.26, "h": 172.3, "l": 172.16, "c": 172.18, "v": 3892 },
            { "t": 1_544_129_280, "o": 172.18, "h": 172.4, "l": 172.1, "c": 172.35, "v": 1200 }
        ],
        "MSFT": []
    })
}

#[tokio::test]
async fn paper_mode_only_moves_the_trading_host() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/bars/1D")
                .query_param("symbols", "AAPL,MSFT")
                .query_param("limit", "2")
                .header("apca-api-key-id", KEY_ID);
            then.status(200).json_body(bars_json());
        })
        .await;

    let client = Client::new(
        Config::builder()
            .data_base_url(server_url(&server))
            .key_id(KEY_ID)
            .secret_key(SECRET_KEY.to_owned())
            .paper(true)
            .build(),
    )?;

    assert_eq!(client.trading_url().as_str(), "https://paper-api.alpaca.markets/");
    assert_eq!(client.data_url(), &server_url(&server));

    let bars = client
        .bars(
            &BarsRequest::builder()
                .timeframe(TimeFrame::Day)
                .symbols(vec!["AAPL".to_owned(), "MSFT".to_owned()])
                .limit(2)
                .build(),
        )
        .await?;

    mock.assert_async().await;
    assert_eq!(bars["AAPL"].len(), 2);
    assert_eq!(bars["AAPL"][1].close, dec!(172.35));
    assert!(bars["MSFT"].is_empty());
    Ok(())
}

#[tokio::test]
async fn live_mode_uses_the_live_trading_host() -> anyhow::Result<()> {
    let client = Client::new(
        Config::builder()
            .key_id(KEY_ID)
            .secret_key(SECRET_KEY.to_owned())
            .build(),
    )?;

    assert_eq!(client.trading_url().as_str(), "https://api.alpaca.markets/");
    assert_eq!(client.data_url().as_str(), "https://data.alpaca.markets/");
    assert_eq!(client.polygon_url().as_str(), "https://api.polygon.io/");
    Ok(())
}

#[test]
fn construction_requires_exactly_one_credential_mode() {
    let none = Client::new(Config::default()).unwrap_err();
    assert_eq!(none.kind(), Kind::Validation);

    let both = Client::new(
        Config::builder()
            .key_id(KEY_ID)
            .secret_key(SECRET_KEY.to_owned())
            .oauth("token".to_owned())
            .build(),
    )
    .unwrap_err();
    assert_eq!(both.kind(), Kind::Validation);
}

#[tokio::test]
async fn bars_without_symbols_never_reach_the_server() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(bars_json());
        })
        .await;

    let err = client(&server)
        .bars(
            &BarsRequest::builder()
                .timeframe(TimeFrame::Minute)
                .symbols(Vec::new())
                .build(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Validation);
    mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn polygon_requests_carry_the_key_id() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let company = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/meta/symbols/AAPL/company")
                .query_param("apiKey", KEY_ID);
            then.status(200)
                .json_body(json!({ "symbol": "AAPL", "name": "Apple Inc.", "employees": 132_000 }));
        })
        .await;
    let conditions = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/meta/conditions/trades")
                .query_param("apiKey", KEY_ID);
            then.status(200).json_body(json!({ "1": "Regular" }));
        })
        .await;

    let client = client(&server);
    let details = client.company("AAPL").await?;
    let map = client.condition_map(None).await?;

    company.assert_async().await;
    conditions.assert_async().await;
    assert_eq!(details["name"], "Apple Inc.");
    assert_eq!(map["1"], "Regular");
    Ok(())
}

#[tokio::test]
async fn polygon_options_pass_through_untouched() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/aggs/ticker/AAPL/range/5/minute/2019-01-01/2019-01-02")
                .query_param("unadjusted", "true")
                .query_param("apiKey", KEY_ID);
            then.status(200)
                .json_body(json!({ "ticker": "AAPL", "results": [] }));
        })
        .await;

    let mut options = Params::new();
    options.insert("unadjusted".to_owned(), "true".to_owned());
    let aggregates = client(&server)
        .historic_aggregates_v2(
            "AAPL",
            5,
            "minute",
            NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2019, 1, 2).expect("valid date"),
            &options,
        )
        .await?;

    mock.assert_async().await;
    assert_eq!(aggregates["ticker"], "AAPL");
    Ok(())
}

#[tokio::test]
async fn polygon_errors_surface_as_rejections() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/last/stocks/AAPL");
            then.status(401)
                .json_body(json!({ "status": "ERROR", "error": "Unknown API Key" }));
        })
        .await;

    let err = client(&server).last_trade("AAPL").await.unwrap_err();

    assert_eq!(err.kind(), Kind::Rejected);
    assert!(err.to_string().contains("Unknown API Key"));
    Ok(())
}

#[tokio::test]
async fn polygon_needs_a_key_pair() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = Client::new(
        Config::builder()
            .polygon_base_url(server_url(&server))
            .oauth("token".to_owned())
            .build(),
    )?;
    let err = client.exchanges().await.unwrap_err();

    assert_eq!(err.kind(), Kind::Validation);
    mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn concurrent_calls_are_not_serialized() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let account = server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/account");
            then.status(200)
                .json_body(account_json())
                .delay(std::time::Duration::from_millis(50));
        })
        .await;
    let bars = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/bars/1Min");
            then.status(200).json_body(bars_json());
        })
        .await;

    let client = client(&server);
    let request = BarsRequest::builder()
        .timeframe(TimeFrame::Minute)
        .symbols(vec!["AAPL".to_owned()])
        .build();
    let (account_result, bars_result) = join(client.account(), client.bars(&request)).await;

    account_result?;
    bars_result?;
    account.assert_async().await;
    bars.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn raw_transport_reaches_arbitrary_paths() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/watchlists")
                .header("apca-api-secret-key", SECRET_KEY);
            then.status(200).json_body(json!([{ "name": "tech" }]));
        })
        .await;

    let lists: serde_json::Value = client(&server)
        .http_request(reqwest::Method::GET, "/watchlists", None::<&()>, None::<&()>)
        .await?;

    mock.assert_async().await;
    assert_eq!(lists[0]["name"], "tech");
    Ok(())
}
