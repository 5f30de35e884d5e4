//! scenario_missing_credentials_fail_fast
//!
//! A missing `api_key` or `app_name` fails construction with a config error
//! and no request ever reaches the endpoint.

use std::time::Duration;

use httpmock::prelude::*;

use pfx_config::ExchangeParams;
use pfx_portfolio::PortfolioApi;
use pfx_tinkoff::TinkoffClient;

#[tokio::test]
async fn no_request_is_made_without_credentials() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200);
        })
        .await;
    let endpoint = server.url("/rest");

    let cases: [&[(&str, &str)]; 3] = [
        &[("app_name", "a")],
        &[("api_key", "t.tok")],
        &[("api_key", ""), ("app_name", "a")],
    ];
    for pairs in cases {
        let mut params: ExchangeParams = pairs.iter().copied().collect();
        params.insert("api_endpoint", endpoint.clone());
        let err = TinkoffClient::from_params(&params, Duration::from_secs(1)).unwrap_err();
        assert!(err.is_config(), "{pairs:?} -> {err:?}");
    }

    assert_eq!(any.hits_async().await, 0);
}

#[tokio::test]
async fn api_key_env_indirection_is_honoured() {
    std::env::set_var("PFX_TINKOFF_TEST_TOKEN", "t.from-env");
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).header("authorization", "Bearer t.from-env");
            then.status(200).body(r#"{"accounts":[]}"#);
        })
        .await;

    let params: ExchangeParams = [
        ("api_key_env", "PFX_TINKOFF_TEST_TOKEN"),
        ("app_name", "a"),
        ("api_endpoint", server.url("/rest").as_str()),
    ]
    .into_iter()
    .collect();
    let client = TinkoffClient::from_params(&params, Duration::from_secs(5)).unwrap();

    assert!(client.list_accounts().await.unwrap().is_empty());
    mock.assert_async().await;
}
