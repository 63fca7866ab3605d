//! Token acquisition and caching against a mock PayPal API.

use chrono::{TimeZone, Utc};
use paypal_client::{ApiRequest, ManualClock, PayPalClient, PayPalConfig};
use paypal_core::PayPalError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/v1/oauth2/token";

fn token_body(token: &str) -> serde_json::Value {
    json!({
        "scope": "https://uri.paypal.com/services/payments/payment",
        "access_token": token,
        "token_type": "Bearer",
        "app_id": "APP-80W284485P519543T",
        "expires_in": 3600,
        "nonce": "2024-05-01T12:00:00Zabc"
    })
}

async fn token_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == TOKEN_PATH)
        .count()
}

fn client_for(server: &MockServer, clock: &ManualClock) -> PayPalClient {
    let config = PayPalConfig::sandbox("abc", "xyz").with_api_base_url(server.uri());
    PayPalClient::with_clock(config, Arc::new(clock.clone())).unwrap()
}

#[tokio::test]
async fn test_token_cached_until_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(query_param("grant_type", "client_credentials"))
        .and(header("authorization", "Basic YWJjOnh5eg=="))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok1")))
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    let client = client_for(&server, &clock);
    let authority = client.gateway().token_authority();

    // t = 0: miss
    assert_eq!(authority.access_token().await.unwrap(), "tok1");
    assert_eq!(token_requests(&server).await, 1);
    assert_eq!(
        authority.cached_expiry().await,
        Some(start + chrono::Duration::seconds(3600))
    );

    // t = +10s: hit
    clock.advance(Duration::from_secs(10));
    assert_eq!(authority.access_token().await.unwrap(), "tok1");
    assert_eq!(token_requests(&server).await, 1);

    // t = +3601s: expired, refetch
    clock.advance(Duration::from_secs(3591));
    authority.access_token().await.unwrap();
    assert_eq!(token_requests(&server).await, 2);
    assert_eq!(
        authority.cached_expiry().await,
        Some(start + chrono::Duration::seconds(3601 + 3600))
    );
}

#[tokio::test]
async fn test_token_at_exact_expiry_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok1")))
        .mount(&server)
        .await;

    let clock = ManualClock::starting_now();
    let client = client_for(&server, &clock);
    let authority = client.gateway().token_authority();

    authority.access_token().await.unwrap();
    clock.advance(Duration::from_secs(3600));
    authority.access_token().await.unwrap();

    assert_eq!(token_requests(&server).await, 2);
}

#[tokio::test]
async fn test_refresh_margin_refreshes_early() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok1")))
        .mount(&server)
        .await;

    let clock = ManualClock::starting_now();
    let config = PayPalConfig::sandbox("abc", "xyz")
        .with_api_base_url(server.uri())
        .with_token_refresh_margin(Duration::from_secs(60));
    let client = PayPalClient::with_clock(config, Arc::new(clock.clone())).unwrap();
    let authority = client.gateway().token_authority();

    authority.access_token().await.unwrap();
    clock.advance(Duration::from_secs(3540));
    authority.access_token().await.unwrap();

    assert_eq!(token_requests(&server).await, 2);
}

#[tokio::test]
async fn test_oversized_refresh_margin_always_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok1")))
        .expect(2)
        .mount(&server)
        .await;

    let clock = ManualClock::starting_now();
    let config = PayPalConfig::sandbox("abc", "xyz")
        .with_api_base_url(server.uri())
        .with_token_refresh_margin(Duration::from_secs(1 << 50));
    let client = PayPalClient::with_clock(config, Arc::new(clock.clone())).unwrap();
    let authority = client.gateway().token_authority();

    assert_eq!(authority.access_token().await.unwrap(), "tok1");
    assert_eq!(authority.access_token().await.unwrap(), "tok1");
}

#[tokio::test]
async fn test_error_payload_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Client Authentication failed"
        })))
        .mount(&server)
        .await;

    let clock = ManualClock::starting_now();
    let client = client_for(&server, &clock);
    let authority = client.gateway().token_authority();

    for _ in 0..2 {
        match authority.access_token().await {
            Err(PayPalError::Authentication { error, .. }) => assert_eq!(error, "invalid_client"),
            other => panic!("expected authentication error, got {:?}", other),
        }
    }

    assert_eq!(token_requests(&server).await, 2);
    assert_eq!(authority.cached_expiry().await, None);
}

#[tokio::test]
async fn test_api_call_fails_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "invalid_client" })))
        .mount(&server)
        .await;

    let client = client_for(&server, &ManualClock::starting_now());
    let result = client
        .request::<serde_json::Value>(ApiRequest::get("/v2/checkout/orders/5O190127TN364715T"))
        .await;

    assert!(matches!(result, Err(PayPalError::Authentication { .. })));
    // Never reached the orders endpoint
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|request| request.url.path() == TOKEN_PATH));
}

#[tokio::test]
async fn test_concurrent_misses_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("tok1"))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, &ManualClock::starting_now());
    let authority = client.gateway().token_authority();

    let (a, b, c) = tokio::join!(
        authority.access_token(),
        authority.access_token(),
        authority.access_token()
    );

    assert_eq!(a.unwrap(), "tok1");
    assert_eq!(b.unwrap(), "tok1");
    assert_eq!(c.unwrap(), "tok1");
    assert_eq!(token_requests(&server).await, 1);
}

#[tokio::test]
async fn test_rejected_bearer_drops_cached_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok1")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/checkout/orders/5O190127TN364715T"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_token",
            "error_description": "Token signature verification failed"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, &ManualClock::starting_now());
    let result = client.get_order("5O190127TN364715T").await.unwrap();

    assert_eq!(result.remote_error().unwrap().name, "invalid_token");
    assert_eq!(client.gateway().token_authority().cached_expiry().await, None);
}

#[tokio::test]
async fn test_deadline_covers_token_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("tok1"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, &ManualClock::starting_now());
    let deadline = Duration::from_millis(100);
    let result = client
        .request::<serde_json::Value>(
            ApiRequest::get("/v2/checkout/orders/5O190127TN364715T").timeout(deadline),
        )
        .await;

    match result {
        Err(PayPalError::Timeout(elapsed)) => assert_eq!(elapsed, deadline),
        other => panic!("expected timeout, got {:?}", other),
    }
}
