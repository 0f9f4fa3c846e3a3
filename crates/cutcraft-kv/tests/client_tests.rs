//! HTTP-level tests for the record-store client against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cutcraft_kv::{KvClient, KvConfig, KvError, RetryConfig};

fn test_client(base_url: &str) -> KvClient {
    KvClient::new(KvConfig {
        base_url: base_url.to_string(),
        service_key: "test-key".to_string(),
        table: "kv_store".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
    })
    .unwrap()
}

#[tokio::test]
async fn get_returns_stored_value() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/kv_store"))
        .and(query_param("select", "value"))
        .and(query_param("key", "eq.user:u1"))
        .and(header("apikey", "test-key"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "value": { "plan": "free" } }])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let value = client.get("user:u1").await.unwrap();
    assert_eq!(value, Some(json!({ "plan": "free" })));
}

#[tokio::test]
async fn get_absent_key_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/kv_store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.get("user:absent").await.unwrap(), None);
}

#[tokio::test]
async fn set_upserts_one_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/kv_store"))
        .and(query_param("on_conflict", "key"))
        .and(header("Prefer", "resolution=merge-duplicates,return=minimal"))
        .and(body_json(json!([{
            "key": "user:u1",
            "value": { "plan": "pro" }
        }])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.set("user:u1", &json!({ "plan": "pro" })).await.unwrap();
}

#[tokio::test]
async fn get_by_prefix_collects_values() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/kv_store"))
        .and(query_param("select", "value"))
        .and(query_param("key", "like.user_video:u1:*"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([
                { "value": "video-a" },
                { "value": "video-b" }
            ])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let values = client.get_by_prefix("user_video:u1:").await.unwrap();
    assert_eq!(values, vec![json!("video-a"), json!("video-b")]);
}

#[tokio::test]
async fn server_errors_are_retried_until_exhausted() {
    let server = MockServer::start().await;

    // max_retries = 2, so the client attempts three times in total.
    Mock::given(method("GET"))
        .and(path("/rest/v1/kv_store"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get("user:u1").await.unwrap_err();
    assert!(matches!(err, KvError::ServerError(503, _)));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/kv_store"))
        .respond_with(ResponseTemplate::new(400).set_body_string("malformed filter"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get("user:u1").await.unwrap_err();
    assert!(matches!(err, KvError::RequestFailed(_)));
}

#[tokio::test]
async fn rate_limit_surfaces_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/kv_store"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_string("slow down"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get("user:u1").await.unwrap_err();
    assert!(matches!(err, KvError::RateLimited(0)));
}

#[tokio::test]
async fn retry_recovers_after_transient_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/kv_store"))
        .respond_with(ResponseTemplate::new(500).set_body_string("hiccup"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/kv_store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "value": 42 }])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.get("user:u1").await.unwrap(), Some(json!(42)));
}
