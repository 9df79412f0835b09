mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{assert_error_shape, TestServer};

#[tokio::test]
async fn missing_and_malformed_headers_are_rejected_alike() -> Result<()> {
    let server = TestServer::start().await?;

    let missing = server.client.get(server.url("/auth/profile")).send().await?;
    let basic = server
        .client
        .get(server.url("/auth/profile"))
        .header("authorization", "Basic dXNlcjpwdw==")
        .send()
        .await?;

    let mut messages = Vec::new();
    for res in [missing, basic] {
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await?;
        messages.push(assert_error_shape(&body, StatusCode::UNAUTHORIZED, "/auth/profile"));
    }
    assert_eq!(messages[0], "Token required");
    assert_eq!(messages[0], messages[1]);
    Ok(())
}

#[tokio::test]
async fn unknown_tokens_are_invalid() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/user-settings"))
        .bearer_auth("not-a-real-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(assert_error_shape(&body, StatusCode::UNAUTHORIZED, "/user-settings"), "Invalid token");
    Ok(())
}

#[tokio::test]
async fn profile_read_and_partial_update() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.signed_in("a@x.com").await?;

    let res = server
        .client
        .get(server.url("/auth/profile"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["name"], "Tester");

    let res = server
        .client
        .put(server.url("/auth/profile"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Renamed" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Renamed");

    // Name change leaves the password alone.
    server.login("a@x.com", "pw123456").await?;

    let res = server
        .client
        .put(server.url("/auth/profile"))
        .bearer_auth(&token)
        .json(&json!({ "password": "123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn provider_outage_is_a_gateway_error() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.signed_in("a@x.com").await?;
    server.provider.set_unavailable(true);

    let res = server
        .client
        .get(server.url("/auth/profile"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await?;
    assert_error_shape(&body, StatusCode::BAD_GATEWAY, "/auth/profile");

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["status"], "ok");

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "success");
    assert!(body["data"]["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_routes_use_the_error_shape() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/nope?x=1")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(assert_error_shape(&body, StatusCode::NOT_FOUND, "/nope"), "Cannot GET /nope");
    Ok(())
}

#[tokio::test]
async fn unsupported_methods_use_the_error_shape() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .patch(server.url("/customers/1"))
        .json(&json!({ "name": "x" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(
        assert_error_shape(&body, StatusCode::NOT_FOUND, "/customers/1"),
        "Cannot PATCH /customers/1"
    );
    Ok(())
}
