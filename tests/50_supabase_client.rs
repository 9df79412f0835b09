use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crm_api::config::ProviderConfig;
use crm_api::provider::supabase::SupabaseClient;
use crm_api::provider::{Filter, IdentityProvider, ProviderErrorKind, RecordStore, SignUp};

/// One captured upstream request: path, query and the headers we care about.
#[derive(Debug, Clone)]
struct Seen {
    path: &'static str,
    query: HashMap<String, String>,
    apikey: Option<String>,
    authorization: Option<String>,
    prefer: Option<String>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn record(log: &Log, path: &'static str, headers: &HeaderMap, query: HashMap<String, String>) {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    log.lock().unwrap().push(Seen {
        path,
        query,
        apikey: header("apikey"),
        authorization: header("authorization"),
        prefer: header("prefer"),
    });
}

fn user(id: &str, email: &str, identities: Value) -> Value {
    json!({
        "id": id,
        "email": email,
        "user_metadata": { "name": "Ann" },
        "created_at": "2024-01-01T00:00:00Z",
        "identities": identities
    })
}

async fn signup(
    State(log): State<Log>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&log, "signup", &headers, query);
    match body["email"].as_str() {
        Some("exists@x.com") => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "code": 422, "error_code": "user_already_exists", "msg": "User already registered" })),
        ),
        Some("hidden@x.com") => (StatusCode::OK, Json(user("u-0", "hidden@x.com", json!([])))),
        Some(email) => (StatusCode::OK, Json(user("u-1", email, json!([{ "provider": "email" }])))),
        None => (StatusCode::BAD_REQUEST, Json(json!({ "msg": "missing email" }))),
    }
}

async fn token(
    State(log): State<Log>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&log, "token", &headers, query);
    if body["password"] == "pw123456" {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": "user-token",
                "refresh_token": "refresh-1",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": user("u-1", "a@x.com", json!([{ "provider": "email" }]))
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })),
        )
    }
}

async fn current_user(State(log): State<Log>, headers: HeaderMap) -> impl IntoResponse {
    record(&log, "user", &headers, HashMap::new());
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer user-token") => (StatusCode::OK, Json(user("u-1", "a@x.com", json!([])))),
        _ => (
            StatusCode::FORBIDDEN,
            Json(json!({ "code": 403, "error_code": "bad_jwt", "msg": "invalid JWT" })),
        ),
    }
}

async fn customers_select(
    State(log): State<Log>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record(&log, "customers_select", &headers, query);
    Json(json!([{ "id": 1, "name": "Kim" }]))
}

async fn customers_insert(State(log): State<Log>, headers: HeaderMap, Json(mut row): Json<Value>) -> Json<Value> {
    record(&log, "customers_insert", &headers, HashMap::new());
    row["id"] = json!(2);
    Json(json!([row]))
}

async fn broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn mailer_down() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "code": 500, "error_code": "unexpected_failure", "msg": "Error sending confirmation email" })),
    )
}

async fn single_missing() -> impl IntoResponse {
    (
        StatusCode::NOT_ACCEPTABLE,
        Json(json!({ "code": "PGRST116", "message": "JSON object requested, multiple (or no) rows returned" })),
    )
}

async fn start_stub() -> Result<(SupabaseClient, Log)> {
    let log: Log = Arc::default();
    let router = Router::new()
        .route("/auth/v1/signup", post(signup))
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/user", get(current_user))
        .route("/auth/v1/health", get(|| async { Json(json!({ "name": "GoTrue" })) }))
        .route("/rest/v1/customers", get(customers_select).post(customers_insert))
        .route("/rest/v1/broken", get(broken))
        .route("/rest/v1/mailer", get(mailer_down))
        .route("/rest/v1/single", get(single_missing))
        .with_state(log.clone());

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let client = SupabaseClient::new(&ProviderConfig {
        url: format!("http://127.0.0.1:{}", port),
        key: "service-key".to_string(),
        timeout_secs: 5,
    })?;
    Ok((client, log))
}

fn last(log: &Log) -> Seen {
    log.lock().unwrap().last().cloned().expect("no upstream request recorded")
}

#[tokio::test]
async fn sign_up_sends_redirect_and_service_key() -> Result<()> {
    let (client, log) = start_stub().await?;

    let result = client
        .sign_up(SignUp {
            email: "a@x.com",
            password: "pw123456",
            display_name: "Ann",
            redirect_to: "http://app.test/auth/verify-email",
        })
        .await?;
    assert!(result.session.is_none());
    assert_eq!(result.user.display_name().as_deref(), Some("Ann"));

    let seen = last(&log);
    assert_eq!(seen.path, "signup");
    assert_eq!(seen.query["redirect_to"], "http://app.test/auth/verify-email");
    assert_eq!(seen.apikey.as_deref(), Some("service-key"));
    assert_eq!(seen.authorization.as_deref(), Some("Bearer service-key"));
    Ok(())
}

#[tokio::test]
async fn existing_accounts_classify_as_already_registered() -> Result<()> {
    let (client, _log) = start_stub().await?;

    for email in ["exists@x.com", "hidden@x.com"] {
        let err = client
            .sign_up(SignUp {
                email,
                password: "pw123456",
                display_name: "Ann",
                redirect_to: "http://app.test/auth/verify-email",
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::AlreadyRegistered, "{}", email);
    }
    Ok(())
}

#[tokio::test]
async fn password_grant_fills_in_expiry() -> Result<()> {
    let (client, log) = start_stub().await?;

    let session = client.sign_in_with_password("a@x.com", "pw123456").await?;
    assert_eq!(session.access_token, "user-token");
    let expires_at = session.expires_at.unwrap_or_default();
    assert!((expires_at - chrono::Utc::now().timestamp() - 3600).abs() <= 5);
    assert_eq!(last(&log).query["grant_type"], "password");

    let err = client.sign_in_with_password("a@x.com", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ProviderErrorKind::InvalidCredentials);
    assert_eq!(err.message(), "Invalid login credentials");
    Ok(())
}

#[tokio::test]
async fn user_lookup_uses_the_callers_token() -> Result<()> {
    let (client, log) = start_stub().await?;

    let user = client.get_user("user-token").await?;
    assert_eq!(user.id, "u-1");
    let seen = last(&log);
    assert_eq!(seen.path, "user");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer user-token"));
    assert_eq!(seen.apikey.as_deref(), Some("service-key"));

    let err = client.get_user("forged").await.unwrap_err();
    assert_eq!(err.kind(), ProviderErrorKind::InvalidToken);

    client.ping().await?;
    Ok(())
}

#[tokio::test]
async fn table_calls_use_postgrest_conventions() -> Result<()> {
    let (client, log) = start_stub().await?;

    let rows = client.select("customers", &Filter::by_id("1")).await?;
    assert_eq!(rows.len(), 1);
    let seen = last(&log);
    assert_eq!(seen.path, "customers_select");
    assert_eq!(seen.query["id"], "eq.1");
    assert_eq!(seen.query["select"], "*");

    let row = client.insert("customers", json!({ "name": "Lee" })).await?;
    assert_eq!(row["id"], 2);
    assert_eq!(row["name"], "Lee");
    assert_eq!(last(&log).prefer.as_deref(), Some("return=representation"));
    Ok(())
}

#[tokio::test]
async fn upstream_failures_classify() -> Result<()> {
    let (client, _log) = start_stub().await?;

    let err = client.select("broken", &Filter::all()).await.unwrap_err();
    assert_eq!(err.kind(), ProviderErrorKind::Unavailable);

    // A 5xx with a provider error body is a rejection, not an outage
    let err = client.select("mailer", &Filter::all()).await.unwrap_err();
    assert_eq!(err.kind(), ProviderErrorKind::Rejected);
    assert_eq!(err.message(), "Error sending confirmation email");

    let err = client.select("single", &Filter::all()).await.unwrap_err();
    assert_eq!(err.kind(), ProviderErrorKind::NotFound);

    let err = client.select("no_such_route", &Filter::all()).await.unwrap_err();
    assert_eq!(err.kind(), ProviderErrorKind::NotFound);
    Ok(())
}
