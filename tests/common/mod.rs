#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crm_api::config::AppConfig;
use crm_api::services::report_bootstrap_failures;
use crm_api::testing::{FakeIdentityProvider, MemoryRecordStore};
use crm_api::{app, AppState};

/// The real router served on a free local port, backed by the in-memory
/// provider doubles. One server per test keeps state isolated.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub provider: Arc<FakeIdentityProvider>,
    pub store: Arc<MemoryRecordStore>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(FakeIdentityProvider::new(), &[]).await
    }

    /// Start with a specific provider double and extra environment variables.
    pub async fn start_with(provider: FakeIdentityProvider, vars: &[(&str, &str)]) -> Result<Self> {
        let mut env: Vec<(String, String)> = vec![
            ("SUPABASE_URL".into(), "http://provider.invalid".into()),
            ("SUPABASE_KEY".into(), "test-key".into()),
            ("FRONTEND_URL".into(), "http://app.test".into()),
        ];
        env.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let config = AppConfig::from_vars(|name| {
            env.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        })?;

        let provider = Arc::new(provider);
        let store = Arc::new(MemoryRecordStore::new());
        let (state, failures) = AppState::new(config, provider.clone(), store.clone());
        tokio::spawn(report_bootstrap_failures(failures));

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            provider,
            store,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register through the API and return the response `data`.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        Ok(res.json::<Value>().await?["data"].clone())
    }

    /// Log in through the API and return the response `data`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        Ok(res.json::<Value>().await?["data"].clone())
    }

    /// Create a confirmed account and return its access token.
    pub async fn signed_in(&self, email: &str) -> Result<String> {
        self.provider.create_user(email, "pw123456", "Tester");
        let data = self.login(email, "pw123456").await?;
        data["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login returned no access token")
    }
}

/// Poll `check` until it holds or the timeout passes.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

/// Assert the fault boundary's error shape and return the message.
pub fn assert_error_shape(body: &Value, status: StatusCode, path: &str) -> String {
    assert_eq!(body["statusCode"], status.as_u16(), "body: {}", body);
    assert_eq!(body["path"], path, "body: {}", body);
    assert!(body["timestamp"].is_string(), "body: {}", body);
    assert!(body["error"].is_string(), "body: {}", body);
    body["message"].as_str().unwrap_or_default().to_string()
}
