//! reqwest client for a hosted Supabase project.
//!
//! Auth calls go to `/auth/v1/*` (GoTrue), table calls to `/rest/v1/<table>`
//! (PostgREST). The configured key is sent as `apikey` and as the default
//! bearer credential; calls made on behalf of a user override the bearer.

mod auth;
mod rest;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::ProviderError;
use crate::config::ProviderConfig;

const AUTH_PREFIX: [&str; 2] = ["auth", "v1"];
const REST_PREFIX: [&str; 2] = ["rest", "v1"];

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SupabaseClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| ProviderError::Decode(format!("invalid provider url '{}': {}", config.url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::Decode(format!("invalid provider url '{}'", config.url)));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.key)
            .map_err(|_| ProviderError::Decode("provider key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|_| ProviderError::Decode("provider key is not a valid header value".to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub(crate) fn auth_url(&self, segments: &[&str]) -> Url {
        self.endpoint(&AUTH_PREFIX, segments)
    }

    pub(crate) fn rest_url(&self, table: &str) -> Url {
        self.endpoint(&REST_PREFIX, &[table])
    }

    fn endpoint(&self, prefix: &[&str], segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // new() rejects cannot-be-a-base urls, so segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(prefix).extend(segments);
        }
        url
    }

    /// Send and decode a JSON answer.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = Self::check(request.send().await?).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Send and discard the answer body.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ProviderError> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn check(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = match error.message() {
            Some(message) => message,
            None if status.is_server_error() => return Err(ProviderError::Failed { status: status.as_u16() }),
            None => status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        };

        Err(ProviderError::rejected(status.as_u16(), error.code(), message))
    }
}

/// Union of the GoTrue and PostgREST error bodies.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn code(&self) -> Option<String> {
        if let Some(code) = &self.error_code {
            return Some(code.clone());
        }
        // GoTrue puts the HTTP status in `code`; PostgREST puts its own code there
        if let Some(Value::String(code)) = &self.code {
            return Some(code.clone());
        }
        self.error.clone()
    }

    fn message(&self) -> Option<String> {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }
}
