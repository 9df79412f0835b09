use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub frontend: FrontendConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Hosted backend (auth + table API) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub url: String,
    /// Service key; admin user lookups and updates require it.
    #[serde(skip_serializing)]
    pub key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    /// Put /customers and /contracts behind the bearer guard.
    pub require_auth_for_records: bool,
}

impl FrontendConfig {
    pub fn verify_email_url(&self) -> String {
        format!("{}/auth/verify-email", self.url.trim_end_matches('/'))
    }

    pub fn reset_password_url(&self) -> String {
        format!("{}/auth/reset-password", self.url.trim_end_matches('/'))
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.provider.url = lookup("SUPABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        self.provider.key = lookup("SUPABASE_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_KEY"))?;
        if let Some(v) = lookup("PROVIDER_TIMEOUT_SECS") {
            self.provider.timeout_secs = parse("PROVIDER_TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse("PORT", &v)?;
        }

        let frontend_override = lookup("FRONTEND_URL");
        if let Some(v) = &frontend_override {
            self.frontend.url = v.trim_end_matches('/').to_string();
        }

        if let Some(v) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        } else if frontend_override.is_some() {
            self.security.cors_origins = vec![self.frontend.url.clone()];
        }
        if let Some(v) = lookup("RECORDS_REQUIRE_AUTH") {
            self.security.require_auth_for_records = parse("RECORDS_REQUIRE_AUTH", &v)?;
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            provider: ProviderConfig {
                url: String::new(),
                key: String::new(),
                timeout_secs: 30,
            },
            frontend: FrontendConfig {
                url: "http://localhost:3000".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                require_auth_for_records: false,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            provider: ProviderConfig {
                timeout_secs: 15,
                ..Self::development().provider
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string()],
                require_auth_for_records: false,
            },
            ..Self::development()
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            provider: ProviderConfig {
                timeout_secs: 10,
                ..Self::development().provider
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string()],
                require_auth_for_records: false,
            },
            ..Self::development()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
