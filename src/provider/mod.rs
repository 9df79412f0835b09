//! Seams to the hosted backend: account/token management and table storage.
//!
//! Both traits are object safe so services hold them as `Arc<dyn ...>`; the
//! production implementation is [`supabase::SupabaseClient`], tests use the
//! in-memory doubles in [`crate::testing`].

pub mod error;
pub mod supabase;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use error::{ProviderError, ProviderErrorKind};
pub use types::{
    OtpType, ProviderSession, ProviderUser, ResendType, SignUp, SignUpResult, UserAttributes,
};

/// Remote identity provider: credentials, tokens and account administration.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, request: SignUp<'_>) -> Result<SignUpResult, ProviderError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError>;

    /// Revoke every session belonging to the holder of `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    /// Token introspection: resolve the account an access token belongs to.
    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError>;

    async fn admin_get_user(&self, user_id: &str) -> Result<ProviderUser, ProviderError>;

    async fn admin_update_user(&self, user_id: &str, attributes: &UserAttributes) -> Result<ProviderUser, ProviderError>;

    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> Result<ProviderUser, ProviderError>;

    async fn resend(&self, kind: ResendType, email: &str, redirect_to: &str) -> Result<(), ProviderError>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), ProviderError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), ProviderError>;
}

/// Remote table API addressed by table name and equality filters.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, ProviderError>;

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, ProviderError>;

    /// Apply `patch` to matching rows and return them as stored.
    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>, ProviderError>;

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), ProviderError>;

    async fn select_one(&self, table: &str, filter: &Filter) -> Result<Option<Value>, ProviderError> {
        Ok(self.select(table, filter).await?.into_iter().next())
    }
}

/// Conjunction of `column = value` conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::all().eq("id", id)
    }

    pub fn conditions(&self) -> &[(String, String)] {
        &self.conditions
    }

    /// Whether `row` satisfies every condition; non-string columns compare by
    /// their JSON text.
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|(column, expected)| match row.get(column) {
            Some(Value::String(actual)) => actual == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_matches_strings_and_numbers() {
        let row = json!({ "id": 7, "user_id": "u-1" });
        assert!(Filter::by_id("7").matches(&row));
        assert!(Filter::all().eq("user_id", "u-1").matches(&row));
        assert!(!Filter::all().eq("user_id", "u-2").matches(&row));
        assert!(!Filter::all().eq("missing", "x").matches(&row));
        assert!(Filter::all().matches(&row));
    }
}
