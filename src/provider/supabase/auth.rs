use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use super::SupabaseClient;
use crate::provider::{
    IdentityProvider, OtpType, ProviderError, ProviderSession, ProviderUser, ResendType, SignUp, SignUpResult,
    UserAttributes,
};

impl SupabaseClient {
    fn session_from(value: Value) -> Result<ProviderSession, ProviderError> {
        let mut session: ProviderSession =
            serde_json::from_value(value).map_err(|e| ProviderError::Decode(e.to_string()))?;
        // Older auth servers omit expires_at
        if session.expires_at.is_none() {
            session.expires_at = Some(Utc::now().timestamp() + session.expires_in);
        }
        Ok(session)
    }

    fn user_from(value: Value) -> Result<ProviderUser, ProviderError> {
        serde_json::from_value(value).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn sign_up(&self, request: SignUp<'_>) -> Result<SignUpResult, ProviderError> {
        let mut url = self.auth_url(&["signup"]);
        url.query_pairs_mut().append_pair("redirect_to", request.redirect_to);

        let body: Value = self
            .send_json(self.http.post(url).json(&json!({
                "email": request.email,
                "password": request.password,
                "data": { "name": request.display_name },
            })))
            .await?;

        // Auto-confirmed projects answer with a session wrapping the user;
        // otherwise the bare user comes back and verification is pending.
        let result = if body.get("access_token").is_some() {
            let session = Self::session_from(body)?;
            let user = session
                .user
                .clone()
                .ok_or_else(|| ProviderError::Decode("sign-up session without user".to_string()))?;
            SignUpResult {
                user,
                session: Some(session),
            }
        } else {
            SignUpResult {
                user: Self::user_from(body)?,
                session: None,
            }
        };

        // With confirmations enabled an existing address is answered with an
        // obfuscated user that has no identities.
        if matches!(&result.user.identities, Some(identities) if identities.is_empty()) {
            return Err(ProviderError::rejected(
                422,
                Some("user_already_exists".to_string()),
                "User already registered",
            ));
        }

        Ok(result)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError> {
        let mut url = self.auth_url(&["token"]);
        url.query_pairs_mut().append_pair("grant_type", "password");

        let body: Value = self
            .send_json(self.http.post(url).json(&json!({ "email": email, "password": password })))
            .await?;
        Self::session_from(body)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let mut url = self.auth_url(&["logout"]);
        url.query_pairs_mut().append_pair("scope", "global");

        self.send_empty(self.http.post(url).bearer_auth(access_token)).await
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        let url = self.auth_url(&["user"]);
        self.send_json(self.http.get(url).bearer_auth(access_token)).await
    }

    async fn admin_get_user(&self, user_id: &str) -> Result<ProviderUser, ProviderError> {
        let url = self.auth_url(&["admin", "users", user_id]);
        self.send_json(self.http.get(url)).await
    }

    async fn admin_update_user(&self, user_id: &str, attributes: &UserAttributes) -> Result<ProviderUser, ProviderError> {
        let url = self.auth_url(&["admin", "users", user_id]);
        self.send_json(self.http.put(url).json(attributes)).await
    }

    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> Result<ProviderUser, ProviderError> {
        let url = self.auth_url(&["verify"]);
        let mut body: Value = self
            .send_json(self.http.post(url).json(&json!({ "type": kind, "token_hash": token_hash })))
            .await?;

        match body.get_mut("user").map(Value::take) {
            Some(user) => Self::user_from(user),
            None => Self::user_from(body),
        }
    }

    async fn resend(&self, kind: ResendType, email: &str, redirect_to: &str) -> Result<(), ProviderError> {
        let mut url = self.auth_url(&["resend"]);
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        self.send_empty(self.http.post(url).json(&json!({ "type": kind, "email": email })))
            .await
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), ProviderError> {
        let mut url = self.auth_url(&["recover"]);
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        self.send_empty(self.http.post(url).json(&json!({ "email": email })))
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        let mut url = self.auth_url(&["token"]);
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");

        let body: Value = self
            .send_json(self.http.post(url).json(&json!({ "refresh_token": refresh_token })))
            .await?;
        Self::session_from(body)
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        let url = self.auth_url(&["health"]);
        self.send_empty(self.http.get(url)).await
    }
}
