use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::lock;
use crate::provider::{
    IdentityProvider, OtpType, ProviderError, ProviderSession, ProviderUser, ResendType, SignUp, SignUpResult,
    UserAttributes,
};

pub const FAKE_TOKEN_TTL_SECS: i64 = 3600;

const SIGNING_SECRET: &[u8] = b"fake-identity-provider";

/// Email the provider would have sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub kind: &'static str,
    pub email: String,
    pub redirect_to: String,
}

struct Account {
    user: ProviderUser,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    /// access token -> user id
    access_tokens: HashMap<String, String>,
    /// refresh token -> user id
    refresh_tokens: HashMap<String, String>,
    /// verification token hash -> user id
    verification_tokens: HashMap<String, String>,
    sent: Vec<SentEmail>,
    issued: i64,
}

/// Identity provider kept in memory. Access tokens are real HS256 JWTs
/// carrying `sub` and `exp`, but only tokens this instance issued and has not
/// revoked are accepted.
#[derive(Default)]
pub struct FakeIdentityProvider {
    state: Mutex<State>,
    require_confirmation: bool,
    unavailable: Mutex<bool>,
    /// status, code, message returned by every call while set
    failure: Mutex<Option<(u16, Option<String>, String)>>,
}

impl FakeIdentityProvider {
    /// Sign-ups are confirmed immediately and get a session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign-ups wait for the emailed verification link.
    pub fn requiring_confirmation() -> Self {
        Self {
            require_confirmation: true,
            ..Self::default()
        }
    }

    /// Simulate an unreachable provider.
    pub fn set_unavailable(&self, unavailable: bool) {
        *lock(&self.unavailable) = unavailable;
    }

    /// Answer every call with this error body, as GoTrue does when e.g. the
    /// mailer is broken. `None` restores normal behavior.
    pub fn fail_with(&self, failure: Option<(u16, Option<&str>, &str)>) {
        *lock(&self.failure) =
            failure.map(|(status, code, message)| (status, code.map(str::to_string), message.to_string()));
    }

    /// Add a confirmed account and return its id.
    pub fn create_user(&self, email: &str, password: &str, name: &str) -> String {
        let user = new_user(email, name, true);
        let id = user.id.clone();
        lock(&self.state).accounts.insert(
            id.clone(),
            Account {
                user,
                password: password.to_string(),
            },
        );
        id
    }

    /// Accept an arbitrary string as an access token for `user_id`.
    pub fn accept_token(&self, token: &str, user_id: &str) {
        lock(&self.state)
            .access_tokens
            .insert(token.to_string(), user_id.to_string());
    }

    /// Latest verification token emailed to `email`.
    pub fn verification_token(&self, email: &str) -> Option<String> {
        let state = lock(&self.state);
        let user_id = find_by_email(&state, email)?.user.id.clone();
        state
            .verification_tokens
            .iter()
            .find(|(_, owner)| **owner == user_id)
            .map(|(token, _)| token.clone())
    }

    pub fn sent_emails(&self) -> Vec<SentEmail> {
        lock(&self.state).sent.clone()
    }

    fn ensure_available(&self) -> Result<(), ProviderError> {
        if *lock(&self.unavailable) {
            return Err(ProviderError::Failed { status: 503 });
        }
        if let Some((status, code, message)) = lock(&self.failure).clone() {
            return Err(ProviderError::rejected(status, code, message));
        }
        Ok(())
    }
}

fn new_user(email: &str, name: &str, confirmed: bool) -> ProviderUser {
    let mut metadata = Map::new();
    metadata.insert("name".to_string(), Value::String(name.to_string()));
    let now = Utc::now();
    ProviderUser {
        id: Uuid::new_v4().to_string(),
        email: Some(email.to_string()),
        user_metadata: metadata,
        created_at: now,
        last_sign_in_at: None,
        email_confirmed_at: confirmed.then_some(now),
        identities: Some(vec![json!({ "provider": "email" })]),
    }
}

fn find_by_email<'a>(state: &'a State, email: &str) -> Option<&'a Account> {
    state
        .accounts
        .values()
        .find(|account| account.user.email.as_deref() == Some(email))
}

fn invalid_credentials() -> ProviderError {
    ProviderError::rejected(400, Some("invalid_credentials".to_string()), "Invalid login credentials")
}

fn bad_jwt() -> ProviderError {
    ProviderError::rejected(403, Some("bad_jwt".to_string()), "invalid JWT: unable to parse or verify signature")
}

fn user_not_found() -> ProviderError {
    ProviderError::rejected(404, Some("user_not_found".to_string()), "User not found")
}

/// Issue a token pair. Every grant expires strictly later than the previous one.
fn issue_session(state: &mut State, user_id: &str) -> Result<ProviderSession, ProviderError> {
    state.issued += 1;
    let now = Utc::now().timestamp();
    let expires_at = now + FAKE_TOKEN_TTL_SECS + state.issued;

    let claims = json!({
        "sub": user_id,
        "exp": expires_at,
        "iat": now,
        "jti": Uuid::new_v4().to_string(),
    });
    let access_token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SIGNING_SECRET))
        .map_err(|e| ProviderError::Decode(e.to_string()))?;
    let refresh_token = Uuid::new_v4().simple().to_string();

    state.access_tokens.insert(access_token.clone(), user_id.to_string());
    state.refresh_tokens.insert(refresh_token.clone(), user_id.to_string());

    let user = state.accounts.get(user_id).map(|account| account.user.clone());
    Ok(ProviderSession {
        access_token,
        refresh_token,
        expires_in: expires_at - now,
        expires_at: Some(expires_at),
        token_type: Some("bearer".to_string()),
        user,
    })
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_up(&self, request: SignUp<'_>) -> Result<SignUpResult, ProviderError> {
        self.ensure_available()?;
        let mut state = lock(&self.state);

        if find_by_email(&state, request.email).is_some() {
            return Err(ProviderError::rejected(
                422,
                Some("user_already_exists".to_string()),
                "User already registered",
            ));
        }

        let user = new_user(request.email, request.display_name, !self.require_confirmation);
        let id = user.id.clone();
        state.accounts.insert(
            id.clone(),
            Account {
                user: user.clone(),
                password: request.password.to_string(),
            },
        );

        if self.require_confirmation {
            state
                .verification_tokens
                .insert(Uuid::new_v4().simple().to_string(), id);
            state.sent.push(SentEmail {
                kind: "signup",
                email: request.email.to_string(),
                redirect_to: request.redirect_to.to_string(),
            });
            return Ok(SignUpResult { user, session: None });
        }

        let session = issue_session(&mut state, &id)?;
        Ok(SignUpResult {
            user,
            session: Some(session),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError> {
        self.ensure_available()?;
        let mut state = lock(&self.state);

        let account = find_by_email(&state, email).ok_or_else(invalid_credentials)?;
        if account.password != password {
            return Err(invalid_credentials());
        }
        if account.user.email_confirmed_at.is_none() {
            return Err(ProviderError::rejected(
                400,
                Some("email_not_confirmed".to_string()),
                "Email not confirmed",
            ));
        }

        let id = account.user.id.clone();
        if let Some(account) = state.accounts.get_mut(&id) {
            account.user.last_sign_in_at = Some(Utc::now());
        }
        issue_session(&mut state, &id)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        self.ensure_available()?;
        let mut state = lock(&self.state);

        let user_id = state.access_tokens.get(access_token).cloned().ok_or_else(bad_jwt)?;
        state.access_tokens.retain(|_, owner| *owner != user_id);
        state.refresh_tokens.retain(|_, owner| *owner != user_id);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        self.ensure_available()?;
        let state = lock(&self.state);

        let user_id = state.access_tokens.get(access_token).ok_or_else(bad_jwt)?;
        state
            .accounts
            .get(user_id)
            .map(|account| account.user.clone())
            .ok_or_else(user_not_found)
    }

    async fn admin_get_user(&self, user_id: &str) -> Result<ProviderUser, ProviderError> {
        self.ensure_available()?;
        lock(&self.state)
            .accounts
            .get(user_id)
            .map(|account| account.user.clone())
            .ok_or_else(user_not_found)
    }

    async fn admin_update_user(&self, user_id: &str, attributes: &UserAttributes) -> Result<ProviderUser, ProviderError> {
        self.ensure_available()?;
        let mut state = lock(&self.state);

        let account = state.accounts.get_mut(user_id).ok_or_else(user_not_found)?;
        if let Some(password) = &attributes.password {
            account.password = password.clone();
        }
        if let Some(metadata) = &attributes.user_metadata {
            for (key, value) in metadata {
                account.user.user_metadata.insert(key.clone(), value.clone());
            }
        }
        Ok(account.user.clone())
    }

    async fn verify_otp(&self, token_hash: &str, _kind: OtpType) -> Result<ProviderUser, ProviderError> {
        self.ensure_available()?;
        let mut state = lock(&self.state);

        let user_id = state.verification_tokens.remove(token_hash).ok_or_else(|| {
            ProviderError::rejected(403, Some("otp_expired".to_string()), "Email link is invalid or has expired")
        })?;
        let account = state.accounts.get_mut(&user_id).ok_or_else(user_not_found)?;
        account.user.email_confirmed_at = Some(Utc::now());
        Ok(account.user.clone())
    }

    async fn resend(&self, _kind: ResendType, email: &str, redirect_to: &str) -> Result<(), ProviderError> {
        self.ensure_available()?;
        let mut state = lock(&self.state);

        let pending = find_by_email(&state, email)
            .filter(|account| account.user.email_confirmed_at.is_none())
            .map(|account| account.user.id.clone());
        if let Some(user_id) = pending {
            state.verification_tokens.retain(|_, owner| *owner != user_id);
            state
                .verification_tokens
                .insert(Uuid::new_v4().simple().to_string(), user_id);
            state.sent.push(SentEmail {
                kind: "signup",
                email: email.to_string(),
                redirect_to: redirect_to.to_string(),
            });
        }
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), ProviderError> {
        self.ensure_available()?;
        let mut state = lock(&self.state);

        if find_by_email(&state, email).is_some() {
            state.sent.push(SentEmail {
                kind: "recovery",
                email: email.to_string(),
                redirect_to: redirect_to.to_string(),
            });
        }
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        self.ensure_available()?;
        let mut state = lock(&self.state);

        let user_id = state.refresh_tokens.remove(refresh_token).ok_or_else(|| {
            ProviderError::rejected(
                400,
                Some("refresh_token_not_found".to_string()),
                "Invalid Refresh Token: Refresh Token Not Found",
            )
        })?;
        issue_session(&mut state, &user_id)
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        self.ensure_available()
    }
}
