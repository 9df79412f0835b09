use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{FieldErrors, Validate};
use crate::auth::TokenExpiry;
use crate::provider::{ProviderSession, ProviderUser};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Account as exposed to clients; projected from the provider's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<ProviderUser> for Identity {
    fn from(user: ProviderUser) -> Self {
        let display_name = user.display_name();
        Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
            display_name,
            created_at: user.created_at,
            last_sign_in_at: user.last_sign_in_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    #[default]
    Bearer,
}

/// Paired access/refresh tokens; the caller is responsible for storing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub expires_in: i64,
    pub token_type: TokenType,
}

impl From<ProviderSession> for Session {
    fn from(session: ProviderSession) -> Self {
        Self {
            expires_at: session.expires_at.unwrap_or_default(),
            expires_in: session.expires_in,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            token_type: TokenType::Bearer,
        }
    }
}

/// Result of a sign-up: either signed in straight away or waiting for the
/// email link to be followed.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    SessionIssued { user: Identity, session: Session },
    VerificationPending { user: Identity },
}

impl RegistrationOutcome {
    pub fn user(&self) -> &Identity {
        match self {
            RegistrationOutcome::SessionIssued { user, .. } => user,
            RegistrationOutcome::VerificationPending { user } => user,
        }
    }

    pub fn needs_email_verification(&self) -> bool {
        matches!(self, RegistrationOutcome::VerificationPending { .. })
    }
}

/// Wire shape for register and login. Both tokens come from one `Session`,
/// so they are either both present or both null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: Identity,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(rename = "needEmailVerification", default, skip_serializing_if = "Option::is_none")]
    pub need_email_verification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl AuthResponse {
    pub fn signed_in(user: Identity, session: Session) -> Self {
        Self {
            user,
            access_token: Some(session.access_token),
            refresh_token: Some(session.refresh_token),
            need_email_verification: None,
            expires_at: Some(session.expires_at),
            expires_in: Some(session.expires_in),
        }
    }
}

impl From<RegistrationOutcome> for AuthResponse {
    fn from(outcome: RegistrationOutcome) -> Self {
        match outcome {
            RegistrationOutcome::SessionIssued { user, session } => Self {
                need_email_verification: Some(false),
                ..Self::signed_in(user, session)
            },
            RegistrationOutcome::VerificationPending { user } => Self {
                user,
                access_token: None,
                refresh_token: None,
                need_email_verification: Some(true),
                expires_at: None,
                expires_in: None,
            },
        }
    }
}

/// Verified identity plus the advisory expiry read from the token itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub user: Identity,
    pub expires_at: i64,
    pub expires_in: i64,
}

impl TokenInfo {
    pub fn new(user: Identity, expiry: TokenExpiry) -> Self {
        Self {
            user,
            expires_at: expiry.expires_at,
            expires_in: expiry.expires_in,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// Request payloads

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .email("email", &self.email)
            .min_len("password", &self.password, MIN_PASSWORD_LEN)
            .not_blank("name", &self.name);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.email("email", &self.email).check(
            !self.password.is_empty(),
            "password",
            "must not be empty",
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    /// Empty names are ignored rather than stored.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(password) = &self.password {
            errors.min_len("password", password, MIN_PASSWORD_LEN);
        }
        errors.into_result()
    }
}

/// Body of reset-password and resend-verification.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

impl Validate for EmailRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.email("email", &self.email);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl Validate for RefreshTokenRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.not_blank("refresh_token", &self.refresh_token);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    #[serde(default)]
    pub token: String,
}

impl Validate for VerifyEmailQuery {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.not_blank("token", &self.token);
        errors.into_result()
    }
}
