//! Session façade: account and token operations against the identity
//! provider, normalized into this service's response shapes and error
//! taxonomy.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};

use super::bootstrap::SettingsBootstrapper;
use super::error::{ServiceError, ServiceResult};
use crate::auth::{read_expiry, TokenExpiry};
use crate::config::FrontendConfig;
use crate::models::auth::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::models::{Confirmation, Identity, RegistrationOutcome, Session, TokenInfo};
use crate::provider::{
    IdentityProvider, OtpType, ProviderError, ProviderErrorKind, ResendType, SignUp, UserAttributes,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Frontend pages the provider links to from its emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirects {
    pub verify_email: String,
    pub reset_password: String,
}

impl From<&FrontendConfig> for Redirects {
    fn from(frontend: &FrontendConfig) -> Self {
        Self {
            verify_email: frontend.verify_email_url(),
            reset_password: frontend.reset_password_url(),
        }
    }
}

pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    bootstrapper: SettingsBootstrapper,
    redirects: Redirects,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>, bootstrapper: SettingsBootstrapper, redirects: Redirects) -> Self {
        Self {
            identity,
            bootstrapper,
            redirects,
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> ServiceResult<RegistrationOutcome> {
        tracing::debug!(email = %request.email, "registering account");

        let result = self
            .identity
            .sign_up(SignUp {
                email: &request.email,
                password: &request.password,
                display_name: &request.name,
                redirect_to: &self.redirects.verify_email,
            })
            .await
            .map_err(|err| match err.kind() {
                ProviderErrorKind::AlreadyRegistered => {
                    tracing::warn!(email = %request.email, "registration for existing account");
                    ServiceError::Conflict("Email is already registered".to_string())
                }
                _ => passthrough("sign_up", err, |err| ServiceError::InvalidRequest(err.message())),
            })?;

        // Detached; a seeding failure never fails the registration.
        self.bootstrapper.dispatch(&result.user.id);

        let user = Identity::from(result.user);
        tracing::info!(user_id = %user.id, verified = result.session.is_some(), "account registered");

        Ok(match result.session {
            Some(session) => RegistrationOutcome::SessionIssued {
                user,
                session: session.into(),
            },
            None => RegistrationOutcome::VerificationPending { user },
        })
    }

    /// Wrong password and unknown email fail with the same message.
    pub async fn login(&self, request: &LoginRequest) -> ServiceResult<(Identity, Session)> {
        tracing::debug!(email = %request.email, "login attempt");

        let mut session = self
            .identity
            .sign_in_with_password(&request.email, &request.password)
            .await
            .map_err(|err| passthrough("sign_in", err, |_| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string())))?;

        let user = session
            .user
            .take()
            .ok_or_else(|| ServiceError::Unauthorized("Login failed".to_string()))?;

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok((user.into(), session.into()))
    }

    pub async fn logout(&self, access_token: &str) -> ServiceResult<()> {
        self.identity
            .sign_out(access_token)
            .await
            .map_err(|err| passthrough("sign_out", err, |err| ServiceError::InvalidRequest(err.message())))?;
        tracing::info!("session revoked");
        Ok(())
    }

    pub async fn get_profile(&self, user_id: &str) -> ServiceResult<Identity> {
        let user = self
            .identity
            .admin_get_user(user_id)
            .await
            .map_err(|err| passthrough("get_user", err, |_| ServiceError::NotFound("User not found".to_string())))?;
        Ok(user.into())
    }

    /// Forward only the supplied fields: the name lands in profile metadata,
    /// the password is a credential update.
    pub async fn update_profile(&self, user_id: &str, request: &UpdateProfileRequest) -> ServiceResult<Identity> {
        let attributes = UserAttributes {
            password: request.password.clone(),
            user_metadata: request.name().map(|name| {
                let mut metadata = Map::new();
                metadata.insert("name".to_string(), Value::String(name.to_string()));
                metadata
            }),
        };

        if attributes.is_empty() {
            return self.get_profile(user_id).await;
        }

        let user = self
            .identity
            .admin_update_user(user_id, &attributes)
            .await
            .map_err(|err| passthrough("update_user", err, |err| ServiceError::InvalidRequest(err.message())))?;

        tracing::info!(
            user_id,
            name = attributes.user_metadata.is_some(),
            password = attributes.password.is_some(),
            "profile updated"
        );
        Ok(user.into())
    }

    pub async fn verify_email(&self, token_hash: &str) -> ServiceResult<Confirmation> {
        let user = self
            .identity
            .verify_otp(token_hash, OtpType::Email)
            .await
            .map_err(|err| passthrough("verify_otp", err, |err| ServiceError::InvalidRequest(err.message())))?;
        tracing::info!(user_id = %user.id, "email verified");
        Ok(Confirmation::new("Email verified successfully"))
    }

    pub async fn resend_verification(&self, email: &str) -> ServiceResult<Confirmation> {
        self.identity
            .resend(ResendType::Signup, email, &self.redirects.verify_email)
            .await
            .map_err(|err| passthrough("resend", err, |err| ServiceError::InvalidRequest(err.message())))?;
        tracing::info!(email, "verification email resent");
        Ok(Confirmation::new("Verification email sent"))
    }

    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<Session> {
        let session = self
            .identity
            .refresh_session(refresh_token)
            .await
            .map_err(|err| passthrough("refresh", err, |_| ServiceError::Unauthorized("Invalid refresh token".to_string())))?;
        Ok(session.into())
    }

    /// Remote verification first; the expiry is then read from the token
    /// payload for display only and falls back to zeros when unreadable.
    pub async fn token_info(&self, access_token: &str) -> ServiceResult<TokenInfo> {
        let user = self
            .identity
            .get_user(access_token)
            .await
            .map_err(|err| passthrough("get_user", err, |_| ServiceError::Unauthorized("Invalid access token".to_string())))?;

        let expiry = read_expiry(access_token, Utc::now().timestamp()).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "access token payload unreadable");
            TokenExpiry::unknown()
        });

        Ok(TokenInfo::new(user.into(), expiry))
    }

    /// The failure message is fixed so the response does not reveal whether
    /// the address has an account.
    pub async fn reset_password(&self, email: &str) -> ServiceResult<()> {
        self.identity
            .reset_password_for_email(email, &self.redirects.reset_password)
            .await
            .map_err(|err| {
                passthrough("recover", err, |_| ServiceError::InvalidRequest("Password reset request failed".to_string()))
            })?;
        tracing::info!(email, "password reset email requested");
        Ok(())
    }

    /// Token introspection for the request guard.
    pub async fn authenticate(&self, access_token: &str) -> ServiceResult<Identity> {
        let user = self
            .identity
            .get_user(access_token)
            .await
            .map_err(|err| passthrough("get_user", err, |_| ServiceError::Unauthorized("Invalid token".to_string())))?;
        Ok(user.into())
    }
}

/// Map a rejected provider call with `reject`; an unreachable provider stays
/// a provider failure for the fault boundary.
fn passthrough<F>(operation: &'static str, err: ProviderError, reject: F) -> ServiceError
where
    F: FnOnce(ProviderError) -> ServiceError,
{
    if err.is_unavailable() {
        return ServiceError::Provider(err);
    }
    tracing::warn!(operation, error = %err, "provider rejected request");
    reject(err)
}
