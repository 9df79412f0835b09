// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Routes in this tier sit behind `middleware::require_auth`, which verifies
// the token with the identity provider on every request and attaches the
// caller as `AuthUser`.

pub mod auth;
pub mod user_settings;
