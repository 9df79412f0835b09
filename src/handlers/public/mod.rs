// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation, sign-in, token refresh and the email-link flows. No
// caller identity is available here, so every payload is validated before
// it reaches the identity provider.

pub mod auth;
