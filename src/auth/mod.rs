//! Local, unverified reading of access-token claims.
//!
//! Tokens are only ever trusted after the identity provider has verified
//! them; what is decoded here is advisory metadata shown back to the caller.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Expiry metadata of an access token, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenExpiry {
    pub expires_at: i64,
    pub expires_in: i64,
}

impl TokenExpiry {
    /// Reported when the token payload cannot be read.
    pub fn unknown() -> Self {
        Self {
            expires_at: 0,
            expires_in: 0,
        }
    }

    /// Remaining lifetime never goes negative.
    pub fn at(exp: i64, now: i64) -> Self {
        Self {
            expires_at: exp,
            expires_in: (exp - now).max(0),
        }
    }
}

/// Decodes the `exp` claim of `token` without checking its signature.
pub fn read_expiry(token: &str, now: i64) -> Result<TokenExpiry, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(TokenExpiry::at(data.claims.exp, now))
}
