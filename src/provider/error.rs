use thiserror::Error;

/// Failure reported by the hosted auth or table API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("provider rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Non-success status without a readable error body (gateway or crash page).
    #[error("provider failed with HTTP {status}")]
    Failed { status: u16 },

    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected provider response: {0}")]
    Decode(String),
}

/// What a provider failure means to this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    AlreadyRegistered,
    InvalidCredentials,
    InvalidToken,
    NotFound,
    RateLimited,
    /// Any other rejected operation.
    Rejected,
    /// Transport failure, undecodable answer or a bare 5xx. A 5xx that
    /// carries a provider error body is `Rejected`.
    Unavailable,
}

const ALREADY_REGISTERED_CODES: &[&str] = &["user_already_exists", "email_exists"];
const INVALID_CREDENTIAL_CODES: &[&str] = &["invalid_credentials", "invalid_grant", "email_not_confirmed"];
const INVALID_TOKEN_CODES: &[&str] = &[
    "bad_jwt",
    "no_authorization",
    "session_not_found",
    "session_expired",
    "refresh_token_not_found",
    "refresh_token_already_used",
    "otp_expired",
];
const NOT_FOUND_CODES: &[&str] = &["user_not_found", "PGRST116"];
const RATE_LIMIT_CODES: &[&str] = &["over_request_rate_limit", "over_email_send_rate_limit", "over_sms_send_rate_limit"];

impl ProviderError {
    pub fn rejected(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        ProviderError::Rejected {
            status,
            code,
            message: message.into(),
        }
    }

    /// Classify the failure. This is the only place that looks at provider
    /// codes or wording: structured codes first, then status, then message text.
    pub fn kind(&self) -> ProviderErrorKind {
        let (status, code, message) = match self {
            ProviderError::Rejected { status, code, message } => (*status, code.as_deref(), message.as_str()),
            ProviderError::Failed { .. } | ProviderError::Transport(_) | ProviderError::Decode(_) => {
                return ProviderErrorKind::Unavailable
            }
        };

        if let Some(code) = code {
            if ALREADY_REGISTERED_CODES.contains(&code) {
                return ProviderErrorKind::AlreadyRegistered;
            }
            if INVALID_CREDENTIAL_CODES.contains(&code) {
                return ProviderErrorKind::InvalidCredentials;
            }
            if INVALID_TOKEN_CODES.contains(&code) {
                return ProviderErrorKind::InvalidToken;
            }
            if NOT_FOUND_CODES.contains(&code) {
                return ProviderErrorKind::NotFound;
            }
            if RATE_LIMIT_CODES.contains(&code) {
                return ProviderErrorKind::RateLimited;
            }
        }

        match status {
            404 => return ProviderErrorKind::NotFound,
            429 => return ProviderErrorKind::RateLimited,
            _ => {}
        }

        let lowered = message.to_ascii_lowercase();
        if lowered.contains("already registered") || lowered.contains("already been registered") {
            ProviderErrorKind::AlreadyRegistered
        } else if lowered.contains("invalid login credentials") {
            ProviderErrorKind::InvalidCredentials
        } else {
            ProviderErrorKind::Rejected
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind() == ProviderErrorKind::Unavailable
    }

    /// Provider supplied message, suitable for forwarding on rejected requests.
    pub fn message(&self) -> String {
        match self {
            ProviderError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16, code: Option<&str>, message: &str) -> ProviderError {
        ProviderError::rejected(status, code.map(str::to_string), message)
    }

    #[test]
    fn structured_codes_win_over_wording() {
        let err = rejected(422, Some("user_already_exists"), "something unrelated");
        assert_eq!(err.kind(), ProviderErrorKind::AlreadyRegistered);

        let err = rejected(400, Some("invalid_credentials"), "already registered");
        assert_eq!(err.kind(), ProviderErrorKind::InvalidCredentials);

        let err = rejected(406, Some("PGRST116"), "JSON object requested, multiple (or no) rows returned");
        assert_eq!(err.kind(), ProviderErrorKind::NotFound);
    }

    #[test]
    fn message_matching_is_last_resort() {
        assert_eq!(
            rejected(400, None, "User already registered").kind(),
            ProviderErrorKind::AlreadyRegistered
        );
        assert_eq!(
            rejected(400, None, "Invalid login credentials").kind(),
            ProviderErrorKind::InvalidCredentials
        );
        assert_eq!(rejected(400, None, "Password is too weak").kind(), ProviderErrorKind::Rejected);
    }

    #[test]
    fn statuses_classify_without_codes() {
        assert_eq!(rejected(404, None, "nope").kind(), ProviderErrorKind::NotFound);
        assert_eq!(rejected(429, None, "slow down").kind(), ProviderErrorKind::RateLimited);
        assert!(ProviderError::Failed { status: 503 }.is_unavailable());
        assert!(ProviderError::Decode("bad json".into()).is_unavailable());
    }

    #[test]
    fn server_errors_with_a_body_are_rejections() {
        let err = rejected(500, Some("unexpected_failure"), "Error sending confirmation email");
        assert_eq!(err.kind(), ProviderErrorKind::Rejected);
        assert!(!err.is_unavailable());
        assert_eq!(err.message(), "Error sending confirmation email");

        let err = rejected(500, None, "Database error saving new user");
        assert_eq!(err.kind(), ProviderErrorKind::Rejected);
    }

    #[test]
    fn message_prefers_provider_text() {
        assert_eq!(rejected(400, None, "Password is too weak").message(), "Password is too weak");
        assert!(ProviderError::Decode("x".into()).message().contains("unexpected provider response"));
    }
}
