//! Error types for the login flow
//!
//! `AuthError` is the single error type returned by provider clients, the
//! dispatcher and request parsing. The HTTP layer maps each variant to a
//! status code and a stable error code.

use crate::models::OAuthSource;
use actix_web::http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Error details reported by a provider in its response body
///
/// Facebook and Google use different shapes; both are folded into this one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderErrorEnvelope {
    pub code: String,
    pub message: String,
    /// Google profile responses carry a status such as `UNAUTHENTICATED`
    pub status: Option<String>,
}

impl ProviderErrorEnvelope {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

impl fmt::Display for ProviderErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "[Code:{}] {status}: {}", self.code, self.message),
            None => write!(f, "[Code:{}] {}", self.code, self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider could not be reached or the body could not be read
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: OAuthSource,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with something that is not the expected JSON
    #[error("{provider} returned an unreadable response: {source}")]
    Decode {
        provider: OAuthSource,
        #[source]
        source: serde_json::Error,
    },

    /// The provider reported an error or omitted its success field
    #[error("{provider} rejected the token: {detail}")]
    ProviderAuth {
        provider: OAuthSource,
        detail: String,
        envelope: ProviderErrorEnvelope,
    },

    /// Google token audience does not match the configured client id
    #[error("token verification failed")]
    Verification,

    /// The inbound request body could not be used
    #[error("invalid login request: {0}")]
    RequestParse(String),

    #[error("unknown oauthSource {0}")]
    UnknownSource(i64),
}

impl AuthError {
    /// Provider error rendered as `[Code:<code>] [<status>: ]<message>`
    #[must_use]
    pub fn provider(provider: OAuthSource, envelope: ProviderErrorEnvelope) -> Self {
        Self::ProviderAuth {
            provider,
            detail: envelope.to_string(),
            envelope,
        }
    }

    /// Provider error rendered as `<code>: <message>` (Google tokeninfo style)
    #[must_use]
    pub fn provider_plain(provider: OAuthSource, envelope: ProviderErrorEnvelope) -> Self {
        Self::ProviderAuth {
            provider,
            detail: format!("{}: {}", envelope.code, envelope.message),
            envelope,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestParse(_) | Self::UnknownSource(_) => StatusCode::BAD_REQUEST,
            Self::ProviderAuth { .. } | Self::Verification => StatusCode::UNAUTHORIZED,
            Self::Transport { .. } | Self::Decode { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable code used in error response bodies
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RequestParse(_) => "invalid_request",
            Self::UnknownSource(_) => "unknown_oauth_source",
            Self::ProviderAuth { .. } => "provider_auth_failed",
            Self::Verification => "token_verification_failed",
            Self::Transport { .. } => "provider_unreachable",
            Self::Decode { .. } => "provider_bad_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_display() {
        let envelope = ProviderErrorEnvelope::new("190", "Invalid token");
        assert_eq!(envelope.to_string(), "[Code:190] Invalid token");

        let envelope = ProviderErrorEnvelope::new("401", "Request had invalid credentials")
            .with_status("UNAUTHENTICATED");
        assert_eq!(
            envelope.to_string(),
            "[Code:401] UNAUTHENTICATED: Request had invalid credentials"
        );
    }

    #[test]
    fn test_provider_error_messages() {
        let err = AuthError::provider(
            OAuthSource::Facebook,
            ProviderErrorEnvelope::new("190", "Invalid token"),
        );
        assert_eq!(
            err.to_string(),
            "facebook rejected the token: [Code:190] Invalid token"
        );

        let err = AuthError::provider_plain(
            OAuthSource::Google,
            ProviderErrorEnvelope::new("invalid_token", "Invalid Value"),
        );
        assert_eq!(
            err.to_string(),
            "google rejected the token: invalid_token: Invalid Value"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::RequestParse("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::UnknownSource(5).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Verification.status_code(),
            StatusCode::UNAUTHORIZED
        );

        let decode = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = AuthError::Decode {
            provider: OAuthSource::Google,
            source: decode,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "provider_bad_response");
    }
}
