//! Provider clients and login dispatch
//!
//! Each supported identity provider implements [`LoginProvider`]: it takes
//! the raw access token a client obtained from the provider, verifies or
//! exchanges it, fetches the profile and normalizes it. The
//! [`LoginDispatcher`] picks the provider for a request.

pub mod dispatcher;
pub mod facebook;
pub mod google;

pub use dispatcher::{LoginDispatcher, UnknownSourcePolicy};
pub use facebook::FacebookClient;
pub use google::GoogleClient;

use crate::error::AuthError;
use crate::models::{NormalizedUser, OAuthSource};
use crate::settings::SettingsError;
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Exchange a provider access token for a normalized user
#[async_trait]
pub trait LoginProvider: Send + Sync {
    /// Provider this client talks to
    fn source(&self) -> OAuthSource;

    /// Verify the token with the provider and fetch the matching profile
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The provider cannot be reached
    /// - A provider response is not valid JSON
    /// - The provider rejects the token or returns no user id
    /// - The token was issued for a different client (Google)
    async fn authenticate(&self, access_token: &str) -> Result<NormalizedUser, AuthError>;
}

/// Build the shared HTTP client used for all provider calls
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized
pub fn build_http_client() -> Result<reqwest::Client, SettingsError> {
    reqwest::Client::builder()
        .user_agent(concat!("oauth-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SettingsError::HttpClient)
}

/// Check that a configured endpoint is an absolute URL
pub(crate) fn validate_endpoint(field: &'static str, value: &str) -> Result<(), SettingsError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|source| SettingsError::InvalidUrl { field, source })
}

/// GET `url` with `query` and decode the body as `T`
///
/// The HTTP status is not inspected: providers put their error envelopes in
/// the body and the caller decides success from the decoded payload.
/// Transport errors drop the request URL, whose query carries credentials.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    provider: OAuthSource,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, AuthError> {
    LoggingHelper::log_provider_request(provider, url);

    let response = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| AuthError::Transport {
            provider,
            source: e.without_url(),
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AuthError::Transport {
            provider,
            source: e.without_url(),
        })?;

    LoggingHelper::log_provider_response(provider, url, status.as_u16(), body.len());

    serde_json::from_str(&body).map_err(|source| AuthError::Decode { provider, source })
}
