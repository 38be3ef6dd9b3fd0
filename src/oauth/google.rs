//! Google login via `tokeninfo` and `userinfo`
//!
//! Google tokens are not exchanged. `tokeninfo` is only used to check that the
//! token was issued to this service; the original token then reads the profile.

use super::{fetch_json, validate_endpoint, LoginProvider};
use crate::error::{AuthError, ProviderErrorEnvelope};
use crate::models::{NormalizedUser, OAuthSource};
use crate::settings::{GoogleSettings, SettingsError};
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use serde::Deserialize;

const PROVIDER: OAuthSource = OAuthSource::Google;
const PROFILE_FIELDS: &str = "email,id,name,picture";

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    azp: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiError {
    code: i64,
    message: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    client_id: String,
    tokeninfo_endpoint: String,
    userinfo_endpoint: String,
}

impl GoogleClient {
    /// # Errors
    ///
    /// Returns an error if either endpoint is not an absolute URL
    pub fn new(
        http: reqwest::Client,
        client_id: String,
        tokeninfo_endpoint: &str,
        userinfo_endpoint: &str,
    ) -> Result<Self, SettingsError> {
        validate_endpoint("google.tokeninfo_endpoint", tokeninfo_endpoint)?;
        validate_endpoint("google.userinfo_endpoint", userinfo_endpoint)?;

        Ok(Self {
            http,
            client_id,
            tokeninfo_endpoint: tokeninfo_endpoint.to_string(),
            userinfo_endpoint: userinfo_endpoint.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if:
    /// - The client id is not configured
    /// - An endpoint URL is invalid
    pub fn from_settings(
        settings: &GoogleSettings,
        http: reqwest::Client,
    ) -> Result<Self, SettingsError> {
        let client_id = settings
            .get_client_id()
            .ok_or_else(|| SettingsError::MissingCredential("google client_id".to_string()))?;

        Self::new(
            http,
            client_id,
            &settings.tokeninfo_endpoint,
            &settings.userinfo_endpoint,
        )
    }

    /// Check that the token was issued for this service's client id
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The call fails
    /// - Google reports an error (no `aud` in the response)
    /// - `aud` or `azp` differs from the configured client id
    pub async fn verify_token(&self, access_token: &str) -> Result<(), AuthError> {
        let info: TokenInfo = fetch_json(
            &self.http,
            PROVIDER,
            &self.tokeninfo_endpoint,
            &[("access_token", access_token)],
        )
        .await?;

        let Some(aud) = info.aud.filter(|aud| !aud.is_empty()) else {
            return Err(AuthError::provider_plain(
                PROVIDER,
                ProviderErrorEnvelope::new(
                    info.error.unwrap_or_default(),
                    info.error_description.unwrap_or_default(),
                ),
            ));
        };

        if aud != self.client_id || info.azp.as_deref() != Some(self.client_id.as_str()) {
            LoggingHelper::log_audience_mismatch(&aud, info.azp.as_deref());
            return Err(AuthError::Verification);
        }

        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the call fails or the response has no `id`
    pub async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedUser, AuthError> {
        let info: UserInfo = fetch_json(
            &self.http,
            PROVIDER,
            &self.userinfo_endpoint,
            &[("fields", PROFILE_FIELDS), ("access_token", access_token)],
        )
        .await?;

        let Some(id) = info.id.filter(|id| !id.is_empty()) else {
            return Err(AuthError::provider(
                PROVIDER,
                ProviderErrorEnvelope::new(info.error.code.to_string(), info.error.message)
                    .with_status(info.error.status),
            ));
        };

        LoggingHelper::log_picture_discarded(PROVIDER, info.picture.is_some());

        Ok(NormalizedUser {
            username: info.email.unwrap_or_default(),
            display_name: info.name.unwrap_or_default(),
            oauth_source: PROVIDER,
            oauth_id: id,
        })
    }
}

#[async_trait]
impl LoginProvider for GoogleClient {
    fn source(&self) -> OAuthSource {
        PROVIDER
    }

    async fn authenticate(&self, access_token: &str) -> Result<NormalizedUser, AuthError> {
        self.verify_token(access_token).await?;
        self.fetch_profile(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const CLIENT_ID: &str = "google-client-id";

    fn client_for(server: &MockServer) -> GoogleClient {
        GoogleClient::new(
            reqwest::Client::new(),
            CLIENT_ID.to_string(),
            &server.url("/tokeninfo"),
            &server.url("/oauth2/v2/userinfo"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_verifies_then_fetches_profile() {
        let server = MockServer::start_async().await;
        let tokeninfo = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/tokeninfo")
                    .query_param("access_token", "g-token");
                then.status(200).json_body(json!({
                    "aud": CLIENT_ID,
                    "azp": CLIENT_ID,
                    "sub": "1234",
                    "scope": "openid email profile",
                    "expires_in": "3599",
                    "email": "g@x.com",
                    "email_verified": "true"
                }));
            })
            .await;
        let userinfo = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/oauth2/v2/userinfo")
                    .query_param("fields", "email,id,name,picture")
                    .query_param("access_token", "g-token");
                then.status(200).json_body(json!({
                    "id": "g77",
                    "name": "Gus",
                    "email": "g@x.com",
                    "picture": "https://lh3.googleusercontent.com/a/photo"
                }));
            })
            .await;

        let user = client_for(&server).authenticate("g-token").await.unwrap();

        tokeninfo.assert_async().await;
        userinfo.assert_async().await;
        assert_eq!(user.oauth_source, OAuthSource::Google);
        assert_eq!(user.oauth_id, "g77");
        assert_eq!(user.username, "g@x.com");
        assert_eq!(user.display_name, "Gus");
    }

    #[tokio::test]
    async fn test_audience_mismatch_skips_profile_call() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tokeninfo");
                then.status(200).json_body(json!({"aud": "other-client"}));
            })
            .await;
        let userinfo = server
            .mock_async(|when, then| {
                when.method(GET).path("/oauth2/v2/userinfo");
                then.status(200).json_body(json!({"id": "g77"}));
            })
            .await;

        let err = client_for(&server).authenticate("g-token").await.unwrap_err();

        assert!(matches!(err, AuthError::Verification));
        assert_eq!(userinfo.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_authorized_party_mismatch_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tokeninfo");
                then.status(200)
                    .json_body(json!({"aud": CLIENT_ID, "azp": "someone-else"}));
            })
            .await;

        let err = client_for(&server).verify_token("g-token").await.unwrap_err();
        assert!(matches!(err, AuthError::Verification));
    }

    #[tokio::test]
    async fn test_tokeninfo_error_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tokeninfo");
                then.status(400).json_body(json!({
                    "error": "invalid_token",
                    "error_description": "Invalid Value"
                }));
            })
            .await;

        let err = client_for(&server).verify_token("bad").await.unwrap_err();

        match err {
            AuthError::ProviderAuth {
                provider,
                detail,
                envelope,
            } => {
                assert_eq!(provider, OAuthSource::Google);
                assert_eq!(detail, "invalid_token: Invalid Value");
                assert_eq!(envelope.code, "invalid_token");
                assert_eq!(envelope.message, "Invalid Value");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_userinfo_error_envelope_includes_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/oauth2/v2/userinfo");
                then.status(401).json_body(json!({
                    "error": {
                        "code": 401,
                        "message": "Request is missing required authentication credential.",
                        "status": "UNAUTHENTICATED"
                    }
                }));
            })
            .await;

        let err = client_for(&server).fetch_profile("g-token").await.unwrap_err();

        match err {
            AuthError::ProviderAuth { detail, .. } => assert_eq!(
                detail,
                "[Code:401] UNAUTHENTICATED: Request is missing required authentication credential."
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_truncated_json_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tokeninfo");
                then.status(200).body(r#"{"aud": "#);
            })
            .await;

        let err = client_for(&server).verify_token("g-token").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Decode {
                provider: OAuthSource::Google,
                ..
            }
        ));
    }

    #[test]
    fn test_from_settings_requires_client_id() {
        let settings = GoogleSettings {
            client_id_env: None,
            ..Default::default()
        };
        let result = GoogleClient::from_settings(&settings, reqwest::Client::new());
        assert!(matches!(result, Err(SettingsError::MissingCredential(_))));
    }
}
