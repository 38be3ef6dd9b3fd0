//! Facebook login via the Graph API
//!
//! The short-lived token from the client is first exchanged for a long-lived
//! one (`/oauth/access_token`), which is then used to read `/me`.

use super::{fetch_json, validate_endpoint, LoginProvider};
use crate::error::{AuthError, ProviderErrorEnvelope};
use crate::models::{NormalizedUser, OAuthSource};
use crate::settings::{FacebookSettings, SettingsError};
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use serde::Deserialize;

const PROVIDER: OAuthSource = OAuthSource::Facebook;

/// Graph API error object, present on failed calls
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GraphError {
    message: String,
    code: i64,
    fbtrace_id: Option<String>,
}

impl GraphError {
    fn into_auth_error(self) -> AuthError {
        if let Some(trace_id) = &self.fbtrace_id {
            log::debug!("Facebook error trace id: {trace_id}");
        }
        AuthError::provider(
            PROVIDER,
            ProviderErrorEnvelope::new(self.code.to_string(), self.message),
        )
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeTokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    picture: Option<serde_json::Value>,
    #[serde(default)]
    error: GraphError,
}

#[derive(Debug, Clone)]
pub struct FacebookClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    me_url: String,
    profile_fields: String,
}

impl FacebookClient {
    /// Create a client against `graph_api_base` (e.g. `https://graph.facebook.com/v4.0`)
    ///
    /// # Errors
    ///
    /// Returns an error if `graph_api_base` is not an absolute URL
    pub fn new(
        http: reqwest::Client,
        client_id: String,
        client_secret: String,
        graph_api_base: &str,
        picture_size: u32,
    ) -> Result<Self, SettingsError> {
        validate_endpoint("facebook.graph_api_base", graph_api_base)?;
        let base = graph_api_base.trim_end_matches('/');

        Ok(Self {
            http,
            client_id,
            client_secret,
            token_url: format!("{base}/oauth/access_token"),
            me_url: format!("{base}/me"),
            profile_fields: format!(
                "email,name,picture.width({picture_size}).height({picture_size})"
            ),
        })
    }

    /// Create a client from settings, resolving credentials from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client id or client secret is not configured
    /// - The Graph API base URL is invalid
    pub fn from_settings(
        settings: &FacebookSettings,
        http: reqwest::Client,
    ) -> Result<Self, SettingsError> {
        let client_id = settings.get_client_id().ok_or_else(|| {
            SettingsError::MissingCredential("facebook client_id".to_string())
        })?;
        let client_secret = settings.get_client_secret().ok_or_else(|| {
            SettingsError::MissingCredential("facebook client_secret".to_string())
        })?;

        Self::new(
            http,
            client_id,
            client_secret,
            &settings.graph_api_base,
            settings.picture_size,
        )
    }

    /// Trade a short-lived user token for a long-lived one
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the response has no `access_token`
    pub async fn exchange_token(&self, access_token: &str) -> Result<String, AuthError> {
        let response: ExchangeTokenResponse = fetch_json(
            &self.http,
            PROVIDER,
            &self.token_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "fb_exchange_token"),
                ("fb_exchange_token", access_token),
            ],
        )
        .await?;

        match response.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(response.error.into_auth_error()),
        }
    }

    /// Read `/me` with an exchanged token
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the response has no `id`
    pub async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedUser, AuthError> {
        let me: MeResponse = fetch_json(
            &self.http,
            PROVIDER,
            &self.me_url,
            &[
                ("fields", self.profile_fields.as_str()),
                ("access_token", access_token),
            ],
        )
        .await?;

        let Some(id) = me.id.filter(|id| !id.is_empty()) else {
            return Err(me.error.into_auth_error());
        };

        // picture is requested for parity with the web client but not returned
        LoggingHelper::log_picture_discarded(PROVIDER, me.picture.is_some());

        Ok(NormalizedUser {
            username: me.email.unwrap_or_default(),
            display_name: me.name.unwrap_or_default(),
            oauth_source: PROVIDER,
            oauth_id: id,
        })
    }
}

#[async_trait]
impl LoginProvider for FacebookClient {
    fn source(&self) -> OAuthSource {
        PROVIDER
    }

    async fn authenticate(&self, access_token: &str) -> Result<NormalizedUser, AuthError> {
        let long_lived = self.exchange_token(access_token).await?;
        self.fetch_profile(&long_lived).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> FacebookClient {
        FacebookClient::new(
            reqwest::Client::new(),
            "fb-client-id".to_string(),
            "fb-client-secret".to_string(),
            &server.base_url(),
            200,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_exchanges_then_fetches_profile() {
        let server = MockServer::start_async().await;
        let exchange = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/oauth/access_token")
                    .query_param("client_id", "fb-client-id")
                    .query_param("client_secret", "fb-client-secret")
                    .query_param("grant_type", "fb_exchange_token")
                    .query_param("fb_exchange_token", "tok123");
                then.status(200).json_body(json!({
                    "access_token": "exch1",
                    "token_type": "bearer",
                    "expires_in": 5_183_944
                }));
            })
            .await;
        let me = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/me")
                    .query_param("fields", "email,name,picture.width(200).height(200)")
                    .query_param("access_token", "exch1");
                then.status(200).json_body(json!({
                    "id": "fb42",
                    "name": "Ann",
                    "email": "a@x.com",
                    "picture": {"data": {"height": 200, "width": 200, "url": "https://x/p.png", "is_silhouette": false}}
                }));
            })
            .await;

        let user = client_for(&server).authenticate("tok123").await.unwrap();

        exchange.assert_async().await;
        me.assert_async().await;
        assert_eq!(
            user,
            NormalizedUser {
                username: "a@x.com".to_string(),
                display_name: "Ann".to_string(),
                oauth_source: OAuthSource::Facebook,
                oauth_id: "fb42".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_exchange_error_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/oauth/access_token");
                then.status(400).json_body(json!({
                    "error": {
                        "message": "Error validating access token",
                        "type": "OAuthException",
                        "code": 190,
                        "fbtrace_id": "AbC"
                    }
                }));
            })
            .await;
        let me = server
            .mock_async(|when, then| {
                when.method(GET).path("/me");
                then.status(200).json_body(json!({"id": "fb42"}));
            })
            .await;

        let err = client_for(&server).authenticate("bad").await.unwrap_err();

        assert_eq!(me.hits_async().await, 0);
        match err {
            AuthError::ProviderAuth {
                provider,
                detail,
                envelope,
            } => {
                assert_eq!(provider, OAuthSource::Facebook);
                assert_eq!(envelope.code, "190");
                assert_eq!(detail, "[Code:190] Error validating access token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_profile_without_id_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/me");
                then.status(400).json_body(json!({
                    "error": {"code": 190, "message": "Invalid token"}
                }));
            })
            .await;

        let err = client_for(&server).fetch_profile("exch1").await.unwrap_err();

        match err {
            AuthError::ProviderAuth { envelope, .. } => {
                assert_eq!(envelope, ProviderErrorEnvelope::new("190", "Invalid token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/me");
                then.status(200).json_body(json!({"id": "", "name": "Ann"}));
            })
            .await;

        let err = client_for(&server).fetch_profile("exch1").await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderAuth { .. }));
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/oauth/access_token");
                then.status(502).body("<html>Bad Gateway</html>");
            })
            .await;

        let err = client_for(&server).exchange_token("tok").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Decode {
                provider: OAuthSource::Facebook,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        // Port 1 on loopback refuses connections
        let client = FacebookClient::new(
            reqwest::Client::new(),
            "id".to_string(),
            "secret".to_string(),
            "http://127.0.0.1:1",
            200,
        )
        .unwrap();

        let err = client.exchange_token("user-token").await.unwrap_err();
        assert!(matches!(err, AuthError::Transport { .. }));

        let message = err.to_string();
        assert!(!message.contains("secret"), "{message}");
        assert!(!message.contains("user-token"), "{message}");
    }

    #[test]
    fn test_custom_picture_size_and_trailing_slash() {
        let client = FacebookClient::new(
            reqwest::Client::new(),
            "id".to_string(),
            "secret".to_string(),
            "https://graph.facebook.com/v4.0/",
            100,
        )
        .unwrap();
        assert_eq!(client.me_url, "https://graph.facebook.com/v4.0/me");
        assert_eq!(
            client.profile_fields,
            "email,name,picture.width(100).height(100)"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = FacebookClient::new(
            reqwest::Client::new(),
            "id".to_string(),
            "secret".to_string(),
            "not a url",
            200,
        );
        assert!(matches!(result, Err(SettingsError::InvalidUrl { .. })));
    }

    #[test]
    fn test_from_settings_requires_secret() {
        let settings = FacebookSettings {
            client_id: Some("id".to_string()),
            client_id_env: None,
            client_secret_env: None,
            ..Default::default()
        };
        let result = FacebookClient::from_settings(&settings, reqwest::Client::new());
        assert!(matches!(result, Err(SettingsError::MissingCredential(_))));
    }
}
