use super::{build_http_client, FacebookClient, GoogleClient, LoginProvider};
use crate::error::AuthError;
use crate::models::{LoginRequest, NormalizedUser, OAuthSource};
use crate::settings::{GatewaySettings, SettingsError};
use crate::utils::logging::LoggingHelper;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Handling of an `oauthSource` tag that names no known provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSourcePolicy {
    /// Fail the login with a 400
    #[default]
    Reject,
    /// Treat the request as a Google login (legacy clients rely on this)
    Google,
}

impl FromStr for UnknownSourcePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "google" => Ok(Self::Google),
            other => Err(format!(
                "unknown policy '{other}', expected 'reject' or 'google'"
            )),
        }
    }
}

impl fmt::Display for UnknownSourcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::Google => f.write_str("google"),
        }
    }
}

/// Routes login requests to the provider named by `oauthSource`
#[derive(Clone)]
pub struct LoginDispatcher {
    facebook: Arc<dyn LoginProvider>,
    google: Arc<dyn LoginProvider>,
    unknown_source: UnknownSourcePolicy,
}

impl LoginDispatcher {
    #[must_use]
    pub fn new(
        facebook: Arc<dyn LoginProvider>,
        google: Arc<dyn LoginProvider>,
        unknown_source: UnknownSourcePolicy,
    ) -> Self {
        Self {
            facebook,
            google,
            unknown_source,
        }
    }

    /// Build both provider clients from settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP client cannot be built
    /// - A provider's credentials are missing
    /// - A provider endpoint URL is invalid
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, SettingsError> {
        LoggingHelper::log_provider_initialization();
        let http = build_http_client()?;

        let facebook = FacebookClient::from_settings(&settings.facebook, http.clone())?;
        LoggingHelper::log_provider_configured(
            OAuthSource::Facebook,
            &settings.facebook.graph_api_base,
        );

        let google = GoogleClient::from_settings(&settings.google, http)?;
        LoggingHelper::log_provider_configured(
            OAuthSource::Google,
            &settings.google.tokeninfo_endpoint,
        );

        LoggingHelper::log_unknown_source_policy(settings.application.unknown_source);

        Ok(Self::new(
            Arc::new(facebook),
            Arc::new(google),
            settings.application.unknown_source,
        ))
    }

    #[must_use]
    pub fn unknown_source_policy(&self) -> UnknownSourcePolicy {
        self.unknown_source
    }

    /// Pick the provider for a raw `oauthSource` tag
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownSource` if the tag is unknown and the
    /// policy is [`UnknownSourcePolicy::Reject`]
    pub fn route(&self, oauth_source: i64) -> Result<&dyn LoginProvider, AuthError> {
        match OAuthSource::from_tag(oauth_source) {
            Some(OAuthSource::Facebook) => Ok(self.facebook.as_ref()),
            Some(OAuthSource::Google) => Ok(self.google.as_ref()),
            None => match self.unknown_source {
                UnknownSourcePolicy::Reject => Err(AuthError::UnknownSource(oauth_source)),
                UnknownSourcePolicy::Google => {
                    LoggingHelper::log_unknown_source_fallback(oauth_source);
                    Ok(self.google.as_ref())
                }
            },
        }
    }

    /// Authenticate with the selected provider and return its result unchanged
    ///
    /// # Errors
    ///
    /// Returns an error if the source is rejected or the provider login fails
    pub async fn login(&self, request: &LoginRequest) -> Result<NormalizedUser, AuthError> {
        let provider = self.route(request.oauth_source)?;
        provider.authenticate(&request.access_token).await
    }
}

impl fmt::Debug for LoginDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginDispatcher")
            .field("facebook", &self.facebook.source())
            .field("google", &self.google.source())
            .field("unknown_source", &self.unknown_source)
            .finish()
    }
}
