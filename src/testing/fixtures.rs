//! Pre-built settings and users
//!
//! Settings fixtures point both providers at a single base URL so one
//! `httpmock` server can stand in for Facebook and Google at once.

use crate::models::{NormalizedUser, OAuthSource};
use crate::oauth::UnknownSourcePolicy;
use crate::settings::{FacebookSettings, GatewaySettings, GoogleSettings};

use super::constants::{
    TEST_EMAIL, TEST_FACEBOOK_CLIENT_ID, TEST_FACEBOOK_CLIENT_SECRET, TEST_GOOGLE_CLIENT_ID,
    TEST_PROVIDER_ID, TEST_USER_NAME,
};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Settings with inline credentials and every provider endpoint under `base_url`
    ///
    /// Credential env var names are cleared so the host environment cannot leak in.
    /// Facebook is served from `{base_url}` (`/oauth/access_token`, `/me`),
    /// Google from `{base_url}/tokeninfo` and `{base_url}/oauth2/v2/userinfo`.
    #[must_use]
    pub fn settings_for(base_url: &str) -> GatewaySettings {
        let base = base_url.trim_end_matches('/');
        let mut settings = GatewaySettings {
            facebook: FacebookSettings {
                client_id: Some(TEST_FACEBOOK_CLIENT_ID.to_string()),
                client_secret: Some(TEST_FACEBOOK_CLIENT_SECRET.to_string()),
                client_id_env: None,
                client_secret_env: None,
                graph_api_base: base.to_string(),
                ..FacebookSettings::default()
            },
            google: GoogleSettings {
                client_id: Some(TEST_GOOGLE_CLIENT_ID.to_string()),
                client_id_env: None,
                tokeninfo_endpoint: format!("{base}/tokeninfo"),
                userinfo_endpoint: format!("{base}/oauth2/v2/userinfo"),
            },
            ..GatewaySettings::default()
        };
        settings.application.host = "127.0.0.1".to_string();
        settings
    }

    /// Same as [`Self::settings_for`] with a specific unknown-source policy
    #[must_use]
    pub fn settings_with_policy(base_url: &str, policy: UnknownSourcePolicy) -> GatewaySettings {
        let mut settings = Self::settings_for(base_url);
        settings.application.unknown_source = policy;
        settings
    }

    /// The user a [`MockProvider`](super::mock::MockProvider) returns
    #[must_use]
    pub fn normalized_user(source: OAuthSource) -> NormalizedUser {
        NormalizedUser {
            username: TEST_EMAIL.to_string(),
            display_name: TEST_USER_NAME.to_string(),
            oauth_source: source,
            oauth_id: TEST_PROVIDER_ID.to_string(),
        }
    }
}
