// Centralized logging for provider calls and login outcomes.
// Access tokens and raw provider bodies never reach the log.
use crate::error::AuthError;
use crate::models::{NormalizedUser, OAuthSource};
use crate::oauth::UnknownSourcePolicy;
use log::{debug, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log OAuth provider initialization start
    pub fn log_provider_initialization() {
        info!("🔧 Initializing OAuth providers from configuration...");
    }

    /// Log that a provider is configured
    pub fn log_provider_configured(provider: OAuthSource, endpoint: &str) {
        info!("✅ {provider} login configured ({endpoint})");
    }

    pub fn log_unknown_source_policy(policy: UnknownSourcePolicy) {
        if policy == UnknownSourcePolicy::Google {
            warn!("⚠️  Unknown oauthSource values will be treated as Google logins");
        } else {
            info!("🎯 Unknown oauthSource values will be rejected");
        }
    }

    pub fn log_unknown_source_fallback(oauth_source: i64) {
        warn!("Unknown oauthSource {oauth_source}, falling back to Google");
    }

    /// Log an outbound provider call (the URL never carries the token; it goes in the query)
    pub fn log_provider_request(provider: OAuthSource, url: &str) {
        debug!("🔄 Calling {provider} endpoint {url}");
    }

    pub fn log_provider_response(provider: OAuthSource, url: &str, status: u16, body_len: usize) {
        debug!("{provider} endpoint {url} answered {status} ({body_len} bytes)");
    }

    pub fn log_picture_discarded(provider: OAuthSource, present: bool) {
        debug!("{provider} profile picture present: {present} (not returned)");
    }

    pub fn log_audience_mismatch(aud: &str, azp: Option<&str>) {
        warn!("Google token audience mismatch: aud={aud}, azp={azp:?}");
    }

    /// Log login success
    pub fn log_login_success(user: &NormalizedUser) {
        info!(
            "Login succeeded for {} user {} ({})",
            user.oauth_source, user.oauth_id, user.username
        );
    }

    pub fn log_login_failure(oauth_source: i64, error: &AuthError) {
        warn!("Login failed for oauthSource {oauth_source}: {error}");
    }
}
