//! Fake login providers for dispatcher and handler tests

use crate::error::{AuthError, ProviderErrorEnvelope};
use crate::models::{NormalizedUser, OAuthSource};
use crate::oauth::LoginProvider;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::fixtures::TestFixtures;

#[derive(Debug, Clone)]
enum Outcome {
    Succeed,
    Reject(ProviderErrorEnvelope),
    FailVerification,
}

/// Provider that answers without network access and records every token it sees
///
/// Clones share the call log, so a test can keep one handle while the
/// dispatcher owns another.
#[derive(Debug, Clone)]
pub struct MockProvider {
    source: OAuthSource,
    outcome: Outcome,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    fn with_outcome(source: OAuthSource, outcome: Outcome) -> Self {
        Self {
            source,
            outcome,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always returns the fixture user for `source`
    #[must_use]
    pub fn succeeding(source: OAuthSource) -> Self {
        Self::with_outcome(source, Outcome::Succeed)
    }

    /// Always fails with a provider error carrying `code` and `message`
    #[must_use]
    pub fn rejecting(source: OAuthSource, code: &str, message: &str) -> Self {
        Self::with_outcome(
            source,
            Outcome::Reject(ProviderErrorEnvelope::new(code, message)),
        )
    }

    /// Always fails the audience check
    #[must_use]
    pub fn failing_verification(source: OAuthSource) -> Self {
        Self::with_outcome(source, Outcome::FailVerification)
    }

    /// Tokens passed to `authenticate`, in call order
    ///
    /// # Panics
    ///
    /// Panics if the call log mutex is poisoned
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoginProvider for MockProvider {
    fn source(&self) -> OAuthSource {
        self.source
    }

    async fn authenticate(&self, access_token: &str) -> Result<NormalizedUser, AuthError> {
        self.calls.lock().unwrap().push(access_token.to_string());

        match &self.outcome {
            Outcome::Succeed => Ok(TestFixtures::normalized_user(self.source)),
            Outcome::Reject(envelope) => Err(AuthError::provider(self.source, envelope.clone())),
            Outcome::FailVerification => Err(AuthError::Verification),
        }
    }
}
