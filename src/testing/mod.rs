//! Testing utilities for the login gateway
//!
//! - [`fixtures`] - Settings and users pointed at a local mock provider
//! - [`mock`] - In-memory [`LoginProvider`](crate::oauth::LoginProvider) fakes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_gateway::models::OAuthSource;
//! use oauth_gateway::testing::{fixtures::TestFixtures, mock::MockProvider};
//!
//! let settings = TestFixtures::settings_for("http://127.0.0.1:9999");
//! assert_eq!(settings.google.client_id.as_deref(), Some("test-google-client"));
//!
//! let provider = MockProvider::succeeding(OAuthSource::Google);
//! assert!(provider.calls().is_empty());
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::MockProvider;

/// Common test constants
pub mod constants {
    /// Access token sent by test clients
    pub const TEST_ACCESS_TOKEN: &str = "tok123";

    /// Long-lived token handed out by the mock Facebook exchange
    pub const TEST_LONG_LIVED_TOKEN: &str = "LL";

    pub const TEST_FACEBOOK_CLIENT_ID: &str = "test-facebook-client";
    pub const TEST_FACEBOOK_CLIENT_SECRET: &str = "test-facebook-secret";
    pub const TEST_GOOGLE_CLIENT_ID: &str = "test-google-client";

    /// Default test email address
    pub const TEST_EMAIL: &str = "test@example.com";

    /// Default test user name
    pub const TEST_USER_NAME: &str = "Test User";

    /// Default test provider user id
    pub const TEST_PROVIDER_ID: &str = "123456789";
}
