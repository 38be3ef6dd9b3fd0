#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the gateway
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use error::{AuthError, ProviderErrorEnvelope};
pub use handlers::{configure_services, cors_middleware, health, login};
pub use models::{LoginRequest, NormalizedUser, OAuthSource};
pub use oauth::{LoginDispatcher, LoginProvider, UnknownSourcePolicy};
pub use settings::GatewaySettings;
