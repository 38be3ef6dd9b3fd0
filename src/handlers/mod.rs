// HTTP request handlers for the login gateway
pub mod health;
pub mod login;

pub use health::{health, not_found};
pub use login::{login, parse_login_request};

use crate::settings::CorsSettings;
use actix_cors::Cors;
use actix_web::web;

/// Register all routes
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login))
        .route("/ping", web::get().to(health))
        .default_service(web::route().to(not_found));
}

/// CORS middleware matching the configured origins, methods and headers
#[must_use]
pub fn cors_middleware(settings: &CorsSettings) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(settings.allow_methods.iter().map(String::as_str))
        .allowed_headers(settings.allow_headers.iter().map(String::as_str))
        .max_age(settings.max_age_secs);

    if settings.allows_any_origin() {
        cors = cors.allow_any_origin().send_wildcard();
    } else {
        for origin in settings.origins() {
            cors = cors.allowed_origin(&origin);
        }
    }

    cors
}
