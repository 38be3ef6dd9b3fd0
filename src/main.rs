#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use actix_web::{middleware::Logger, web, App, HttpServer};
use oauth_gateway::{
    configure_services, cors_middleware, settings::GatewaySettings, LoginDispatcher, VERSION,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = GatewaySettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let dispatcher = LoginDispatcher::from_settings(&settings)
        .map_err(|e| std::io::Error::other(format!("Failed to initialize OAuth providers: {e}")))?;

    start_server(dispatcher, settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(dispatcher: LoginDispatcher, settings: GatewaySettings) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let dispatcher = web::Data::new(dispatcher);
    let shared_settings = web::Data::new(settings);

    HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .app_data(shared_settings.clone())
            .wrap(cors_middleware(&shared_settings.cors))
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &GatewaySettings) {
    println!("Starting OAuth login gateway {VERSION} on http://{bind_address}");
    println!();
    println!("Endpoints:");
    println!("  POST /login - Exchange a Facebook (1) or Google (2) access token for a user profile");
    println!("  GET  /ping  - Health check");
    println!();
    println!("Providers:");
    println!("  Facebook Graph API: {}", settings.facebook.graph_api_base);
    println!("  Google tokeninfo:   {}", settings.google.tokeninfo_endpoint);
    println!("  Google userinfo:    {}", settings.google.userinfo_endpoint);
    println!();
    println!(
        "Unknown oauthSource policy: {}",
        settings.application.unknown_source
    );
    println!("CORS allowed origins: {}", settings.cors.allow_origin);
}
