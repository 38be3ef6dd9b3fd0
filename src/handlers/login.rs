use crate::error::AuthError;
use crate::models::LoginRequest;
use crate::oauth::LoginDispatcher;
use crate::settings::GatewaySettings;
use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;
use actix_web::{web, HttpResponse, Result};

/// Decode a `POST /login` body
///
/// # Errors
///
/// Returns `AuthError::RequestParse` if the body is not a valid
/// `LoginRequest` or the access token is empty
pub fn parse_login_request(body: &[u8]) -> Result<LoginRequest, AuthError> {
    let request: LoginRequest =
        serde_json::from_slice(body).map_err(|e| AuthError::RequestParse(e.to_string()))?;

    if request.access_token.trim().is_empty() {
        return Err(AuthError::RequestParse(
            "accessToken must not be empty".to_string(),
        ));
    }

    Ok(request)
}

/// Exchange a provider access token for a normalized user
///
/// # Errors
///
/// Never fails at the actix level; login failures are mapped to JSON error
/// responses with a 4xx/5xx status
pub async fn login(
    body: web::Bytes,
    dispatcher: web::Data<LoginDispatcher>,
    settings: web::Data<GatewaySettings>,
) -> Result<HttpResponse> {
    let request = match parse_login_request(&body) {
        Ok(request) => request,
        Err(e) => {
            log::debug!("Rejecting login request: {e}");
            return Ok(ResponseBuilder::from_auth_error(&e));
        }
    };

    match dispatcher.login(&request).await {
        Ok(user) => {
            LoggingHelper::log_login_success(&user);
            Ok(ResponseBuilder::ok().with_cors(&settings.cors).json(&user))
        }
        Err(e) => {
            LoggingHelper::log_login_failure(request.oauth_source, &e);
            Ok(ResponseBuilder::from_auth_error(&e))
        }
    }
}
