use crate::models::HealthResponse;
use actix_web::{HttpResponse, Result};

/// Health check endpoint
///
/// # Errors
///
/// This function currently never returns an error
pub async fn health() -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "OAuth login gateway is running".to_string(),
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Fallback for unknown routes
///
/// # Errors
///
/// This function currently never returns an error
pub async fn not_found() -> Result<HttpResponse> {
    Ok(crate::utils::responses::ResponseBuilder::not_found())
}
