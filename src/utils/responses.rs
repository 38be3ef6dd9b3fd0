//! HTTP response handling
//!
//! Uniform construction of JSON success and error responses. Error bodies
//! always have the shape `{ "error": <code>, "message": <text> }`.

use crate::error::AuthError;
use crate::settings::CorsSettings;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde_json::{json, Value};

/// Pre-serialized body for the route fallback
static NOT_FOUND_BODY: std::sync::LazyLock<String> = std::sync::LazyLock::new(|| {
    json!({
        "error": "not_found",
        "message": "The requested resource does not exist"
    })
    .to_string()
});

/// Unified response builder
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Start an error response with its status, error code and message
    #[must_use]
    pub fn error(status: StatusCode, code: &str, message: &str) -> ErrorResponseBuilder {
        ErrorResponseBuilder {
            status,
            error_code: code.to_string(),
            message: message.to_string(),
            additional_fields: None,
        }
    }

    /// Error response for a failed login
    #[must_use]
    pub fn from_auth_error(error: &AuthError) -> HttpResponse {
        let builder = Self::error(error.status_code(), error.error_code(), &error.to_string());

        match error {
            AuthError::ProviderAuth {
                provider, envelope, ..
            } => builder
                .with_additional_fields(json!({
                    "provider": provider.name(),
                    "provider_code": envelope.code,
                }))
                .build(),
            _ => builder.build(),
        }
    }

    /// Create an OK response (200) with JSON content
    #[must_use]
    pub fn ok() -> JsonResponseBuilder {
        JsonResponseBuilder::new(StatusCode::OK)
    }

    #[must_use]
    pub fn not_found() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(NOT_FOUND_BODY.as_str())
    }
}

/// Builder for error responses with fluent interface
pub struct ErrorResponseBuilder {
    status: StatusCode,
    error_code: String,
    message: String,
    additional_fields: Option<Value>,
}

impl ErrorResponseBuilder {
    /// Add additional JSON fields to the response
    #[must_use]
    pub fn with_additional_fields(mut self, fields: Value) -> Self {
        self.additional_fields = Some(fields);
        self
    }

    #[must_use]
    pub fn build(self) -> HttpResponse {
        let mut json_body = json!({
            "error": self.error_code,
            "message": self.message,
        });

        if let Some(Value::Object(map)) = self.additional_fields {
            for (key, value) in map {
                json_body[key] = value;
            }
        }

        HttpResponse::build(self.status)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .json(json_body)
    }
}

/// Builder for JSON responses
pub struct JsonResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
}

impl JsonResponseBuilder {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    /// Add a custom header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach the configured CORS headers
    ///
    /// `Access-Control-Allow-Origin` is only set here for the wildcard; a
    /// specific origin list is echoed per request by the CORS middleware.
    #[must_use]
    pub fn with_cors(mut self, cors: &CorsSettings) -> Self {
        if cors.allows_any_origin() {
            self = self.with_header("Access-Control-Allow-Origin", "*");
        }
        self.with_header("Access-Control-Allow-Methods", &cors.allow_methods.join(", "))
            .with_header("Access-Control-Allow-Headers", &cors.allow_headers.join(", "))
    }

    /// Build the response with JSON content
    #[must_use]
    pub fn json<T: serde::Serialize>(self, data: &T) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status);

        for (name, value) in self.headers {
            builder.insert_header((name, value));
        }

        builder.json(data)
    }
}
