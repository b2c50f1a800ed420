//! Error responses of the read API

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Status written into error envelopes
pub const ERROR_STATUS: &str = "ERROR_RETRIEVING_DATA";

/// Message written into error envelopes
pub const ERROR_MESSAGE: &str = "There was an error retrieving the requested data";

/// Terminal outcome of a request stage
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or wrong Basic-auth credentials
    #[error("Incorrect username or password")]
    Unauthorized,

    /// A rate-limit window for the caller is exhausted
    #[error("Rate limit exceeded: {limit} per {window}")]
    RateLimited {
        /// Allowed requests in the window
        limit: u32,
        /// Window name, `second` or `minute`
        window: &'static str,
    },

    /// Request body could not be understood
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Query against the store failed
    #[error("Query failed: {0}")]
    Store(#[from] sales_data_store::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "detail": self.to_string() })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
                response
            }
            ApiError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::InvalidRequest(_) | ApiError::Store(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "data": null,
                        "status": ERROR_STATUS,
                        "message": ERROR_MESSAGE,
                    })),
                )
                    .into_response()
            }
        }
    }
}
