//! Error handling for the application

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::shipping::responses::ShippingErrorResponse;
use crate::shipping::ShippingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Shipping(#[from] ShippingError),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Shipping(ShippingError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            AppError::Shipping(ShippingError::ConfigurationError { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::Shipping(err) => err.error_type(),
            AppError::MalformedRequest(_) => "InvalidInput",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, details) = match &self {
            AppError::Shipping(err) => {
                tracing::warn!("Shipping request rejected: {}", err);
                (err.to_string(), Some(serde_json::json!({ "errors": err.errors() })))
            }
            AppError::MalformedRequest(reason) => {
                tracing::warn!("Malformed request: {}", reason);
                (
                    "Malformed request body".to_string(),
                    Some(serde_json::json!({ "reason": reason })),
                )
            }
        };

        let body = ShippingErrorResponse {
            success: false,
            error_type: self.error_type().to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
