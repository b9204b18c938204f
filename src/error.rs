use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Request payload failed validation (missing field, bad number, quantity < 1)
    Validation(String),
    /// A supplied option value has no entry in its cost table
    InvalidSelection { field: String, value: String },
    /// Non-identity conversion requested without a rates API key configured
    MissingCredential,
    /// External rate source failed (network, timeout, non-success response)
    RateSource(String),
    /// Requested currency absent from the rate snapshot
    UnknownCurrency(String),
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{}", msg),
            Self::InvalidSelection { field, value } => {
                write!(f, "Invalid selection: {} has no cost entry for '{}'", field, value)
            }
            Self::MissingCredential => {
                write!(f, "Rates API key is not configured (needed for non-USD conversions)")
            }
            Self::RateSource(msg) => write!(f, "Rate source error: {}", msg),
            Self::UnknownCurrency(code) => write!(f, "Missing rate for {}", code),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSelection { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownCurrency(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateSource(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::Validation(_) => "validation_error",
        AppError::InvalidSelection { .. } => "invalid_selection",
        AppError::MissingCredential => "missing_credential",
        AppError::RateSource(_) => "rate_source_error",
        AppError::UnknownCurrency(_) => "unknown_currency",
        AppError::Database(_) => "database_error",
        AppError::Internal(_) => "internal_error",
    }
}

// Implement conversions from common error types
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::RateSource(err.to_string())
    }
}
