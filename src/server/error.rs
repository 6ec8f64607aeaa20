//! API error type and its HTTP mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

use crate::drafting::DraftError;
use crate::store::StoreError;

/// Errors surfaced by API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Admin login required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Body(#[from] JsonRejection),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Draft(DraftError::Disabled) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Draft(DraftError::EmptyInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Draft(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Per-field messages for validation failures
    fn field_errors(&self) -> Option<BTreeMap<String, Vec<String>>> {
        let ApiError::Validation(errors) = self else {
            return None;
        };
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Some(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let mut body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        if let Some(fields) = self.field_errors() {
            body["fields"] = serde_json::json!(fields);
        }

        (status, Json(body)).into_response()
    }
}
