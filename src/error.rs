use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request body is required")]
    BodyRequired,

    #[error("Invalid JSON in request body")]
    InvalidJson,

    #[error("Invalid request body. Expected: {{ name: string, email: string }}")]
    InvalidBody,

    #[error("Failed to save design details")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BodyRequired | AppError::InvalidJson | AppError::InvalidBody => {
                StatusCode::BAD_REQUEST
            }
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
