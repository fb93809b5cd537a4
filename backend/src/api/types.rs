//! REST API response types.
//!
//! Successful responses are the records themselves; this module holds the
//! service status body and the error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::logs::log_error;
use crate::error::{PipelineError, ServerError};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub group_licenses: bool,
    pub validate_output: bool,
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ServerError::BadRequest(message) => error_response(message),
            ServerError::Pipeline(PipelineError::ResponseValidation { errors }) => {
                for error in errors.iter().take(5) {
                    log_error(format!("response validation: {}", error));
                }
                error_response("Internal Server Error")
            }
            ServerError::Pipeline(other) => {
                log_error(other.to_string());
                error_response("Internal Server Error")
            }
        };

        (status, Json(body)).into_response()
    }
}
