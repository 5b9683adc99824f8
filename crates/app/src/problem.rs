use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::service::EmployeeServiceError;

/// Structured failure payload returned by every erroring endpoint.
#[derive(Debug, Serialize)]
struct ErrorBody {
    timestamp: DateTime<Utc>,
    status: u16,
    error: &'static str,
    message: String,
}

pub struct ErrorResponse {
    status: StatusCode,
    body: ErrorBody,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(status: StatusCode, error: &'static str, message: S) -> Self {
        Self {
            status,
            body: ErrorBody {
                timestamp: Utc::now(),
                status: status.as_u16(),
                error,
                message: message.into(),
            },
        }
    }
}

impl From<EmployeeServiceError> for ErrorResponse {
    fn from(err: EmployeeServiceError) -> Self {
        let status = match err {
            EmployeeServiceError::InvalidData(_) => StatusCode::BAD_REQUEST,
            EmployeeServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            EmployeeServiceError::AlreadyExists(_) => StatusCode::CONFLICT,
            EmployeeServiceError::Operation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.kind(), err.to_string())
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let mut response = Json(self.body).into_response();
        *response.status_mut() = self.status;
        response
    }
}
