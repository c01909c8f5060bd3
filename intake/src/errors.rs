use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sheets::SheetsError;
use thiserror::Error;

/// Errors returned to the client of `POST /submit-payment/`.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Invalid tag. Use HSC26, HSC25, SSC26, or SSC27.")]
    InvalidTag(String),

    #[error("{0}")]
    InvalidBody(String),

    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

impl IntakeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntakeError::InvalidTag(_) => StatusCode::BAD_REQUEST,
            IntakeError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IntakeError::Sheets(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ApiErrorResponse {
    detail: String,
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Failed to save payment");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Rejected payment");
        }

        let body = Json(ApiErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}
