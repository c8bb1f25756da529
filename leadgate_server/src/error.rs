use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use leadgate_core::error as core_error;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] leadgate_core::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err {
                core_error::Error::MissingIdentity | core_error::Error::InvalidPayload(_) => {
                    StatusCode::BAD_REQUEST
                }
                core_error::Error::SignatureVerificationFailed => StatusCode::UNAUTHORIZED,
                core_error::Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                // Any CRM failure maps uniformly to 500: the sender's own
                // backoff owns the retry.
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (code, Json(body)).into_response()
    }
}
