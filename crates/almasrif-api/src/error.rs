use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use almasrif_types::api::ErrorResponse;

/// The only message a user ever sees on a failed login.
pub const LOGIN_FAILED_MESSAGE: &str = "رقم الجوال أو الكود غير صحيح";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("phone number or code incorrect")]
    InvalidCredentials,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            error!("{:#}", e);
        }

        let body = ErrorResponse {
            error: LOGIN_FAILED_MESSAGE.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
