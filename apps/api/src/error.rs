use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fieldward_core::AppError;

mod types;

use types::{ErrorResponse, ValidationIssueResponse};

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) | AppError::InvalidRole(_) | AppError::ProtectedRole(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::UnknownField(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(code = self.0.code(), error = %self.0, "request failed");
        }

        let issues = match &self.0 {
            AppError::ValidationFailed(issues) => Some(
                issues
                    .iter()
                    .map(ValidationIssueResponse::from)
                    .collect(),
            ),
            _ => None,
        };

        let payload = Json(ErrorResponse::new(
            self.0.code(),
            self.0.to_string(),
            issues,
        ));

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
