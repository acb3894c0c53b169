use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skyport_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    AuthorizationError(String),
    #[error("{field}: {message}")]
    ValidationError { field: String, message: String },
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::ValidationError { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "field": field }),
            ),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => AppError::ValidationError {
                field: e.field,
                message: e.message,
            },
            e @ CoreError::NotFound { .. } => AppError::NotFoundError(e.to_string()),
            CoreError::Conflict(msg) => AppError::ConflictError(msg),
            CoreError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<skyport_core::ValidationError> for AppError {
    fn from(err: skyport_core::ValidationError) -> Self {
        CoreError::Validation(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyport_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CoreError::Validation(ValidationError::new("row", "bad")), StatusCode::BAD_REQUEST),
            (CoreError::not_found("Flight", "x"), StatusCode::NOT_FOUND),
            (CoreError::Conflict("taken".into()), StatusCode::CONFLICT),
            (CoreError::Storage("db down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
