use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pagination::ConfigError;
use crate::render::RenderError;
use crate::template::TemplateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Pagination config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render failure: {0}")]
    Render(RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::NotFound(name) => AppError::TemplateNotFound(name),
            TemplateError::InvalidName(name) => {
                AppError::Validation(format!("Invalid template name: {name}"))
            }
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::TemplateNotFound(name) => (
                StatusCode::NOT_FOUND,
                "TEMPLATE_NOT_FOUND",
                format!("Template not found: {name}"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Config(e) => (StatusCode::BAD_REQUEST, "CONFIG_ERROR", e.to_string()),
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (StatusCode::BAD_GATEWAY, "RENDER_FAILURE", e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_errors_map_to_app_errors() {
        let not_found: AppError = TemplateError::NotFound("invoice".to_string()).into();
        assert!(matches!(not_found, AppError::TemplateNotFound(ref n) if n == "invoice"));

        let invalid: AppError = TemplateError::InvalidName("../x".to_string()).into();
        assert!(matches!(invalid, AppError::Validation(_)));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::TemplateNotFound("x".to_string()), StatusCode::NOT_FOUND),
            (AppError::Config(ConfigError::EmptyPrefix), StatusCode::BAD_REQUEST),
            (AppError::Render(RenderError::NoPages), StatusCode::BAD_GATEWAY),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
