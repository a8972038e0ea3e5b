use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::domain::error::DomainError;
use crate::infrastructure::media::MediaError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedType | MediaError::TooLarge { .. } => {
                AppError::BadRequest(err.to_string())
            }
            MediaError::Io(io) => AppError::Internal(io.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FieldErrorDto {
    pub(crate) field: String,
    pub(crate) message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) success: bool,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) errors: Option<Vec<FieldErrorDto>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Domain(err) => {
                let status = match &err {
                    DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
                    DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
                    DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::Forbidden => StatusCode::FORBIDDEN,
                    DomainError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    "internal error".to_string()
                } else {
                    err.to_string()
                };
                (status, message, None)
            }
            AppError::Validation(errs) => (
                StatusCode::BAD_REQUEST,
                "validation failed".to_string(),
                Some(field_errors(&errs)),
            ),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None)
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
                None,
            ),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
                errors,
            }),
        )
            .into_response()
    }
}

fn field_errors(errs: &ValidationErrors) -> Vec<FieldErrorDto> {
    errs.field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(|error| FieldErrorDto {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string()),
            })
        })
        .collect()
}
