use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    InvalidTimeRange(String),
    #[error("{0}")]
    ResourceUnavailable(String),
    #[error("{0}")]
    CapacityExceeded(String),
    #[error("{0}")]
    SlotAlreadyBooked(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("許可されていない操作です。")]
    ForbiddenOperation,
    #[error("認証情報が不足しているか、誤っています。")]
    UnauthenticatedError,
    #[error("{0}")]
    ConversionEntityError(String),
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            AppError::UnprocessableEntity(_)
            | AppError::InvalidTimeRange(_)
            | AppError::ResourceUnavailable(_)
            | AppError::CapacityExceeded(_)
            | AppError::SlotAlreadyBooked(_)
            | AppError::InvalidTransition(_)
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthenticatedError => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            e @ (AppError::ConversionEntityError(_)
            | AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        (status_code, self.to_string()).into_response()
    }
}
