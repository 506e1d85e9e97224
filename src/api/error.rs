use crate::application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 400 Bad Request - 入力検証エラー
            ApplicationError::Validation(ref e) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }

            // 404 Not Found - リクエストされたリソースが存在しない
            ref e @ ApplicationError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }

            // 409 Conflict - 現在の状態では実行できない
            ref e @ ApplicationError::Conflict(_) => {
                (StatusCode::CONFLICT, "CONFLICT", e.to_string())
            }
            ref e @ ApplicationError::NoCopiesAvailable(_) => {
                (StatusCode::CONFLICT, "NO_COPIES_AVAILABLE", e.to_string())
            }
            ref e @ ApplicationError::InvalidBorrowState(_) => {
                (StatusCode::CONFLICT, "INVALID_BORROW_STATE", e.to_string())
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApplicationError::Repository(ref e) => {
                tracing::error!(error = %e, "Repository error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REPOSITORY_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
