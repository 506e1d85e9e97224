use crate::domain::{BookId, ValidationError, borrow::UpdateBorrowError};
use thiserror::Error;

/// アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 入力検証エラー（永続化の前に検出される）
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// 対象のIDが存在しない
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// 参照整合性・並行更新との衝突
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 貸出可能な冊数が残っていない
    #[error("No copies of book {0} are available")]
    NoCopiesAvailable(BookId),

    /// 貸出記録の状態遷移が不正（例: 返却済みを未返却に戻す）
    #[error("Invalid borrow state: {0}")]
    InvalidBorrowState(String),

    /// リポジトリのエラー（加工せずsourceとして保持する）
    #[error("Repository error")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApplicationError {
    pub fn book_not_found(id: BookId) -> Self {
        ApplicationError::NotFound {
            entity: "Book",
            id: id.value(),
        }
    }

    pub fn member_not_found(id: crate::domain::MemberId) -> Self {
        ApplicationError::NotFound {
            entity: "Member",
            id: id.value(),
        }
    }

    pub fn borrow_not_found(id: crate::domain::BorrowId) -> Self {
        ApplicationError::NotFound {
            entity: "Borrow record",
            id: id.value(),
        }
    }
}

impl From<UpdateBorrowError> for ApplicationError {
    fn from(err: UpdateBorrowError) -> Self {
        match err {
            UpdateBorrowError::Invalid(e) => ApplicationError::Validation(e),
            UpdateBorrowError::CannotUnreturn => ApplicationError::InvalidBorrowState(
                "a returned record cannot be made active again".to_string(),
            ),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ApplicationError>;
