use thiserror::Error;

/// 入力検証のエラー
///
/// 永続化の前に必ず検出される。呼び出し側が入力を直せば回復可能。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 必須項目が空（空白のみを含む）
    #[error("{0} is required")]
    EmptyField(&'static str),

    /// 蔵書数が1未満
    #[error("total copies must be at least 1 (got {0})")]
    InvalidTotalCopies(i32),

    /// 貸出中の冊数より少ない蔵書数への変更
    #[error("total copies ({total}) cannot be less than copies on loan ({on_loan})")]
    TotalBelowCopiesOnLoan { total: i32, on_loan: i32 },

    /// メールアドレスの形式が不正
    #[error("email address is invalid: {0}")]
    InvalidEmail(String),

    /// 参照先IDが正の値でない
    #[error("{field} must be a positive id (got {value})")]
    InvalidReference { field: &'static str, value: i64 },

    /// 返却期限が貸出日以前
    #[error("due date must be after borrow date")]
    DueDateNotAfterBorrowDate,

    /// 返却日が貸出日より前
    #[error("return date cannot be before borrow date")]
    ReturnBeforeBorrow,

    /// 貸出記録の参照先（書籍・会員）は作成後に変更できない
    #[error("{0} of a borrow record cannot be changed")]
    ImmutableReference(&'static str),
}

/// 必須文字列のチェック（空白のみも空とみなす）
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
