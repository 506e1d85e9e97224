use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, BorrowId, MemberId, ValidationError,
    commands::{AddBorrow, UpdateBorrow},
};

/// 貸出記録 - 1冊の書籍の1回の貸出
///
/// 書籍・会員はIDでのみ参照し、ライフサイクルは所有しない。
/// 状態は Active（`is_returned = false`）から Returned へ一度だけ遷移する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowRecord {
    pub id: BorrowId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 貸出ステータス（読み取り時に導出する。Overdueは永続化しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Active,
    Overdue,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Active => "active",
            BorrowStatus::Overdue => "overdue",
            BorrowStatus::Returned => "returned",
        }
    }
}

impl BookBorrowRecord {
    pub fn is_active(&self) -> bool {
        !self.is_returned
    }

    /// 延滞判定：未返却かつ返却期限を過ぎている
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_returned && now > self.due_date
    }

    /// 延滞日数（延滞していなければ0）
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        if self.is_overdue(now) {
            (now - self.due_date).num_days()
        } else {
            0
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> BorrowStatus {
        if self.is_returned {
            BorrowStatus::Returned
        } else if self.is_overdue(now) {
            BorrowStatus::Overdue
        } else {
            BorrowStatus::Active
        }
    }
}

/// 貸出記録更新のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateBorrowError {
    Invalid(ValidationError),
    /// 返却済みの記録を未返却に戻そうとした
    CannotUnreturn,
}

impl From<ValidationError> for UpdateBorrowError {
    fn from(err: ValidationError) -> Self {
        UpdateBorrowError::Invalid(err)
    }
}

/// 更新によって起きる状態遷移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowTransition {
    /// 状態は変わらない（期限の訂正など）
    Unchanged,
    /// Active → Returned
    Returned,
}

/// 貸出記録の入力形式チェック
///
/// ビジネスルール：
/// - 書籍ID・会員IDは正の値
/// - 返却期限は貸出日より後
pub fn validate_borrow_fields(
    book_id: BookId,
    member_id: MemberId,
    borrow_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if !book_id.is_valid() {
        return Err(ValidationError::InvalidReference {
            field: "book_id",
            value: book_id.value(),
        });
    }
    if !member_id.is_valid() {
        return Err(ValidationError::InvalidReference {
            field: "member_id",
            value: member_id.value(),
        });
    }
    if due_date <= borrow_date {
        return Err(ValidationError::DueDateNotAfterBorrowDate);
    }
    Ok(())
}

/// 純粋関数：新しい貸出記録を作る
///
/// 副作用なし。IDは永続化時に採番される。
pub fn new_borrow(cmd: &AddBorrow, now: DateTime<Utc>) -> Result<BookBorrowRecord, ValidationError> {
    validate_borrow_fields(cmd.book_id, cmd.member_id, cmd.borrow_date, cmd.due_date)?;

    Ok(BookBorrowRecord {
        id: BorrowId::UNASSIGNED,
        book_id: cmd.book_id,
        member_id: cmd.member_id,
        borrow_date: cmd.borrow_date,
        due_date: cmd.due_date,
        return_date: None,
        is_returned: false,
        created_at: now,
        updated_at: None,
    })
}

/// 純粋関数：既存の貸出記録に更新を適用する
///
/// ビジネスルール：
/// - 書籍・会員の参照は変更できない
/// - 返却済みは未返却に戻せない
/// - 返却日の指定がなければ`now`
/// - 返却日は貸出日より前にできない
///
/// 新しい記録と、在庫に影響する状態遷移を返す。
pub fn apply_update(
    existing: &BookBorrowRecord,
    update: &UpdateBorrow,
    now: DateTime<Utc>,
) -> Result<(BookBorrowRecord, BorrowTransition), UpdateBorrowError> {
    validate_borrow_fields(
        update.book_id,
        update.member_id,
        update.borrow_date,
        update.due_date,
    )?;

    if update.book_id != existing.book_id {
        return Err(ValidationError::ImmutableReference("book_id").into());
    }
    if update.member_id != existing.member_id {
        return Err(ValidationError::ImmutableReference("member_id").into());
    }

    let (return_date, transition) = match (existing.is_returned, update.is_returned) {
        (true, false) => return Err(UpdateBorrowError::CannotUnreturn),
        (false, true) => (
            Some(update.return_date.unwrap_or(now)),
            BorrowTransition::Returned,
        ),
        (true, true) => (
            Some(update.return_date.or(existing.return_date).unwrap_or(now)),
            BorrowTransition::Unchanged,
        ),
        (false, false) => (None, BorrowTransition::Unchanged),
    };

    if let Some(returned_at) = return_date {
        if returned_at < update.borrow_date {
            return Err(ValidationError::ReturnBeforeBorrow.into());
        }
    }

    let record = BookBorrowRecord {
        id: existing.id,
        book_id: existing.book_id,
        member_id: existing.member_id,
        borrow_date: update.borrow_date,
        due_date: update.due_date,
        return_date,
        is_returned: update.is_returned,
        created_at: existing.created_at,
        updated_at: Some(now),
    };

    Ok((record, transition))
}

/// 返却コマンドを更新コマンドに変換する
pub fn return_update(existing: &BookBorrowRecord, returned_at: DateTime<Utc>) -> UpdateBorrow {
    UpdateBorrow {
        id: existing.id,
        book_id: existing.book_id,
        member_id: existing.member_id,
        borrow_date: existing.borrow_date,
        due_date: existing.due_date,
        return_date: Some(returned_at),
        is_returned: true,
    }
}
