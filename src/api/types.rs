use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::borrow_service::BorrowDetails;
use crate::domain::{
    Book, BookBorrowRecord, BookId, BorrowId, BorrowStatus, Member, MemberId,
    commands::{AddBook, AddBorrow, AddMember, UpdateBook, UpdateBorrow, UpdateMember},
};

// ============================================================================
// Requests
// ============================================================================

/// 書籍の登録・更新リクエスト（POST /books, PUT /books/:id）
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: Option<i32>,
    pub genre: Option<String>,
    pub total_copies: i32,
}

impl BookRequest {
    pub fn to_add_command(self) -> AddBook {
        AddBook {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            published_year: self.published_year,
            genre: self.genre,
            total_copies: self.total_copies,
        }
    }

    pub fn to_update_command(self, id: BookId) -> UpdateBook {
        UpdateBook {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            published_year: self.published_year,
            genre: self.genre,
            total_copies: self.total_copies,
        }
    }
}

/// 会員の登録・更新リクエスト
///
/// `is_active`は更新時のみ使われる（省略時は有効）。
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl MemberRequest {
    pub fn to_add_command(self) -> AddMember {
        AddMember {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        }
    }

    pub fn to_update_command(self, id: MemberId) -> UpdateMember {
        UpdateMember {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            is_active: self.is_active,
        }
    }
}

/// 貸出リクエスト（POST /borrows）
#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub book_id: i64,
    pub member_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl BorrowRequest {
    pub fn to_command(&self) -> AddBorrow {
        AddBorrow {
            book_id: BookId::new(self.book_id),
            member_id: MemberId::new(self.member_id),
            borrow_date: self.borrow_date,
            due_date: self.due_date,
        }
    }
}

/// 貸出記録の更新リクエスト（PUT /borrows/:id）
#[derive(Debug, Deserialize)]
pub struct UpdateBorrowRequest {
    pub book_id: i64,
    pub member_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_returned: bool,
}

impl UpdateBorrowRequest {
    pub fn to_command(self, id: BorrowId) -> UpdateBorrow {
        UpdateBorrow {
            id,
            book_id: BookId::new(self.book_id),
            member_id: MemberId::new(self.member_id),
            borrow_date: self.borrow_date,
            due_date: self.due_date,
            return_date: self.return_date,
            is_returned: self.is_returned,
        }
    }
}

/// 返却リクエスト（POST /borrows/:id/return）。省略時は現在時刻
#[derive(Debug, Default, Deserialize)]
pub struct ReturnRequest {
    pub returned_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: Option<i32>,
    pub genre: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            is_available: book.is_available(),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            published_year: book.published_year,
            genre: book.genre,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub membership_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id.value(),
            full_name: member.full_name(),
            first_name: member.first_name,
            last_name: member.last_name,
            email: member.email,
            phone: member.phone,
            address: member.address,
            membership_date: member.membership_date,
            is_active: member.is_active,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

/// 貸出記録レスポンス。延滞関連の項目は`now`時点で導出する
#[derive(Debug, Serialize)]
pub struct BorrowResponse {
    pub id: i64,
    pub book_id: i64,
    pub member_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub is_overdue: bool,
    pub days_overdue: i64,
    pub status: BorrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BorrowResponse {
    pub fn at(record: BookBorrowRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id.value(),
            book_id: record.book_id.value(),
            member_id: record.member_id.value(),
            borrow_date: record.borrow_date,
            due_date: record.due_date,
            return_date: record.return_date,
            is_returned: record.is_returned,
            is_overdue: record.is_overdue(now),
            days_overdue: record.days_overdue(now),
            status: record.status(now),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// 貸出記録と書籍・会員（GET /borrows/:id/details）
#[derive(Debug, Serialize)]
pub struct BorrowDetailsResponse {
    pub borrow: BorrowResponse,
    pub book: Option<BookResponse>,
    pub member: Option<MemberResponse>,
}

impl BorrowDetailsResponse {
    pub fn at(details: BorrowDetails, now: DateTime<Utc>) -> Self {
        Self {
            borrow: BorrowResponse::at(details.record, now),
            book: details.book.map(BookResponse::from),
            member: details.member.map(MemberResponse::from),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
