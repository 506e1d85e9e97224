use crate::domain::{Book, BookBorrowRecord, BookId, BorrowId, Member, MemberId};
use sqlx::{Row, postgres::PgRow};

/// PostgreSQLの行データをBookに変換する
pub(super) fn map_row_to_book(row: &PgRow) -> Result<Book, sqlx::Error> {
    Ok(Book {
        id: BookId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn: row.try_get("isbn")?,
        published_year: row.try_get("published_year")?,
        genre: row.try_get("genre")?,
        total_copies: row.try_get("total_copies")?,
        available_copies: row.try_get("available_copies")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(super) fn map_row_to_member(row: &PgRow) -> Result<Member, sqlx::Error> {
    Ok(Member {
        id: MemberId::new(row.try_get("id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        membership_date: row.try_get("membership_date")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(super) fn map_row_to_borrow(row: &PgRow) -> Result<BookBorrowRecord, sqlx::Error> {
    Ok(BookBorrowRecord {
        id: BorrowId::new(row.try_get("id")?),
        book_id: BookId::new(row.try_get("book_id")?),
        member_id: MemberId::new(row.try_get("member_id")?),
        borrow_date: row.try_get("borrow_date")?,
        due_date: row.try_get("due_date")?,
        return_date: row.try_get("return_date")?,
        is_returned: row.try_get("is_returned")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
