use crate::domain::{
    self, Book, BookId,
    commands::{AddBook, UpdateBook},
};
use chrono::Utc;

use super::{ApplicationError, Result, ServiceDependencies};

/// 書籍を登録する
///
/// ビジネスルール：
/// - タイトル・著者・ISBNは必須
/// - 蔵書数は1冊以上
/// - 登録時の貸出可能数は蔵書数と同じ
///
/// # 戻り値
/// 採番された書籍ID
pub async fn add_book(deps: &ServiceDependencies, cmd: AddBook) -> Result<BookId> {
    domain::book::validate_catalog_fields(&cmd.title, &cmd.author, &cmd.isbn, cmd.total_copies)?;

    let book = Book {
        id: BookId::UNASSIGNED,
        title: cmd.title,
        author: cmd.author,
        isbn: cmd.isbn,
        published_year: cmd.published_year,
        genre: cmd.genre,
        total_copies: cmd.total_copies,
        available_copies: cmd.total_copies,
        created_at: Utc::now(),
        updated_at: None,
    };

    let id = deps
        .books
        .add(&book)
        .await
        .map_err(ApplicationError::Repository)?;

    tracing::info!(book_id = %id, title = %book.title, copies = book.total_copies, "Book added");
    Ok(id)
}

/// 書籍を更新する
///
/// ビジネスルール：
/// - 登録時と同じ検証
/// - 書籍が存在すること
/// - 貸出中の冊数は維持される（蔵書数を貸出中の冊数未満にはできない）
///
/// 書籍をロックしてから貸出中の冊数を求めるため、並行する貸出・返却と
/// 食い違うことはない。
pub async fn update_book(deps: &ServiceDependencies, cmd: UpdateBook) -> Result<()> {
    domain::book::validate_catalog_fields(&cmd.title, &cmd.author, &cmd.isbn, cmd.total_copies)?;

    let mut tx = deps
        .unit_of_work
        .begin()
        .await
        .map_err(ApplicationError::Repository)?;

    let existing = tx
        .lock_book(cmd.id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::book_not_found(cmd.id))?;

    let available_copies =
        domain::book::reconcile_available_copies(&existing, cmd.total_copies)?;

    let book = Book {
        id: existing.id,
        title: cmd.title,
        author: cmd.author,
        isbn: cmd.isbn,
        published_year: cmd.published_year,
        genre: cmd.genre,
        total_copies: cmd.total_copies,
        available_copies,
        created_at: existing.created_at,
        updated_at: Some(Utc::now()),
    };

    if !tx
        .update_book(&book)
        .await
        .map_err(ApplicationError::Repository)?
    {
        return Err(ApplicationError::book_not_found(cmd.id));
    }

    tx.commit().await.map_err(ApplicationError::Repository)?;

    tracing::info!(book_id = %cmd.id, available = available_copies, "Book updated");
    Ok(())
}

/// 書籍を削除する
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 未返却の貸出記録が参照していないこと
///
/// 書籍をロックしてから未返却の記録を数え、同じトランザクションで削除する。
/// 確認と削除の間に貸出が割り込むことはない。
pub async fn delete_book(deps: &ServiceDependencies, id: BookId) -> Result<()> {
    let mut tx = deps
        .unit_of_work
        .begin()
        .await
        .map_err(ApplicationError::Repository)?;

    tx.lock_book(id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::book_not_found(id))?;

    let active = tx
        .count_active_for_book(id)
        .await
        .map_err(ApplicationError::Repository)?;

    if active > 0 {
        tracing::warn!(book_id = %id, active, "Refused to delete book with active borrows");
        return Err(ApplicationError::Conflict(format!(
            "book {} has {} unreturned borrow record(s)",
            id, active
        )));
    }

    if !tx
        .delete_book(id)
        .await
        .map_err(ApplicationError::Repository)?
    {
        return Err(ApplicationError::book_not_found(id));
    }

    tx.commit().await.map_err(ApplicationError::Repository)?;

    tracing::info!(book_id = %id, "Book deleted");
    Ok(())
}

pub async fn get_all_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.books
        .get_all()
        .await
        .map_err(ApplicationError::Repository)
}

pub async fn get_book_by_id(deps: &ServiceDependencies, id: BookId) -> Result<Option<Book>> {
    deps.books
        .get_by_id(id)
        .await
        .map_err(ApplicationError::Repository)
}
