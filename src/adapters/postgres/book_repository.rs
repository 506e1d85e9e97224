use crate::domain::{Book, BookId};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::map_row_to_book;

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn get_all(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                title,
                author,
                isbn,
                published_year,
                genre,
                total_copies,
                available_copies,
                created_at,
                updated_at
            FROM books
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(map_row_to_book)
            .collect::<std::result::Result<_, _>>()?)
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                title,
                author,
                isbn,
                published_year,
                genre,
                total_copies,
                available_copies,
                created_at,
                updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book).transpose()?)
    }

    async fn add(&self, book: &Book) -> Result<BookId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (
                title,
                author,
                isbn,
                published_year,
                genre,
                total_copies,
                available_copies,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_year)
        .bind(&book.genre)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(BookId::new(id))
    }

    /// 書誌情報と蔵書数を更新する
    ///
    /// 貸出可能数は保存済みの値に蔵書数の差分を加える。SET句の右辺は更新前の
    /// 値を参照するため、同時に進む貸出・返却の結果は失われない。
    async fn update(&self, book: &Book) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET
                title = $2,
                author = $3,
                isbn = $4,
                published_year = $5,
                genre = $6,
                available_copies = available_copies + ($7 - total_copies),
                total_copies = $7,
                updated_at = $8
            WHERE id = $1
              AND available_copies + ($7 - total_copies) >= 0
            "#,
        )
        .bind(book.id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_year)
        .bind(&book.genre)
        .bind(book.total_copies)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
