use crate::domain::{BookBorrowRecord, BorrowId};
use crate::ports::borrow_repository::{BookBorrowRepository as BookBorrowRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::map_row_to_borrow;

/// BookBorrowRepositoryのPostgreSQL実装
pub struct BookBorrowRepository {
    pool: PgPool,
}

impl BookBorrowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookBorrowRepositoryTrait for BookBorrowRepository {
    async fn get_all(&self) -> Result<Vec<BookBorrowRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                book_id,
                member_id,
                borrow_date,
                due_date,
                return_date,
                is_returned,
                created_at,
                updated_at
            FROM book_borrow_records
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(map_row_to_borrow)
            .collect::<std::result::Result<_, _>>()?)
    }

    async fn get_by_id(&self, id: BorrowId) -> Result<Option<BookBorrowRecord>> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                book_id,
                member_id,
                borrow_date,
                due_date,
                return_date,
                is_returned,
                created_at,
                updated_at
            FROM book_borrow_records
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_borrow).transpose()?)
    }

    async fn add(&self, record: &BookBorrowRecord) -> Result<BorrowId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO book_borrow_records (
                book_id,
                member_id,
                borrow_date,
                due_date,
                return_date,
                is_returned,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(record.book_id.value())
        .bind(record.member_id.value())
        .bind(record.borrow_date)
        .bind(record.due_date)
        .bind(record.return_date)
        .bind(record.is_returned)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(BorrowId::new(id))
    }

    async fn update(&self, record: &BookBorrowRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE book_borrow_records
            SET
                borrow_date = $2,
                due_date = $3,
                return_date = $4,
                is_returned = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id.value())
        .bind(record.borrow_date)
        .bind(record.due_date)
        .bind(record.return_date)
        .bind(record.is_returned)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: BorrowId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM book_borrow_records WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
