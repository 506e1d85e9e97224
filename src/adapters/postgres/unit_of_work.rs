use crate::domain::{Book, BookBorrowRecord, BookId, BorrowId, Member, MemberId};
use crate::ports::unit_of_work::{LendingTransaction, Result, UnitOfWork as UnitOfWorkTrait};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use super::rows::{map_row_to_book, map_row_to_borrow, map_row_to_member};

/// PostgreSQL implementation of UnitOfWork
///
/// Each transaction is a database transaction. Rows read through `lock_*`
/// are taken with `SELECT ... FOR UPDATE`, so concurrent borrows of the same
/// book wait for each other instead of both seeing the last copy. A borrow
/// holds its member `FOR SHARE`, so deleting that member waits for it.
pub struct UnitOfWork {
    pool: PgPool,
}

impl UnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkTrait for UnitOfWork {
    async fn begin(&self) -> Result<Box<dyn LendingTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(Transaction { tx }))
    }
}

/// Open database transaction. Dropping it without `commit` rolls back.
pub struct Transaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl Transaction {
    /// `lock` is the row lock clause appended to the query.
    async fn fetch_member(&mut self, id: MemberId, lock: &str) -> Result<Option<Member>> {
        let sql = format!(
            r#"
            SELECT
                id,
                first_name,
                last_name,
                email,
                phone,
                address,
                membership_date,
                is_active,
                created_at,
                updated_at
            FROM members
            WHERE id = $1
            {lock}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.as_ref().map(map_row_to_member).transpose()?)
    }
}

#[async_trait]
impl LendingTransaction for Transaction {
    async fn lock_book(&mut self, id: BookId) -> Result<Option<Book>> {
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
            FOR UPDATE
            "#,
        )
        .bind(id.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.as_ref().map(map_row_to_book).transpose()?)
    }

    async fn update_book(&mut self, book: &Book) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET
                title = $2,
                author = $3,
                isbn = $4,
                published_year = $5,
                genre = $6,
                total_copies = $7,
                available_copies = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(book.id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_year)
        .bind(&book.genre)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(book.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returned history goes with the book through `ON DELETE CASCADE`.
    async fn delete_book(&mut self, id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.value())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn share_member(&mut self, id: MemberId) -> Result<Option<Member>> {
        self.fetch_member(id, "FOR SHARE").await
    }

    async fn lock_member(&mut self, id: MemberId) -> Result<Option<Member>> {
        self.fetch_member(id, "FOR UPDATE").await
    }

    async fn delete_member(&mut self, id: MemberId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id.value())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn lock_borrow(&mut self, id: BorrowId) -> Result<Option<BookBorrowRecord>> {
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
            FOR UPDATE
            "#,
        )
        .bind(id.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.as_ref().map(map_row_to_borrow).transpose()?)
    }

    async fn insert_borrow(&mut self, record: &BookBorrowRecord) -> Result<BorrowId> {
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
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(BorrowId::new(id))
    }

    async fn update_borrow(&mut self, record: &BookBorrowRecord) -> Result<bool> {
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
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_borrow(&mut self, id: BorrowId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM book_borrow_records WHERE id = $1")
            .bind(id.value())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Served by the partial index idx_borrows_active_book.
    async fn count_active_for_book(&mut self, book_id: BookId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_borrow_records WHERE book_id = $1 AND is_returned = FALSE",
        )
        .bind(book_id.value())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }

    /// Served by the partial index idx_borrows_active_member.
    async fn count_active_for_member(&mut self, member_id: MemberId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_borrow_records WHERE member_id = $1 AND is_returned = FALSE",
        )
        .bind(member_id.value())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let Transaction { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
