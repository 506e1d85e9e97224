use crate::domain::{BookBorrowRecord, BorrowId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出記録リポジトリポート
///
/// 在庫数と連動する書き込み（貸出・返却・未返却記録の削除）は
/// [`UnitOfWork`](super::UnitOfWork) を経由する。このポートの`add` / `update` /
/// `delete`は在庫に触れない。削除ガード用の未返却件数もトランザクション側で数える。
#[async_trait]
pub trait BookBorrowRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<BookBorrowRecord>>;

    async fn get_by_id(&self, id: BorrowId) -> Result<Option<BookBorrowRecord>>;

    async fn add(&self, record: &BookBorrowRecord) -> Result<BorrowId>;

    async fn update(&self, record: &BookBorrowRecord) -> Result<bool>;

    async fn delete(&self, id: BorrowId) -> Result<bool>;
}
