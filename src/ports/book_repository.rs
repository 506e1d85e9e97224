use crate::domain::{Book, BookId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍リポジトリポート
///
/// 書籍の永続化を抽象化する。サービス層は保存先の技術に依存しない。
/// サービス層の更新・削除は貸出と直列化するため[`UnitOfWork`](super::UnitOfWork)を
/// 経由する。`update` / `delete`はロックも削除ガードも行わない。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// すべての書籍を取得する（ID順）
    async fn get_all(&self) -> Result<Vec<Book>>;

    /// IDで書籍を取得する
    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// 書籍を追加し、採番されたIDを返す
    ///
    /// `book.id`は無視される。
    async fn add(&self, book: &Book) -> Result<BookId>;

    /// 書誌情報と蔵書数を更新する
    ///
    /// `available_copies`は引数の値ではなく、保存済みの値を蔵書数の差分だけ
    /// ずらして更新する（並行する貸出・返却を上書きしないため）。
    /// 行が存在しない場合、または差分の適用で貸出可能数が負になる場合は`false`。
    async fn update(&self, book: &Book) -> Result<bool>;

    /// 書籍を返却済みの履歴ごと削除する。行が存在しなければ`false`
    async fn delete(&self, id: BookId) -> Result<bool>;
}
