use crate::domain::{Book, BookBorrowRecord, BookId, BorrowId, Member, MemberId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// トランザクション境界ポート
///
/// 書籍の貸出可能数の増減と貸出記録の書き込みを1つの原子的な操作にまとめる。
/// リポジトリ同士を直接呼び合わせず、両方が参加できる境界として公開する。
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// トランザクションを開始する
    async fn begin(&self) -> Result<Box<dyn LendingTransaction>>;
}

/// 進行中のトランザクション
///
/// `commit`せずにdropした場合はロールバックされる。
/// `lock_*`で取得した行は、コミットまたはロールバックまで他のトランザクションから
/// 変更・削除されない。`share_member`で取得した行は削除だけが待たされる。
///
/// ロックの取得順は 会員 → 貸出記録 → 書籍 に揃える。
#[async_trait]
pub trait LendingTransaction: Send {
    /// 書籍を排他ロック付きで取得する
    async fn lock_book(&mut self, id: BookId) -> Result<Option<Book>>;

    /// 書籍の全項目（貸出可能数を含む）を書き込む。行がなければ`false`
    async fn update_book(&mut self, book: &Book) -> Result<bool>;

    /// 書籍を削除する。返却済みの貸出記録も一緒に削除される
    async fn delete_book(&mut self, id: BookId) -> Result<bool>;

    /// 会員を共有ロック付きで取得する（貸出中に会員が削除されないように）
    async fn share_member(&mut self, id: MemberId) -> Result<Option<Member>>;

    /// 会員を排他ロック付きで取得する
    async fn lock_member(&mut self, id: MemberId) -> Result<Option<Member>>;

    /// 会員を削除する。返却済みの貸出記録も一緒に削除される
    async fn delete_member(&mut self, id: MemberId) -> Result<bool>;

    /// 貸出記録を排他ロック付きで取得する
    async fn lock_borrow(&mut self, id: BorrowId) -> Result<Option<BookBorrowRecord>>;

    async fn insert_borrow(&mut self, record: &BookBorrowRecord) -> Result<BorrowId>;

    async fn update_borrow(&mut self, record: &BookBorrowRecord) -> Result<bool>;

    async fn delete_borrow(&mut self, id: BorrowId) -> Result<bool>;

    /// 書籍を参照する未返却の記録数（書籍削除のガード）
    async fn count_active_for_book(&mut self, book_id: BookId) -> Result<i64>;

    /// 会員が借りている未返却の記録数（会員削除のガード）
    async fn count_active_for_member(&mut self, member_id: MemberId) -> Result<i64>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
