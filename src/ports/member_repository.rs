use crate::domain::{Member, MemberId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員リポジトリポート
///
/// サービス層の削除は貸出と直列化するため[`UnitOfWork`](super::UnitOfWork)を経由する。
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Member>>;

    async fn get_by_id(&self, id: MemberId) -> Result<Option<Member>>;

    /// 会員を追加し、採番されたIDを返す（`member.id`は無視される）
    async fn add(&self, member: &Member) -> Result<MemberId>;

    /// 行が存在しなければ`false`
    async fn update(&self, member: &Member) -> Result<bool>;

    /// 会員を返却済みの履歴ごと削除する。行が存在しなければ`false`
    async fn delete(&self, id: MemberId) -> Result<bool>;
}
