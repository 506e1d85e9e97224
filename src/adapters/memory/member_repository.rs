use crate::domain::{Member, MemberId};
use crate::ports::member_repository::{MemberRepository as MemberRepositoryTrait, Result};
use async_trait::async_trait;

use super::MemoryStore;

/// In-memory implementation of MemberRepository
pub struct MemberRepository {
    store: MemoryStore,
}

impl MemberRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn get_all(&self) -> Result<Vec<Member>> {
        Ok(self.store.lock().await.members())
    }

    async fn get_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.store.lock().await.member(id))
    }

    async fn add(&self, member: &Member) -> Result<MemberId> {
        Ok(self.store.lock().await.insert_member(member))
    }

    async fn update(&self, member: &Member) -> Result<bool> {
        Ok(self.store.lock().await.replace_member(member))
    }

    async fn delete(&self, id: MemberId) -> Result<bool> {
        Ok(self.store.lock().await.delete_member(id).is_some())
    }
}
