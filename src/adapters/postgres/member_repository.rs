use crate::domain::{Member, MemberId};
use crate::ports::member_repository::{MemberRepository as MemberRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::map_row_to_member;

/// MemberRepositoryのPostgreSQL実装
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn get_all(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
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
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(map_row_to_member)
            .collect::<std::result::Result<_, _>>()?)
    }

    async fn get_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query(
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
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_member).transpose()?)
    }

    async fn add(&self, member: &Member) -> Result<MemberId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO members (
                first_name,
                last_name,
                email,
                phone,
                address,
                membership_date,
                is_active,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.address)
        .bind(member.membership_date)
        .bind(member.is_active)
        .bind(member.created_at)
        .bind(member.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(MemberId::new(id))
    }

    async fn update(&self, member: &Member) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET
                first_name = $2,
                last_name = $3,
                email = $4,
                phone = $5,
                address = $6,
                membership_date = $7,
                is_active = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(member.id.value())
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.address)
        .bind(member.membership_date)
        .bind(member.is_active)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: MemberId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
