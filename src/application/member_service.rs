use crate::domain::{
    self, Member, MemberId,
    commands::{AddMember, UpdateMember},
};
use chrono::Utc;

use super::{ApplicationError, Result, ServiceDependencies};

/// 会員を登録する
///
/// ビジネスルール：
/// - 姓・名・メールアドレスは必須、メールアドレスは`@`と`.`を含む
/// - 入会日は登録時刻、登録直後は有効会員
pub async fn add_member(deps: &ServiceDependencies, cmd: AddMember) -> Result<MemberId> {
    domain::member::validate_member_fields(&cmd.first_name, &cmd.last_name, &cmd.email)?;

    let now = Utc::now();
    let member = Member {
        id: MemberId::UNASSIGNED,
        first_name: cmd.first_name,
        last_name: cmd.last_name,
        email: cmd.email,
        phone: cmd.phone,
        address: cmd.address,
        membership_date: now,
        is_active: true,
        created_at: now,
        updated_at: None,
    };

    let id = deps
        .members
        .add(&member)
        .await
        .map_err(ApplicationError::Repository)?;

    tracing::info!(member_id = %id, "Member added");
    Ok(id)
}

/// 会員を更新する
///
/// 入会日と作成日時は保存済みの値を引き継ぐ。
pub async fn update_member(deps: &ServiceDependencies, cmd: UpdateMember) -> Result<()> {
    domain::member::validate_member_fields(&cmd.first_name, &cmd.last_name, &cmd.email)?;

    let existing = deps
        .members
        .get_by_id(cmd.id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::member_not_found(cmd.id))?;

    let member = Member {
        id: existing.id,
        first_name: cmd.first_name,
        last_name: cmd.last_name,
        email: cmd.email,
        phone: cmd.phone,
        address: cmd.address,
        membership_date: existing.membership_date,
        is_active: cmd.is_active,
        created_at: existing.created_at,
        updated_at: Some(Utc::now()),
    };

    let updated = deps
        .members
        .update(&member)
        .await
        .map_err(ApplicationError::Repository)?;

    if !updated {
        return Err(ApplicationError::member_not_found(cmd.id));
    }

    tracing::info!(member_id = %cmd.id, active = member.is_active, "Member updated");
    Ok(())
}

/// 会員を削除する
///
/// 未返却の貸出がある会員は削除できない（`Conflict`）。
/// 会員を排他ロックしてから数えるため、進行中の貸出は完了を待って数えられ、
/// 削除後に始まった貸出は会員が見つからずに失敗する。
pub async fn delete_member(deps: &ServiceDependencies, id: MemberId) -> Result<()> {
    let mut tx = deps
        .unit_of_work
        .begin()
        .await
        .map_err(ApplicationError::Repository)?;

    tx.lock_member(id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::member_not_found(id))?;

    let active = tx
        .count_active_for_member(id)
        .await
        .map_err(ApplicationError::Repository)?;

    if active > 0 {
        tracing::warn!(member_id = %id, active, "Refused to delete member with active borrows");
        return Err(ApplicationError::Conflict(format!(
            "member {} has {} unreturned borrow record(s)",
            id, active
        )));
    }

    if !tx
        .delete_member(id)
        .await
        .map_err(ApplicationError::Repository)?
    {
        return Err(ApplicationError::member_not_found(id));
    }

    tx.commit().await.map_err(ApplicationError::Repository)?;

    tracing::info!(member_id = %id, "Member deleted");
    Ok(())
}

pub async fn get_all_members(deps: &ServiceDependencies) -> Result<Vec<Member>> {
    deps.members
        .get_all()
        .await
        .map_err(ApplicationError::Repository)
}

pub async fn get_member_by_id(deps: &ServiceDependencies, id: MemberId) -> Result<Option<Member>> {
    deps.members
        .get_by_id(id)
        .await
        .map_err(ApplicationError::Repository)
}
