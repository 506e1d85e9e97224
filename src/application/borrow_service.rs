use crate::domain::{
    self, Book, BookBorrowRecord, BorrowId, Member,
    borrow::BorrowTransition,
    commands::{AddBorrow, ReturnBook, UpdateBorrow},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ApplicationError, Result, ServiceDependencies};

/// 貸出記録と、その参照先（必要なときにだけ取得する）
#[derive(Debug, Clone, Serialize)]
pub struct BorrowDetails {
    pub record: BookBorrowRecord,
    pub book: Option<Book>,
    pub member: Option<Member>,
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍ID・会員IDは正の値、返却期限は貸出日より後
/// - 会員が存在し、有効であること
/// - 書籍が存在し、貸出可能な冊数が残っていること
///
/// # 一貫性保証
///
/// 会員の共有ロック、書籍のロック、貸出可能数の減算、貸出記録の追加は
/// 1つのトランザクションで行う。同じ書籍への同時貸出は直列化され、貸出可能数が
/// 負になることはない。貸出中の会員・書籍の削除はコミットを待つ。
///
/// # 戻り値
/// 採番された貸出記録ID
pub async fn add_borrow(deps: &ServiceDependencies, cmd: AddBorrow) -> Result<BorrowId> {
    let now = Utc::now();

    // 1. 入力検証（永続化の前）
    let record = domain::borrow::new_borrow(&cmd, now)?;

    let mut tx = deps
        .unit_of_work
        .begin()
        .await
        .map_err(ApplicationError::Repository)?;

    // 2. 会員の確認（コミットまで削除されないよう共有ロック）
    let member = tx
        .share_member(cmd.member_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::member_not_found(cmd.member_id))?;

    if !member.is_active {
        tracing::warn!(member_id = %member.id, "Refused to lend to inactive member");
        return Err(ApplicationError::Conflict(format!(
            "member {} is not active",
            member.id
        )));
    }

    // 3. 書籍をロックして1冊確保
    let book = tx
        .lock_book(cmd.book_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::book_not_found(cmd.book_id))?;

    let Some(taken) = book.take_copy(now) else {
        tracing::warn!(book_id = %book.id, "No copies available");
        return Err(ApplicationError::NoCopiesAvailable(book.id));
    };

    if !tx
        .update_book(&taken)
        .await
        .map_err(ApplicationError::Repository)?
    {
        return Err(ApplicationError::book_not_found(cmd.book_id));
    }

    // 4. 貸出記録を追加してコミット
    let id = tx
        .insert_borrow(&record)
        .await
        .map_err(ApplicationError::Repository)?;

    tx.commit().await.map_err(ApplicationError::Repository)?;

    tracing::info!(
        borrow_id = %id,
        book_id = %cmd.book_id,
        member_id = %cmd.member_id,
        available = taken.available_copies,
        "Book borrowed"
    );
    Ok(id)
}

/// 貸出記録を更新する
///
/// ビジネスルール：
/// - 貸出記録が存在すること
/// - 書籍・会員の参照は変更できない
/// - 返却済みの記録は未返却に戻せない
/// - Active → Returned の遷移では書籍の貸出可能数を1増やす（同一トランザクション）
pub async fn update_borrow(deps: &ServiceDependencies, cmd: UpdateBorrow) -> Result<()> {
    let now = Utc::now();

    domain::borrow::validate_borrow_fields(
        cmd.book_id,
        cmd.member_id,
        cmd.borrow_date,
        cmd.due_date,
    )?;

    let mut tx = deps
        .unit_of_work
        .begin()
        .await
        .map_err(ApplicationError::Repository)?;

    let existing = tx
        .lock_borrow(cmd.id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::borrow_not_found(cmd.id))?;

    let (record, transition) = domain::borrow::apply_update(&existing, &cmd, now)?;

    if transition == BorrowTransition::Returned {
        let book = tx
            .lock_book(record.book_id)
            .await
            .map_err(ApplicationError::Repository)?
            .ok_or_else(|| ApplicationError::book_not_found(record.book_id))?;

        let released = book.release_copy(now).ok_or_else(|| {
            ApplicationError::Conflict(format!("book {} has no copies on loan", book.id))
        })?;

        tx.update_book(&released)
            .await
            .map_err(ApplicationError::Repository)?;
    }

    if !tx
        .update_borrow(&record)
        .await
        .map_err(ApplicationError::Repository)?
    {
        return Err(ApplicationError::borrow_not_found(cmd.id));
    }

    tx.commit().await.map_err(ApplicationError::Repository)?;

    match transition {
        BorrowTransition::Returned => {
            tracing::info!(borrow_id = %cmd.id, book_id = %record.book_id, "Book returned")
        }
        BorrowTransition::Unchanged => tracing::info!(borrow_id = %cmd.id, "Borrow updated"),
    }
    Ok(())
}

/// 書籍を返却する
///
/// 貸出記録を返却済みにする`update_borrow`の簡易版。既に返却済みならエラー。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<()> {
    let existing = deps
        .borrows
        .get_by_id(cmd.borrow_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::borrow_not_found(cmd.borrow_id))?;

    if existing.is_returned {
        return Err(ApplicationError::InvalidBorrowState(format!(
            "borrow record {} is already returned",
            existing.id
        )));
    }

    update_borrow(
        deps,
        domain::borrow::return_update(&existing, cmd.returned_at),
    )
    .await
}

/// 貸出記録を削除する（訂正用）
///
/// 未返却の記録を削除する場合は、その1冊を書籍の貸出可能数に戻す。
pub async fn delete_borrow(deps: &ServiceDependencies, id: BorrowId) -> Result<()> {
    let now = Utc::now();

    let mut tx = deps
        .unit_of_work
        .begin()
        .await
        .map_err(ApplicationError::Repository)?;

    let existing = tx
        .lock_borrow(id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::borrow_not_found(id))?;

    if existing.is_active() {
        let book = tx
            .lock_book(existing.book_id)
            .await
            .map_err(ApplicationError::Repository)?
            .ok_or_else(|| ApplicationError::book_not_found(existing.book_id))?;

        let released = book.release_copy(now).ok_or_else(|| {
            ApplicationError::Conflict(format!("book {} has no copies on loan", book.id))
        })?;

        tx.update_book(&released)
            .await
            .map_err(ApplicationError::Repository)?;
    }

    if !tx
        .delete_borrow(id)
        .await
        .map_err(ApplicationError::Repository)?
    {
        return Err(ApplicationError::borrow_not_found(id));
    }

    tx.commit().await.map_err(ApplicationError::Repository)?;

    tracing::info!(borrow_id = %id, was_active = existing.is_active(), "Borrow deleted");
    Ok(())
}

pub async fn get_all_borrows(deps: &ServiceDependencies) -> Result<Vec<BookBorrowRecord>> {
    deps.borrows
        .get_all()
        .await
        .map_err(ApplicationError::Repository)
}

pub async fn get_borrow_by_id(
    deps: &ServiceDependencies,
    id: BorrowId,
) -> Result<Option<BookBorrowRecord>> {
    deps.borrows
        .get_by_id(id)
        .await
        .map_err(ApplicationError::Repository)
}

/// 延滞中の貸出記録（返却期限の古い順）
///
/// 延滞は保存された状態ではなく、`now`時点で導出する。
pub async fn get_overdue_borrows(
    deps: &ServiceDependencies,
    now: DateTime<Utc>,
) -> Result<Vec<BookBorrowRecord>> {
    let mut overdue: Vec<BookBorrowRecord> = get_all_borrows(deps)
        .await?
        .into_iter()
        .filter(|record| record.is_overdue(now))
        .collect();

    overdue.sort_by_key(|record| record.due_date);
    Ok(overdue)
}

/// 貸出記録と書籍・会員をまとめて取得する
///
/// 参照先は記録に埋め込まず、必要なときにリポジトリから並行して取得する。
pub async fn get_borrow_details(
    deps: &ServiceDependencies,
    id: BorrowId,
) -> Result<Option<BorrowDetails>> {
    let Some(record) = get_borrow_by_id(deps, id).await? else {
        return Ok(None);
    };

    let (book, member) = futures::try_join!(
        deps.books.get_by_id(record.book_id),
        deps.members.get_by_id(record.member_id),
    )
    .map_err(ApplicationError::Repository)?;

    Ok(Some(BorrowDetails {
        record,
        book,
        member,
    }))
}
