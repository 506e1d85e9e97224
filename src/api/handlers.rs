use crate::application::{
    ApplicationError, ServiceDependencies, book_service, borrow_service, member_service,
};
use crate::domain::{BookId, BorrowId, MemberId, commands::ReturnBook};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        BookRequest, BookResponse, BorrowDetailsResponse, BorrowRequest, BorrowResponse,
        MemberRequest, MemberResponse, ReturnRequest, UpdateBorrowRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Books
// ============================================================================

/// GET /books
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = book_service::get_all_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let id = BookId::new(id);
    let book = book_service::get_book_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::book_not_found(id))?;
    Ok(Json(BookResponse::from(book)))
}

/// POST /books - 書籍を登録
///
/// 貸出可能数は蔵書数で初期化される。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let id = book_service::add_book(&state.service_deps, req.to_add_command()).await?;

    // 作成された書籍を取得して完全な情報を返す
    let book = book_service::get_book_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::book_not_found(id))?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /books/:id
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let id = BookId::new(id);
    book_service::update_book(&state.service_deps, req.to_update_command(id)).await?;

    let book = book_service::get_book_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::book_not_found(id))?;
    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 未返却の貸出があれば409
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    book_service::delete_book(&state.service_deps, BookId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Members
// ============================================================================

/// GET /members
pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let members = member_service::get_all_members(&state.service_deps).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

/// GET /members/:id
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MemberResponse>, ApiError> {
    let id = MemberId::new(id);
    let member = member_service::get_member_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::member_not_found(id))?;
    Ok(Json(MemberResponse::from(member)))
}

/// POST /members
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let id = member_service::add_member(&state.service_deps, req.to_add_command()).await?;

    let member = member_service::get_member_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::member_not_found(id))?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// PUT /members/:id
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let id = MemberId::new(id);
    member_service::update_member(&state.service_deps, req.to_update_command(id)).await?;

    let member = member_service::get_member_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::member_not_found(id))?;
    Ok(Json(MemberResponse::from(member)))
}

/// DELETE /members/:id - 未返却の貸出があれば409
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    member_service::delete_member(&state.service_deps, MemberId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Borrows
// ============================================================================

/// GET /borrows
pub async fn list_borrows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BorrowResponse>>, ApiError> {
    let now = Utc::now();
    let borrows = borrow_service::get_all_borrows(&state.service_deps).await?;
    Ok(Json(
        borrows
            .into_iter()
            .map(|record| BorrowResponse::at(record, now))
            .collect(),
    ))
}

/// GET /borrows/overdue - 現在時刻で延滞している貸出
pub async fn list_overdue_borrows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BorrowResponse>>, ApiError> {
    let now = Utc::now();
    let borrows = borrow_service::get_overdue_borrows(&state.service_deps, now).await?;
    Ok(Json(
        borrows
            .into_iter()
            .map(|record| BorrowResponse::at(record, now))
            .collect(),
    ))
}

/// GET /borrows/:id
pub async fn get_borrow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BorrowResponse>, ApiError> {
    let id = BorrowId::new(id);
    let record = borrow_service::get_borrow_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::borrow_not_found(id))?;
    Ok(Json(BorrowResponse::at(record, Utc::now())))
}

/// GET /borrows/:id/details - 貸出記録と書籍・会員
pub async fn get_borrow_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BorrowDetailsResponse>, ApiError> {
    let id = BorrowId::new(id);
    let details = borrow_service::get_borrow_details(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::borrow_not_found(id))?;
    Ok(Json(BorrowDetailsResponse::at(details, Utc::now())))
}

/// POST /borrows - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 返却期限が貸出日より後であること
/// - 会員が存在し、有効であること
/// - 書籍に貸出可能な冊数が残っていること（なければ409）
pub async fn create_borrow(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BorrowRequest>,
) -> Result<(StatusCode, Json<BorrowResponse>), ApiError> {
    let id = borrow_service::add_borrow(&state.service_deps, req.to_command()).await?;

    let record = borrow_service::get_borrow_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::borrow_not_found(id))?;

    Ok((StatusCode::CREATED, Json(BorrowResponse::at(record, Utc::now()))))
}

/// PUT /borrows/:id
pub async fn update_borrow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBorrowRequest>,
) -> Result<Json<BorrowResponse>, ApiError> {
    let id = BorrowId::new(id);
    borrow_service::update_borrow(&state.service_deps, req.to_command(id)).await?;

    let record = borrow_service::get_borrow_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::borrow_not_found(id))?;
    Ok(Json(BorrowResponse::at(record, Utc::now())))
}

/// POST /borrows/:id/return - 書籍を返却
///
/// 延滞中の貸出も返却可能。既に返却済みなら409。
pub async fn return_borrow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    req: Option<Json<ReturnRequest>>,
) -> Result<Json<BorrowResponse>, ApiError> {
    let id = BorrowId::new(id);
    let req = req.map(|Json(req)| req).unwrap_or_default();

    let cmd = ReturnBook {
        borrow_id: id,
        returned_at: req.returned_at.unwrap_or_else(Utc::now),
    };
    borrow_service::return_book(&state.service_deps, cmd).await?;

    let record = borrow_service::get_borrow_by_id(&state.service_deps, id)
        .await?
        .ok_or_else(|| ApplicationError::borrow_not_found(id))?;
    Ok(Json(BorrowResponse::at(record, Utc::now())))
}

/// DELETE /borrows/:id - 訂正用。未返却なら1冊を在庫に戻す
pub async fn delete_borrow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    borrow_service::delete_borrow(&state.service_deps, BorrowId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
