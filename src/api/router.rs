use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, create_borrow, create_member, delete_book, delete_borrow,
    delete_member, get_book, get_borrow, get_borrow_details, get_member, list_books,
    list_borrows, list_members, list_overdue_borrows, return_borrow, update_book, update_borrow,
    update_member,
};

/// Creates the API router with all lending endpoints
///
/// Catalog:
/// - GET|POST /books, GET|PUT|DELETE /books/:id
/// - GET|POST /members, GET|PUT|DELETE /members/:id
///
/// Lending:
/// - GET|POST /borrows, GET|PUT|DELETE /borrows/:id
/// - GET /borrows/overdue
/// - GET /borrows/:id/details
/// - POST /borrows/:id/return
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/members", get(list_members).post(create_member))
        .route(
            "/members/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/borrows", get(list_borrows).post(create_borrow))
        // Static segment wins over `:id`
        .route("/borrows/overdue", get(list_overdue_borrows))
        .route(
            "/borrows/:id",
            get(get_borrow).put(update_borrow).delete(delete_borrow),
        )
        .route("/borrows/:id/details", get(get_borrow_details))
        .route("/borrows/:id/return", post(return_borrow))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
