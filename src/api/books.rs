//! Availability view endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{models::book::BookId, services::catalog::CatalogScreen, AppState};

use super::SignedIn;

/// Catalog of all books, ordered by title
#[utoipa::path(
    get,
    path = "/",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rendered catalog", body = CatalogScreen),
        (status = 303, description = "Not signed in, redirected to /login")
    )
)]
pub async fn catalog(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
) -> Json<CatalogScreen> {
    let view = state.services.catalog(session);
    view.load().await;
    Json(view.render().await)
}

/// Borrow a book for two weeks and render the refreshed catalog
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book ID (UUID)")
    ),
    responses(
        (status = 200, description = "Rendered catalog after the borrow attempt", body = CatalogScreen),
        (status = 303, description = "Not signed in, redirected to /login")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    Path(book_id): Path<BookId>,
) -> Json<CatalogScreen> {
    let view = state.services.catalog(session);
    view.load().await;
    view.borrow(book_id).await;
    Json(view.render().await)
}
