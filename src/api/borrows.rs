//! Borrow ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{models::borrow::BorrowId, services::ledger::LedgerScreen, AppState};

use super::SignedIn;

/// Borrows of the signed-in user, newest first
#[utoipa::path(
    get,
    path = "/my-borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rendered ledger", body = LedgerScreen),
        (status = 303, description = "Not signed in, redirected to /login")
    )
)]
pub async fn ledger(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
) -> Json<LedgerScreen> {
    let view = state.services.ledger(session);
    view.load().await;
    Json(view.render().await)
}

/// Return a borrowed book and render the refreshed ledger
#[utoipa::path(
    post,
    path = "/my-borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Borrow ID (UUID)")
    ),
    responses(
        (status = 200, description = "Rendered ledger after the return attempt", body = LedgerScreen),
        (status = 303, description = "Not signed in, redirected to /login")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    Path(borrow_id): Path<BorrowId>,
) -> Json<LedgerScreen> {
    let view = state.services.ledger(session);
    view.load().await;
    view.return_book(borrow_id).await;
    Json(view.render().await)
}
