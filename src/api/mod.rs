//! HTTP front-end: one route per screen, plus sign-in and probes

pub mod auth;
pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
    routing::{get, post},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::convert::Infallible;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    models::session::Session,
    services::session::Screen,
    AppState,
};

/// Bearer token of the request, if any
async fn bearer_token(parts: &mut Parts, state: &AppState) -> Option<String> {
    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
}

/// Extractor for the signed-in user's session.
///
/// Visitors without a valid session are redirected to the sign-in screen.
pub struct SignedIn(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for SignedIn {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await;
        let session = state.services.session.current_user(token.as_deref());

        session
            .map(SignedIn)
            .ok_or_else(|| Redirect::to(Screen::SignIn.path()))
    }
}

/// Extractor for an optional session, used by the sign-in screen
pub struct MaybeSignedIn(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSignedIn {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await;
        Ok(MaybeSignedIn(
            state.services.session.current_user(token.as_deref()),
        ))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let screens = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Session
        .route("/login", get(auth::login_screen).post(auth::login))
        .route("/logout", post(auth::logout))
        // Availability view
        .route("/", get(books::catalog))
        .route("/books/:id/borrow", post(books::borrow_book))
        // Borrow ledger view
        .route("/my-borrows", get(borrows::ledger))
        .route("/my-borrows/:id/return", post(borrows::return_book))
        .with_state(state);

    Router::new()
        .merge(screens)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
