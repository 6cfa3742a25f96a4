//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation Desk",
        version = "0.1.0",
        description = "Library borrowing screens over a hosted backend",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Session
        auth::login_screen,
        auth::login,
        auth::logout,
        // Availability view
        books::catalog,
        books::borrow_book,
        // Borrow ledger view
        borrows::ledger,
        borrows::return_book,
    ),
    components(
        schemas(
            // Session
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SignInScreen,
            crate::models::session::UserIdentity,
            // Availability view
            crate::services::catalog::CatalogScreen,
            crate::services::catalog::BookCard,
            // Borrow ledger view
            crate::services::ledger::LedgerScreen,
            crate::services::ledger::LedgerRow,
            crate::models::borrow::BorrowStatus,
            crate::services::view::Notice,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Sign-in and sign-out"),
        (name = "books", description = "Catalog and borrowing"),
        (name = "borrows", description = "Borrow history and returns")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
