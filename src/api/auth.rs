//! Sign-in and sign-out endpoints

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::session::UserIdentity,
    services::session::{guard, Access, Screen},
    AppState,
};

use super::{MaybeSignedIn, SignedIn};

/// Sign-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Sign-in response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: UserIdentity,
}

/// Sign-in screen descriptor
#[derive(Serialize, ToSchema)]
pub struct SignInScreen {
    pub title: String,
    pub fields: Vec<String>,
    pub submit: String,
}

/// Sign-in screen; signed-in users are sent to the catalog
#[utoipa::path(
    get,
    path = "/login",
    tag = "auth",
    responses(
        (status = 200, description = "Sign-in screen", body = SignInScreen),
        (status = 303, description = "Already signed in, redirected to /")
    )
)]
pub async fn login_screen(MaybeSignedIn(session): MaybeSignedIn) -> Response {
    match guard(Screen::SignIn, session.is_some()) {
        Access::Redirect(screen) => Redirect::to(screen.path()).into_response(),
        Access::Granted => Json(SignInScreen {
            title: "Library".to_string(),
            fields: vec!["email".to_string(), "password".to_string()],
            submit: format!("POST {}", Screen::SignIn.path()),
        })
        .into_response(),
    }
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Malformed credentials", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let grant = state
        .services
        .session
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: grant.access_token,
        token_type: grant.token_type,
        expires_in: grant.expires_in,
        refresh_token: grant.refresh_token,
        user: UserIdentity {
            id: grant.user.id,
            email: grant.user.email,
        },
    }))
}

/// Sign out and go back to the sign-in screen
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 303, description = "Signed out, redirected to /login")
    )
)]
pub async fn logout(State(state): State<AppState>, SignedIn(session): SignedIn) -> Redirect {
    state.services.session.sign_out(&session).await;
    Redirect::to(Screen::SignIn.path())
}
