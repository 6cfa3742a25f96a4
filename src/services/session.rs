//! Session gate: who is signed in, and which screen they may see

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::session::{Session, SessionClaims, TokenGrant},
    repository::AuthGateway,
};

/// Screens of the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    Catalog,
    Ledger,
}

impl Screen {
    pub fn path(&self) -> &'static str {
        match self {
            Screen::SignIn => "/login",
            Screen::Catalog => "/",
            Screen::Ledger => "/my-borrows",
        }
    }

    fn requires_session(&self) -> bool {
        !matches!(self, Screen::SignIn)
    }
}

/// Routing decision for a requested screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(Screen),
}

/// Signed-out visitors only see the sign-in screen; signed-in users are sent
/// away from it to the catalog.
pub fn guard(requested: Screen, signed_in: bool) -> Access {
    match (requested.requires_session(), signed_in) {
        (true, false) => Access::Redirect(Screen::SignIn),
        (false, true) => Access::Redirect(Screen::Catalog),
        _ => Access::Granted,
    }
}

#[derive(Clone)]
pub struct SessionGate {
    auth: Arc<dyn AuthGateway>,
    config: AuthConfig,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthGateway>, config: AuthConfig) -> Self {
        Self { auth, config }
    }

    /// Identity behind an access token, if the token is valid
    pub fn current_user(&self, access_token: Option<&str>) -> Option<Session> {
        let token = access_token?;
        match SessionClaims::from_token(token, &self.config.jwt_secret, &self.config.audience) {
            Ok(claims) => Some(Session::from_claims(claims, token)),
            Err(e) => {
                tracing::debug!("Rejected access token: {}", e);
                None
            }
        }
    }

    /// Sign in with email and password through the backend auth API
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<TokenGrant> {
        match self.auth.sign_in_with_password(email, password).await {
            Ok(grant) => {
                tracing::info!(user_id = %grant.user.id, "User signed in");
                Ok(grant)
            }
            Err(e) if matches!(e.status, Some(400) | Some(401) | Some(403)) => {
                tracing::info!("Sign-in rejected: {}", e);
                Err(AppError::Authentication("Invalid login credentials".to_string()))
            }
            Err(e) => Err(AppError::Gateway(e)),
        }
    }

    /// Sign out; the visitor leaves the session whatever the backend answers
    pub async fn sign_out(&self, session: &Session) {
        match self.auth.sign_out(session).await {
            Ok(()) => tracing::info!(user_id = %session.user_id(), "User signed out"),
            Err(e) => tracing::error!("Error signing out: {}", e),
        }
    }
}
