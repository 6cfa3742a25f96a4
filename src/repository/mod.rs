//! Gateway layer for the hosted backend
//!
//! All persistence and authentication lives in the backend. This module wraps
//! its row-level data API and its auth API behind two traits so the views can
//! be driven by any implementation (the HTTP client below, or a mock).

pub mod auth;
pub mod books;
pub mod borrows;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method, RequestBuilder, Response, StatusCode,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    config::BackendConfig,
    error::{AppError, AppResult},
    models::{
        book::{Book, BookId},
        borrow::{Borrow, BorrowId, LedgerEntry},
        session::{Session, TokenGrant},
    },
};

/// Whether retrying the same request later may succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transient,
    Permanent,
}

impl FailureKind {
    /// Timeouts, throttling and server-side failures are worth a retry
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::REQUEST_TIMEOUT
            || status == StatusCode::TOO_MANY_REQUESTS
            || status.is_server_error()
        {
            FailureKind::Transient
        } else {
            FailureKind::Permanent
        }
    }
}

/// Opaque failure of a backend round trip: the operation did not happen
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct GatewayError {
    pub operation: &'static str,
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
}

impl GatewayError {
    pub fn new(operation: &'static str, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn from_status(operation: &'static str, status: StatusCode, body: String) -> Self {
        let message = if body.is_empty() {
            status.to_string()
        } else {
            format!("{}: {}", status, body)
        };
        Self {
            operation,
            kind: FailureKind::from_status(status),
            status: Some(status.as_u16()),
            message,
        }
    }

    pub fn from_reqwest(operation: &'static str, err: reqwest::Error) -> Self {
        let kind = match err.status() {
            Some(status) => FailureKind::from_status(status),
            None if err.is_timeout() || err.is_connect() || err.is_request() => {
                FailureKind::Transient
            }
            None => FailureKind::Permanent,
        };
        Self {
            operation,
            kind,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == FailureKind::Transient
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Row-level data operations used by the views
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryGateway: Send + Sync {
    /// All books, ordered by title ascending
    async fn list_books(&self, session: &Session) -> GatewayResult<Vec<Book>>;

    /// Open a borrow; `id` and `borrow_date` are assigned by the store
    async fn create_borrow(
        &self,
        session: &Session,
        book_id: BookId,
        due_date: DateTime<Utc>,
    ) -> GatewayResult<Borrow>;

    /// Borrows of the session user joined with book title/author,
    /// ordered by borrow date descending
    async fn list_borrows_for_current_user(
        &self,
        session: &Session,
    ) -> GatewayResult<Vec<LedgerEntry>>;

    /// Set the return date of an open borrow
    async fn close_borrow(
        &self,
        session: &Session,
        borrow_id: BorrowId,
        return_date: DateTime<Utc>,
    ) -> GatewayResult<()>;
}

/// Session operations of the backend auth API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> GatewayResult<TokenGrant>;

    async fn sign_out(&self, session: &Session) -> GatewayResult<()>;
}

/// HTTP client for the hosted backend
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    rest_url: String,
    auth_url: String,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// No request timeout is configured: calls wait for the backend's own answer.
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.anon_key)
            .map_err(|e| AppError::Internal(format!("Invalid backend API key: {}", e)))?;
        headers.insert("apikey", api_key);

        let http = reqwest::Client::builder()
            .user_agent(concat!("circulation-desk/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            rest_url: config.rest_url(),
            auth_url: config.auth_url(),
        })
    }

    /// Request against a table of the data API, on behalf of the session user
    fn table(&self, method: Method, table: &str, session: &Session) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .bearer_auth(session.access_token())
    }

    /// Request against the auth API
    fn auth(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}/{}", self.auth_url, path))
    }

    /// Send a request and turn any non-success status into a `GatewayError`
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> GatewayResult<Response> {
        tracing::debug!(operation, "backend request");
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::from_status(operation, status, body))
    }
}

#[async_trait]
impl LibraryGateway for BackendClient {
    async fn list_books(&self, session: &Session) -> GatewayResult<Vec<Book>> {
        self.fetch_books(session).await
    }

    async fn create_borrow(
        &self,
        session: &Session,
        book_id: BookId,
        due_date: DateTime<Utc>,
    ) -> GatewayResult<Borrow> {
        self.insert_borrow(session, book_id, due_date).await
    }

    async fn list_borrows_for_current_user(
        &self,
        session: &Session,
    ) -> GatewayResult<Vec<LedgerEntry>> {
        self.fetch_ledger(session).await
    }

    async fn close_borrow(
        &self,
        session: &Session,
        borrow_id: BorrowId,
        return_date: DateTime<Utc>,
    ) -> GatewayResult<()> {
        self.set_return_date(session, borrow_id, return_date).await
    }
}

#[async_trait]
impl AuthGateway for BackendClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> GatewayResult<TokenGrant> {
        self.password_grant(email, password).await
    }

    async fn sign_out(&self, session: &Session) -> GatewayResult<()> {
        self.logout(session).await
    }
}
