//! Circulation Desk
//!
//! Borrowing front-end for a small library. Books, borrows and user accounts
//! live in a hosted backend; this crate renders the catalog and the user's
//! borrow ledger, and forwards borrow and return actions.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
