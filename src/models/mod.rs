//! Data models for the circulation desk

pub mod book;
pub mod borrow;
pub mod session;

// Re-export commonly used types
pub use book::{Book, BookId};
pub use borrow::{Borrow, BorrowId, BorrowStatus, LedgerEntry};
pub use session::{Session, SessionClaims, UserIdentity};
