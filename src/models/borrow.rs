//! Borrow (loan) model and the due-date/status rules

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::book::BookId;

pub type BorrowId = Uuid;

/// Length of a loan, counted from the borrow date
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Due date of a loan opened at `borrowed_at`
pub fn due_date_for(borrowed_at: DateTime<Utc>) -> DateTime<Utc> {
    borrowed_at + Duration::days(LOAN_PERIOD_DAYS)
}

/// Borrow row as returned by the backend.
///
/// A borrow is open while `return_date` is `None`; it is closed exactly once by
/// setting `return_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Borrow {
    #[schema(value_type = uuid::Uuid)]
    pub id: BorrowId,
    #[schema(value_type = uuid::Uuid)]
    pub book_id: BookId,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl Borrow {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Insert payload for a new borrow; `id` and `borrow_date` are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBorrow {
    pub book_id: BookId,
    pub user_id: Uuid,
    pub due_date: DateTime<Utc>,
}

/// Update payload closing a borrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseBorrow {
    pub return_date: DateTime<Utc>,
}

/// Book columns embedded in a ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub title: String,
    pub author: String,
}

/// Borrow joined with the title and author of its book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntry {
    #[schema(value_type = uuid::Uuid)]
    pub id: BorrowId,
    #[schema(value_type = uuid::Uuid)]
    pub book_id: BookId,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub book: BookSummary,
}

impl LedgerEntry {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> BorrowStatus {
        BorrowStatus::derive(self.return_date, self.due_date, now)
    }
}

/// Display status of a borrow. Never stored: it depends on the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BorrowStatus {
    Returned,
    Overdue,
    Borrowed,
}

impl BorrowStatus {
    /// Returned wins over Overdue; a loan is overdue only strictly after its due date.
    pub fn derive(
        return_date: Option<DateTime<Utc>>,
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        if return_date.is_some() {
            BorrowStatus::Returned
        } else if now > due_date {
            BorrowStatus::Overdue
        } else {
            BorrowStatus::Borrowed
        }
    }
}
