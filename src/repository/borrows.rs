//! Borrow reads and writes against the data API

use chrono::{DateTime, Utc};
use reqwest::Method;

use super::{BackendClient, FailureKind, GatewayError, GatewayResult};
use crate::models::{
    book::BookId,
    borrow::{Borrow, BorrowId, CloseBorrow, LedgerEntry, NewBorrow},
    session::Session,
};
use uuid::Uuid;

/// Columns of a ledger row, with the book's title and author embedded
const LEDGER_SELECT: &str = "id,book_id,borrow_date,due_date,return_date,book:books(title,author)";

/// Query of the ledger listing: the user's borrows, newest first
pub(crate) fn ledger_query(user_id: Uuid) -> Vec<(&'static str, String)> {
    vec![
        ("select", LEDGER_SELECT.to_string()),
        ("user_id", format!("eq.{}", user_id)),
        ("order", "borrow_date.desc".to_string()),
    ]
}

/// Filter of the return update. Matching only open borrows makes a second
/// return of the same borrow a no-op on the store side.
pub(crate) fn close_borrow_filter(borrow_id: BorrowId) -> Vec<(&'static str, String)> {
    vec![
        ("id", format!("eq.{}", borrow_id)),
        ("return_date", "is.null".to_string()),
    ]
}

impl BackendClient {
    /// Insert a borrow and return the row as assigned by the store
    pub async fn insert_borrow(
        &self,
        session: &Session,
        book_id: BookId,
        due_date: DateTime<Utc>,
    ) -> GatewayResult<Borrow> {
        let row = NewBorrow {
            book_id,
            user_id: session.user_id(),
            due_date,
        };
        let request = self
            .table(Method::POST, "borrows", session)
            .header("Prefer", "return=representation")
            .json(&[row]);

        let mut created = self
            .send("create_borrow", request)
            .await?
            .json::<Vec<Borrow>>()
            .await
            .map_err(|e| GatewayError::from_reqwest("create_borrow", e))?;

        if created.is_empty() {
            return Err(GatewayError::new(
                "create_borrow",
                FailureKind::Permanent,
                "insert returned no row",
            ));
        }
        Ok(created.swap_remove(0))
    }

    /// Get the session user's borrows joined with book title and author
    pub async fn fetch_ledger(&self, session: &Session) -> GatewayResult<Vec<LedgerEntry>> {
        let request = self
            .table(Method::GET, "borrows", session)
            .query(&ledger_query(session.user_id()));

        self.send("list_borrows", request)
            .await?
            .json::<Vec<LedgerEntry>>()
            .await
            .map_err(|e| GatewayError::from_reqwest("list_borrows", e))
    }

    /// Set `return_date` on an open borrow
    pub async fn set_return_date(
        &self,
        session: &Session,
        borrow_id: BorrowId,
        return_date: DateTime<Utc>,
    ) -> GatewayResult<()> {
        let request = self
            .table(Method::PATCH, "borrows", session)
            .query(&close_borrow_filter(borrow_id))
            .header("Prefer", "return=minimal")
            .json(&CloseBorrow { return_date });

        self.send("close_borrow", request).await?;
        Ok(())
    }
}
