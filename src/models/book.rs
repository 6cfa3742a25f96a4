//! Book (catalog entry) model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub type BookId = Uuid;

/// Book row as stored by the backend.
///
/// `available` is maintained by the store as borrows are opened and closed;
/// this layer only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    #[schema(value_type = uuid::Uuid)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub available: u32,
}

impl Book {
    /// Whether the borrow control should be offered.
    ///
    /// Advisory only: the store decides whether a borrow actually succeeds.
    pub fn is_borrowable(&self) -> bool {
        self.available > 0
    }
}
