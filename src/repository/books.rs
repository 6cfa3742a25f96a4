//! Book reads against the data API

use reqwest::Method;

use super::{BackendClient, GatewayError, GatewayResult};
use crate::models::{book::Book, session::Session};

/// Query of the catalog listing: every column, ordered by title
pub(crate) fn list_books_query() -> [(&'static str, &'static str); 2] {
    [("select", "*"), ("order", "title.asc")]
}

impl BackendClient {
    /// Get all books ordered by title
    pub async fn fetch_books(&self, session: &Session) -> GatewayResult<Vec<Book>> {
        let request = self
            .table(Method::GET, "books", session)
            .query(&list_books_query());

        self.send("list_books", request)
            .await?
            .json::<Vec<Book>>()
            .await
            .map_err(|e| GatewayError::from_reqwest("list_books", e))
    }
}
