//! Availability view: the catalog with a borrow action per book

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::{sync::RwLock, task::JoinHandle};
use utoipa::ToSchema;

use crate::{
    models::{
        book::{Book, BookId},
        borrow::{due_date_for, Borrow},
        session::Session,
    },
    repository::LibraryGateway,
};

use super::view::{load_into, mutate, ActionOutcome, LifetimeToken, Notice, ViewLifetime, ViewState};

/// One book as shown in the catalog
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookCard {
    #[schema(value_type = uuid::Uuid)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub available: u32,
    /// Borrow control state; disabled when no copy is available
    pub can_borrow: bool,
}

/// Rendered catalog screen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogScreen {
    pub loading: bool,
    pub books: Vec<BookCard>,
    pub notice: Option<Notice>,
}

struct CatalogInner {
    gateway: Arc<dyn LibraryGateway>,
    session: Session,
    state: RwLock<ViewState<Book>>,
}

impl CatalogInner {
    async fn load(&self, token: &LifetimeToken) -> bool {
        load_into(
            &self.state,
            token,
            "books",
            self.gateway.list_books(&self.session),
        )
        .await
    }
}

/// A mounted catalog view
pub struct CatalogView {
    inner: Arc<CatalogInner>,
    lifetime: ViewLifetime,
}

impl CatalogView {
    /// Mount the view; it renders as loading until the first load resolves
    pub fn mount(gateway: Arc<dyn LibraryGateway>, session: Session) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                gateway,
                session,
                state: RwLock::new(ViewState::mounting()),
            }),
            lifetime: ViewLifetime::new(),
        }
    }

    /// Load all books ordered by title
    pub async fn load(&self) -> bool {
        self.inner.load(&self.lifetime.token()).await
    }

    /// Load in the background, leaving the caller free to render meanwhile
    pub fn spawn_load(&self) -> JoinHandle<bool> {
        let inner = Arc::clone(&self.inner);
        let token = self.lifetime.token();
        tokio::spawn(async move { inner.load(&token).await })
    }

    /// Borrow a book for two weeks, then reload the catalog.
    ///
    /// Stock is not checked here: the store decides whether the borrow succeeds.
    pub async fn borrow(&self, book_id: BookId) -> ActionOutcome<Borrow> {
        let token = self.lifetime.token();
        let due_date = due_date_for(Utc::now());
        tracing::info!(%book_id, %due_date, "Borrowing book");

        let outcome = mutate(
            &self.inner.state,
            &token,
            "borrowing book",
            self.inner
                .gateway
                .create_borrow(&self.inner.session, book_id, due_date),
        )
        .await;

        if outcome.is_done() {
            self.inner.load(&token).await;
        }
        outcome
    }

    pub async fn state(&self) -> ViewState<Book> {
        self.inner.state.read().await.clone()
    }

    pub async fn render(&self) -> CatalogScreen {
        let state = self.inner.state.read().await;
        CatalogScreen {
            loading: state.is_loading(),
            books: state
                .items()
                .iter()
                .map(|book| BookCard {
                    id: book.id,
                    title: book.title.clone(),
                    author: book.author.clone(),
                    isbn: book.isbn.clone(),
                    available: book.available,
                    can_borrow: book.is_borrowable(),
                })
                .collect(),
            notice: state.notice(),
        }
    }

    /// End the view's lifetime; responses still in flight are dropped
    pub fn unmount(self) {
        self.lifetime.end();
    }
}
