//! Borrow ledger view: the signed-in user's borrows with their status and a
//! return action

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{sync::RwLock, task::JoinHandle};
use utoipa::ToSchema;

use crate::{
    models::{
        borrow::{BorrowId, BorrowStatus, LedgerEntry},
        session::Session,
    },
    repository::LibraryGateway,
};

use super::view::{load_into, mutate, ActionOutcome, LifetimeToken, Notice, ViewLifetime, ViewState};

const DISPLAY_DATE: &str = "%b %-d, %Y";

/// One borrow as shown in the ledger.
///
/// `borrowed_on` and `due_on` are calendar days in UTC. The raw timestamps are
/// carried alongside for presenters that render in the viewer's own zone.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerRow {
    #[schema(value_type = uuid::Uuid)]
    pub id: BorrowId,
    pub title: String,
    pub author: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    /// e.g. "Mar 1, 2026"
    pub borrowed_on: String,
    pub due_on: String,
    pub status: BorrowStatus,
    /// Return control; hidden once the borrow is closed
    pub can_return: bool,
}

impl LedgerRow {
    fn render(entry: &LedgerEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: entry.id,
            title: entry.book.title.clone(),
            author: entry.book.author.clone(),
            borrow_date: entry.borrow_date,
            due_date: entry.due_date,
            return_date: entry.return_date,
            borrowed_on: entry.borrow_date.format(DISPLAY_DATE).to_string(),
            due_on: entry.due_date.format(DISPLAY_DATE).to_string(),
            status: entry.status_at(now),
            can_return: entry.is_open(),
        }
    }
}

/// Rendered ledger screen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerScreen {
    pub loading: bool,
    pub borrows: Vec<LedgerRow>,
    pub notice: Option<Notice>,
}

struct LedgerInner {
    gateway: Arc<dyn LibraryGateway>,
    session: Session,
    state: RwLock<ViewState<LedgerEntry>>,
}

impl LedgerInner {
    async fn load(&self, token: &LifetimeToken) -> bool {
        load_into(
            &self.state,
            token,
            "borrows",
            self.gateway.list_borrows_for_current_user(&self.session),
        )
        .await
    }
}

/// A mounted ledger view
pub struct LedgerView {
    inner: Arc<LedgerInner>,
    lifetime: ViewLifetime,
}

impl LedgerView {
    pub fn mount(gateway: Arc<dyn LibraryGateway>, session: Session) -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                gateway,
                session,
                state: RwLock::new(ViewState::mounting()),
            }),
            lifetime: ViewLifetime::new(),
        }
    }

    /// Load the user's borrows, newest first
    pub async fn load(&self) -> bool {
        self.inner.load(&self.lifetime.token()).await
    }

    pub fn spawn_load(&self) -> JoinHandle<bool> {
        let inner = Arc::clone(&self.inner);
        let token = self.lifetime.token();
        tokio::spawn(async move { inner.load(&token).await })
    }

    /// Close a borrow as of now, then reload the ledger.
    ///
    /// Ownership of the borrow is enforced by the store's access policy.
    pub async fn return_book(&self, borrow_id: BorrowId) -> ActionOutcome<()> {
        let token = self.lifetime.token();
        let return_date = Utc::now();
        tracing::info!(%borrow_id, %return_date, "Returning book");

        let outcome = mutate(
            &self.inner.state,
            &token,
            "returning book",
            self.inner
                .gateway
                .close_borrow(&self.inner.session, borrow_id, return_date),
        )
        .await;

        if outcome.is_done() {
            self.inner.load(&token).await;
        }
        outcome
    }

    pub async fn state(&self) -> ViewState<LedgerEntry> {
        self.inner.state.read().await.clone()
    }

    /// Render with statuses computed against the current time
    pub async fn render(&self) -> LedgerScreen {
        self.render_at(Utc::now()).await
    }

    /// Statuses are derived on every render; nothing is cached between renders
    pub async fn render_at(&self, now: DateTime<Utc>) -> LedgerScreen {
        let state = self.inner.state.read().await;
        LedgerScreen {
            loading: state.is_loading(),
            borrows: state
                .items()
                .iter()
                .map(|entry| LedgerRow::render(entry, now))
                .collect(),
            notice: state.notice(),
        }
    }

    pub fn unmount(self) {
        self.lifetime.end();
    }
}
