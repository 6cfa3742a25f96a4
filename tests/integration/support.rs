//! In-memory stand-in for the hosted backend.
//!
//! Behaves like the store the front-end expects: it assigns ids and borrow
//! dates, keeps `available` in step with open borrows, scopes ledger reads to
//! the token's user and only closes open borrows.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use circulation_desk::{
    api,
    config::AppConfig,
    models::{
        book::{Book, BookId},
        borrow::{BookSummary, Borrow, BorrowId, LedgerEntry},
        session::{AuthUser, Session, SessionClaims, TokenGrant},
    },
    repository::{AuthGateway, FailureKind, GatewayError, GatewayResult, LibraryGateway},
    services::Services,
    AppState,
};

struct Account {
    email: String,
    password: String,
    id: Uuid,
}

#[derive(Default)]
struct Tables {
    books: Vec<Book>,
    borrows: Vec<(Uuid, Borrow)>,
    accounts: Vec<Account>,
    last_borrow_date: Option<DateTime<Utc>>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: Mutex<Option<&'static str>>,
    jwt_secret: String,
}

impl MemoryStore {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            failing: Mutex::new(None),
            jwt_secret: jwt_secret.to_string(),
        }
    }

    pub fn add_book(&self, title: &str, author: &str, available: u32) -> BookId {
        let id = Uuid::new_v4();
        let mut tables = self.tables.lock().unwrap();
        let isbn = format!("978{:010}", tables.books.len());
        tables.books.push(Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            isbn,
            available,
        });
        id
    }

    pub fn add_account(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            id,
        });
        id
    }

    pub fn available(&self, book_id: BookId) -> u32 {
        let tables = self.tables.lock().unwrap();
        tables
            .books
            .iter()
            .find(|book| book.id == book_id)
            .map(|book| book.available)
            .unwrap_or(0)
    }

    /// Make the next call of `operation` fail as if the backend were unreachable
    pub fn fail_next(&self, operation: &'static str) {
        *self.failing.lock().unwrap() = Some(operation);
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        let now = Utc::now();
        SessionClaims {
            sub: user_id,
            email: None,
            role: Some("authenticated".to_string()),
            aud: "authenticated".to_string(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        }
        .create_token(&self.jwt_secret)
        .unwrap()
    }

    fn check_failure(&self, operation: &'static str) -> GatewayResult<()> {
        let mut failing = self.failing.lock().unwrap();
        if *failing == Some(operation) {
            *failing = None;
            return Err(GatewayError::new(
                operation,
                FailureKind::Transient,
                "connection reset by peer",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryGateway for MemoryStore {
    async fn list_books(&self, _session: &Session) -> GatewayResult<Vec<Book>> {
        self.check_failure("list_books")?;
        let mut books = self.tables.lock().unwrap().books.clone();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn create_borrow(
        &self,
        session: &Session,
        book_id: BookId,
        due_date: DateTime<Utc>,
    ) -> GatewayResult<Borrow> {
        self.check_failure("create_borrow")?;
        let mut tables = self.tables.lock().unwrap();

        let Some(book) = tables.books.iter_mut().find(|book| book.id == book_id) else {
            return Err(GatewayError::new(
                "create_borrow",
                FailureKind::Permanent,
                "violates foreign key constraint",
            ));
        };
        if book.available == 0 {
            return Err(GatewayError::new(
                "create_borrow",
                FailureKind::Permanent,
                "no copies available",
            ));
        }
        book.available -= 1;

        // Strictly increasing so that ledger ordering is deterministic
        let mut borrow_date = Utc::now();
        if let Some(last) = tables.last_borrow_date {
            if borrow_date <= last {
                borrow_date = last + Duration::milliseconds(1);
            }
        }
        tables.last_borrow_date = Some(borrow_date);

        let borrow = Borrow {
            id: Uuid::new_v4(),
            book_id,
            borrow_date,
            due_date,
            return_date: None,
        };
        tables.borrows.push((session.user_id(), borrow.clone()));
        Ok(borrow)
    }

    async fn list_borrows_for_current_user(
        &self,
        session: &Session,
    ) -> GatewayResult<Vec<LedgerEntry>> {
        self.check_failure("list_borrows")?;
        let tables = self.tables.lock().unwrap();

        let mut entries: Vec<LedgerEntry> = tables
            .borrows
            .iter()
            .filter(|(owner, _)| *owner == session.user_id())
            .filter_map(|(_, borrow)| {
                let book = tables.books.iter().find(|book| book.id == borrow.book_id)?;
                Some(LedgerEntry {
                    id: borrow.id,
                    book_id: borrow.book_id,
                    borrow_date: borrow.borrow_date,
                    due_date: borrow.due_date,
                    return_date: borrow.return_date,
                    book: BookSummary {
                        title: book.title.clone(),
                        author: book.author.clone(),
                    },
                })
            })
            .collect();
        entries.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
        Ok(entries)
    }

    async fn close_borrow(
        &self,
        session: &Session,
        borrow_id: BorrowId,
        return_date: DateTime<Utc>,
    ) -> GatewayResult<()> {
        self.check_failure("close_borrow")?;
        let mut tables = self.tables.lock().unwrap();

        let closed = tables
            .borrows
            .iter_mut()
            .find(|(owner, borrow)| {
                *owner == session.user_id() && borrow.id == borrow_id && borrow.is_open()
            })
            .map(|(_, borrow)| {
                borrow.return_date = Some(return_date);
                borrow.book_id
            });

        if let Some(book_id) = closed {
            if let Some(book) = tables.books.iter_mut().find(|book| book.id == book_id) {
                book.available += 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AuthGateway for MemoryStore {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> GatewayResult<TokenGrant> {
        let user_id = {
            let tables = self.tables.lock().unwrap();
            tables
                .accounts
                .iter()
                .find(|account| account.email == email && account.password == password)
                .map(|account| account.id)
        };

        let Some(user_id) = user_id else {
            return Err(GatewayError {
                operation: "sign_in",
                kind: FailureKind::Permanent,
                status: Some(400),
                message: "Invalid login credentials".to_string(),
            });
        };

        Ok(TokenGrant {
            access_token: self.token_for(user_id),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            refresh_token: Uuid::new_v4().to_string(),
            user: AuthUser {
                id: user_id,
                email: Some(email.to_string()),
            },
        })
    }

    async fn sign_out(&self, _session: &Session) -> GatewayResult<()> {
        Ok(())
    }
}

/// Router wired to a fresh in-memory store
pub fn app() -> (Router, Arc<MemoryStore>) {
    let config = AppConfig::default();
    let store = Arc::new(MemoryStore::new(&config.auth.jwt_secret));
    let services = Services::new(store.clone(), store.clone(), config.auth.clone());
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    (api::router(state), store)
}
