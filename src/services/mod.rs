//! Views and session services

pub mod catalog;
pub mod ledger;
pub mod session;
pub mod view;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    models::session::Session,
    repository::{AuthGateway, LibraryGateway},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub gateway: Arc<dyn LibraryGateway>,
    pub session: session::SessionGate,
}

impl Services {
    pub fn new(
        gateway: Arc<dyn LibraryGateway>,
        auth: Arc<dyn AuthGateway>,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            gateway,
            session: session::SessionGate::new(auth, auth_config),
        }
    }

    /// Mount the availability view for a signed-in user
    pub fn catalog(&self, session: Session) -> catalog::CatalogView {
        catalog::CatalogView::mount(Arc::clone(&self.gateway), session)
    }

    /// Mount the borrow ledger view for a signed-in user
    pub fn ledger(&self, session: Session) -> ledger::LedgerView {
        ledger::LedgerView::mount(Arc::clone(&self.gateway), session)
    }
}
