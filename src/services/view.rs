//! State shared by every screen: the per-view state container, the lifetime
//! token that binds in-flight requests to a mounted view, and the
//! fetch/mutate protocol built on both.

use std::future::Future;

use serde::Serialize;
use tokio::sync::{watch, RwLock};
use utoipa::ToSchema;

use crate::repository::{FailureKind, GatewayError, GatewayResult};

/// State of one view: the last loaded items, whether a load is in flight,
/// and the last failure seen.
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    items: Vec<T>,
    is_loading: bool,
    last_error: Option<GatewayError>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            last_error: None,
        }
    }
}

impl<T> ViewState<T> {
    /// State of a freshly mounted view, whose first load is about to start
    pub fn mounting() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn start_load(&mut self) {
        self.is_loading = true;
    }

    pub fn succeed(&mut self, items: Vec<T>) {
        self.items = items;
        self.is_loading = false;
        self.last_error = None;
    }

    /// A failed load keeps the previous items on display
    pub fn fail(&mut self, error: GatewayError) {
        self.is_loading = false;
        self.last_error = Some(error);
    }

    /// A failed mutation changes nothing but the recorded error
    pub fn record_failure(&mut self, error: GatewayError) {
        self.last_error = Some(error);
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref()
    }

    /// Only transient failures are shown, as an invitation to retry
    pub fn notice(&self) -> Option<Notice> {
        self.last_error
            .as_ref()
            .filter(|e| e.kind == FailureKind::Transient)
            .map(|e| Notice {
                message: format!("Could not reach the library service ({})", e.operation),
                retryable: true,
            })
    }
}

/// Retry hint rendered with a screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notice {
    pub message: String,
    pub retryable: bool,
}

/// Lifetime of a mounted view. Ends on `end()` or when dropped.
#[derive(Debug)]
pub struct ViewLifetime {
    alive: watch::Sender<bool>,
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewLifetime {
    pub fn new() -> Self {
        let (alive, _) = watch::channel(true);
        Self { alive }
    }

    pub fn token(&self) -> LifetimeToken {
        LifetimeToken(self.alive.subscribe())
    }

    pub fn end(&self) {
        self.alive.send_replace(false);
    }
}

impl Drop for ViewLifetime {
    fn drop(&mut self) {
        self.alive.send_replace(false);
    }
}

/// Handle held by in-flight requests of a view
#[derive(Debug, Clone)]
pub struct LifetimeToken(watch::Receiver<bool>);

impl LifetimeToken {
    pub fn is_active(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the view has been unmounted
    pub async fn cancelled(&mut self) {
        // Err means the lifetime itself is gone, which is also the end
        let _ = self.0.wait_for(|alive| !alive).await;
    }

    /// Drive `fut` while the view is mounted; `None` if it was unmounted first
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if !self.is_active() {
            return None;
        }
        let mut token = self.clone();
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

/// Result of a user action on a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    /// The backend accepted the action and the view was reloaded
    Done(T),
    /// The backend rejected the action or could not be reached
    Failed(GatewayError),
    /// The view was unmounted before the backend answered
    Abandoned,
}

impl<T> ActionOutcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, ActionOutcome::Done(_))
    }
}

/// Fetch-then-store cycle of a view.
///
/// Returns whether the response was applied to `state`.
pub(crate) async fn load_into<T, F>(
    state: &RwLock<ViewState<T>>,
    token: &LifetimeToken,
    what: &'static str,
    fetch: F,
) -> bool
where
    F: Future<Output = GatewayResult<Vec<T>>>,
{
    if !token.is_active() {
        return false;
    }
    state.write().await.start_load();

    let Some(result) = token.run(fetch).await else {
        tracing::debug!(view = what, "view unmounted, dropping response");
        return false;
    };
    if !token.is_active() {
        return false;
    }

    match result {
        Ok(items) => {
            tracing::debug!(view = what, count = items.len(), "view loaded");
            state.write().await.succeed(items);
        }
        Err(e) => {
            tracing::error!(view = what, error = %e, "Error fetching {}", what);
            state.write().await.fail(e);
        }
    }
    true
}

/// First half of the mutate-then-reload protocol: run the action and record
/// a failure. The caller reloads on `Done`.
pub(crate) async fn mutate<T, S, F>(
    state: &RwLock<ViewState<S>>,
    token: &LifetimeToken,
    what: &'static str,
    action: F,
) -> ActionOutcome<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    let Some(result) = token.run(action).await else {
        tracing::debug!(action = what, "view unmounted, dropping response");
        return ActionOutcome::Abandoned;
    };

    match result {
        Ok(value) => ActionOutcome::Done(value),
        Err(e) => {
            tracing::error!(action = what, error = %e, "Error {}", what);
            if token.is_active() {
                state.write().await.record_failure(e.clone());
            }
            ActionOutcome::Failed(e)
        }
    }
}
