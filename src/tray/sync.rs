//! Synced tabs middleware.
//!
//! `SyncNow` flips the `syncing` flag through the reducer as usual; the
//! network fetch runs on a tokio task and reports back with follow-up
//! dispatches once it completes.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;

use crate::store::{DispatchError, Middleware, MiddlewareContext, Next, StoreHandle};

use super::action::TrayAction;
use super::state::{SyncedTab, TrayState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("No account signed in")]
    SignedOut,

    #[error("Sync failed: {0}")]
    Failed(String),
}

/// Source of tabs from paired devices.
pub trait TabSyncer: Send + Sync + 'static {
    fn sync(&self) -> impl Future<Output = Result<Vec<SyncedTab>, SyncError>> + Send;
}

/// Runs a [`TabSyncer`] whenever `SyncNow` is dispatched.
///
/// On success dispatches `UpdateSyncedTabs` followed by `SyncCompleted`; on
/// failure only `SyncCompleted`. If the store is gone by then the results
/// are dropped.
pub struct SyncMiddleware<T> {
    syncer: Arc<T>,
    runtime: Handle,
}

impl<T: TabSyncer> SyncMiddleware<T> {
    pub fn new(syncer: T, runtime: Handle) -> Self {
        Self {
            syncer: Arc::new(syncer),
            runtime,
        }
    }

    fn spawn_sync(&self, store: StoreHandle<TrayState, TrayAction>) {
        let syncer = Arc::clone(&self.syncer);
        self.runtime.spawn(async move {
            let result = syncer.sync().await;
            let outcome = match result {
                Ok(tabs) => {
                    tracing::debug!(tabs = tabs.len(), "Synced tabs fetched");
                    store
                        .dispatch(TrayAction::UpdateSyncedTabs(tabs))
                        .and_then(|()| store.dispatch(TrayAction::SyncCompleted))
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Tab sync failed");
                    store.dispatch(TrayAction::SyncCompleted)
                }
            };

            match outcome {
                Ok(()) => {}
                Err(DispatchError::StoreClosed) => {
                    tracing::debug!("Store dropped before sync finished, discarding result");
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Failed to publish sync result");
                }
            }
        });
    }
}

impl<T: TabSyncer> Middleware<TrayState, TrayAction> for SyncMiddleware<T> {
    fn name(&self) -> &'static str {
        "sync"
    }

    fn handle(
        &self,
        ctx: &MiddlewareContext<'_, TrayState, TrayAction>,
        next: &Next<'_, TrayState, TrayAction>,
        action: TrayAction,
    ) -> Result<(), DispatchError> {
        let start_sync = matches!(action, TrayAction::SyncNow);
        next.call(action)?;
        if start_sync {
            self.spawn_sync(ctx.store());
        }
        Ok(())
    }
}
