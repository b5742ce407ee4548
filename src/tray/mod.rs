//! Tabs tray feature module.
//!
//! Holds the tray's page, multi-select mode, tab lists and sync flag.
//!
//! # Architecture
//!
//! - `state.rs` - Tray state, selection mode and tab types
//! - `action.rs` - User and system actions (selection, paging, sync, list updates)
//! - `reducer.rs` - State transitions (pure, no side effects)
//! - `sync.rs` - Middleware fetching synced tabs in the background

mod action;
mod reducer;
mod state;
mod sync;

pub use action::TrayAction;
pub use reducer::TrayReducer;
pub use state::{Mode, Page, SyncedTab, Tab, TabId, TrayState};
pub use sync::{SyncError, SyncMiddleware, TabSyncer};

use crate::config::StoreConfig;
use crate::store::{Middleware, Store};

pub type TrayStore = Store<TrayState, TrayAction>;

/// Build the tray store with the given middleware, outermost first.
pub fn tray_store(
    initial: TrayState,
    middleware: Vec<Box<dyn Middleware<TrayState, TrayAction>>>,
) -> TrayStore {
    Store::with_config(initial, TrayReducer, middleware, StoreConfig::named("tabs-tray"))
}
