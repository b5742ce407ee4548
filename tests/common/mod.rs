//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use traystore::store::{
    DispatchError, Middleware, MiddlewareContext, Next, State, Store, Subscription,
};
use traystore::tray::{Tab, TabId, TrayAction, TrayState};

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Tab with a fixed, readable id.
pub fn tab(id: &str) -> Tab {
    Tab::new(format!("https://{}.example", id), id.to_uppercase()).with_id(TabId::new(id))
}

/// Create a temporary config file with the given TOML content.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Subscribe a callback that records every published snapshot.
pub fn record_states<S: State, A: traystore::store::Action>(
    store: &Store<S, A>,
) -> (Subscription<S>, Arc<Mutex<Vec<Arc<S>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = store.subscribe(move |state| sink.lock().push(Arc::clone(state)));
    (subscription, seen)
}

// -- Middleware spies ---------------------------------------------------------

/// Records `<name>:pre` and `<name>:post` around the rest of the chain.
pub struct Tracer {
    pub name: &'static str,
    pub log: EventLog,
}

impl<S: State, A: traystore::store::Action> Middleware<S, A> for Tracer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle(
        &self,
        _ctx: &MiddlewareContext<'_, S, A>,
        next: &Next<'_, S, A>,
        action: A,
    ) -> Result<(), DispatchError> {
        self.log.lock().push(format!("{}:pre", self.name));
        let result = next.call(action);
        self.log.lock().push(format!("{}:post", self.name));
        result
    }
}

pub fn tray_store_with(
    middleware: Vec<Box<dyn Middleware<TrayState, TrayAction>>>,
) -> Store<TrayState, TrayAction> {
    traystore::tray::tray_store(TrayState::default(), middleware)
}
