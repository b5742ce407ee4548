mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use traystore::store::LoggingMiddleware;
use traystore::tray::{SyncError, SyncMiddleware, SyncedTab, TabSyncer, TrayAction};

use common::{record_states, tray_store_with};

/// Syncer that waits for the test to release it before answering.
struct GatedSyncer {
    gate: Arc<Notify>,
    result: Result<Vec<SyncedTab>, SyncError>,
}

impl TabSyncer for GatedSyncer {
    async fn sync(&self) -> Result<Vec<SyncedTab>, SyncError> {
        self.gate.notified().await;
        self.result.clone()
    }
}

fn synced(title: &str) -> SyncedTab {
    SyncedTab {
        device: "Desktop".to_string(),
        title: title.to_string(),
        url: format!("https://{}.example", title),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sync_now_publishes_tabs_then_completes() {
    let gate = Arc::new(Notify::new());
    let syncer = GatedSyncer {
        gate: Arc::clone(&gate),
        result: Ok(vec![synced("news"), synced("mail")]),
    };
    let store = tray_store_with(vec![
        Box::new(LoggingMiddleware::new()),
        Box::new(SyncMiddleware::new(syncer, tokio::runtime::Handle::current())),
    ]);
    let (_sub, seen) = record_states(&store);
    let mut rx = store.watch();

    store.dispatch(TrayAction::SyncNow).unwrap();
    assert!(store.state().syncing);

    gate.notify_one();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|state| !state.syncing))
        .await
        .expect("sync did not complete")
        .unwrap();

    let state = store.state();
    assert_eq!(state.synced_tabs.len(), 2);
    assert_eq!(state.synced_tabs[0].title, "news");

    let syncing: Vec<bool> = seen.lock().iter().map(|s| s.syncing).collect();
    assert_eq!(syncing, vec![true, true, false]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_sync_still_completes() {
    let gate = Arc::new(Notify::new());
    let syncer = GatedSyncer {
        gate: Arc::clone(&gate),
        result: Err(SyncError::SignedOut),
    };
    let store = tray_store_with(vec![Box::new(SyncMiddleware::new(
        syncer,
        tokio::runtime::Handle::current(),
    ))]);
    let mut rx = store.watch();

    store.dispatch(TrayAction::SyncNow).unwrap();
    gate.notify_one();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|state| !state.syncing))
        .await
        .expect("sync did not complete")
        .unwrap();

    assert!(store.state().synced_tabs.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn other_actions_do_not_start_sync() {
    let gate = Arc::new(Notify::new());
    let syncer = GatedSyncer {
        gate: Arc::clone(&gate),
        result: Ok(vec![synced("never")]),
    };
    let store = tray_store_with(vec![Box::new(SyncMiddleware::new(
        syncer,
        tokio::runtime::Handle::current(),
    ))]);

    store.dispatch(TrayAction::SyncCompleted).unwrap();
    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(store.state().synced_tabs.is_empty());
    assert!(!store.state().syncing);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn result_discarded_after_store_dropped() {
    let gate = Arc::new(Notify::new());
    let syncer = GatedSyncer {
        gate: Arc::clone(&gate),
        result: Ok(vec![synced("late")]),
    };
    let store = tray_store_with(vec![Box::new(SyncMiddleware::new(
        syncer,
        tokio::runtime::Handle::current(),
    ))]);
    let handle = store.handle();
    let rx = store.watch();

    store.dispatch(TrayAction::SyncNow).unwrap();
    drop(store);
    assert!(handle.is_closed());

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The last published snapshot is still the one from SyncNow.
    let last = rx.borrow();
    assert!(last.syncing);
    assert!(last.synced_tabs.is_empty());
}
