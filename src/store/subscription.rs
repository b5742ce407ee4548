//! Subscriber registry and subscription tokens.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;

pub(crate) type Callback<S> = Box<dyn Fn(&Arc<S>) + Send + Sync>;

/// Runs work inside the owning store's dispatch critical section, so it is
/// ordered against every dispatch and its notification cycle.
pub(crate) trait DispatchGate: Send + Sync {
    fn serialize(&self, work: &mut dyn FnMut());
}

struct Subscriber<S> {
    id: u64,
    callback: Callback<S>,
    removed: AtomicBool,
    paused: AtomicBool,
}

impl<S> Subscriber<S> {
    fn is_active(&self) -> bool {
        !self.removed.load(Ordering::SeqCst) && !self.paused.load(Ordering::SeqCst)
    }
}

/// Ordered set of callbacks owned by a store.
pub(crate) struct SubscriberRegistry<S> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Arc<Subscriber<S>>>>,
}

impl<S> SubscriberRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn register(
        self: &Arc<Self>,
        callback: Callback<S>,
        latest: watch::Receiver<Arc<S>>,
        gate: Weak<dyn DispatchGate>,
    ) -> Subscription<S> {
        let subscriber = Arc::new(Subscriber {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            callback,
            removed: AtomicBool::new(false),
            paused: AtomicBool::new(false),
        });
        self.entries.lock().push(Arc::clone(&subscriber));

        Subscription {
            registry: Arc::downgrade(self),
            subscriber,
            latest,
            gate,
        }
    }

    /// Deliver `state` to every active subscriber, in registration order.
    ///
    /// Works on a copy of the list so callbacks may subscribe or unsubscribe
    /// without deadlocking; the per-subscriber flags make removal effective
    /// immediately, even for the rest of this cycle.
    pub(crate) fn notify(&self, state: &Arc<S>) {
        let snapshot: Vec<Arc<Subscriber<S>>> = self.entries.lock().clone();
        for subscriber in snapshot {
            if subscriber.is_active() {
                (subscriber.callback)(state);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn remove(&self, id: u64) {
        self.entries.lock().retain(|s| s.id != id);
    }
}

/// Token returned by [`Store::subscribe`](super::Store::subscribe).
///
/// Owns only the callback registration, never the store. Dropping it leaves
/// the callback registered; call [`unsubscribe`](Self::unsubscribe) on
/// teardown.
pub struct Subscription<S> {
    registry: Weak<SubscriberRegistry<S>>,
    subscriber: Arc<Subscriber<S>>,
    latest: watch::Receiver<Arc<S>>,
    gate: Weak<dyn DispatchGate>,
}

impl<S> Subscription<S> {
    pub fn id(&self) -> u64 {
        self.subscriber.id
    }

    /// Permanently deregister the callback. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if self.subscriber.removed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.subscriber.id);
        }
        tracing::debug!(subscriber = self.subscriber.id, "Subscriber removed");
    }

    /// Stop delivering states without deregistering.
    pub fn pause(&self) {
        self.subscriber.paused.store(true, Ordering::SeqCst);
    }

    /// Resume delivery and immediately hand the callback the current state.
    ///
    /// Waits for a dispatch running on another thread to finish, so the
    /// catch-up state is never older than one already delivered. Does
    /// nothing once unsubscribed.
    pub fn resume(&self) {
        let mut catch_up = || {
            if self.subscriber.removed.load(Ordering::SeqCst) {
                return;
            }
            if self.subscriber.paused.swap(false, Ordering::SeqCst) {
                let current = Arc::clone(&*self.latest.borrow());
                (self.subscriber.callback)(&current);
            }
        };

        match self.gate.upgrade() {
            Some(gate) => gate.serialize(&mut catch_up),
            // Store is gone, nothing can dispatch concurrently.
            None => catch_up(),
        }
    }

    /// Whether the callback currently receives states.
    pub fn is_active(&self) -> bool {
        self.subscriber.is_active()
    }
}
