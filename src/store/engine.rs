//! The store: current state, reducer, middleware and subscribers.
//!
//! All mutation goes through [`Store::dispatch`]. The dispatch critical
//! section (middleware chain, reducer, state swap, notification) is
//! serialized by a reentrant lock, while [`Store::state`] reads the snapshot
//! lock-free.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use parking_lot::ReentrantMutex;
use tokio::sync::watch;

use super::action::Action;
use super::error::DispatchError;
use super::middleware::{Middleware, Pipeline};
use super::reducer::Reducer;
use super::state::State;
use super::subscription::{DispatchGate, SubscriberRegistry, Subscription};
use crate::config::StoreConfig;

/// Unidirectional state container.
///
/// Cloning is cheap and every clone refers to the same store. The store is
/// torn down when the last clone is dropped; [`StoreHandle`]s held by async
/// work do not keep it alive.
pub struct Store<S, A> {
    inner: Arc<Inner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S, A> {
    name: String,
    state: ArcSwap<S>,
    watch: watch::Sender<Arc<S>>,
    reducer: Box<dyn Reducer<S, A>>,
    middleware: Vec<Box<dyn Middleware<S, A>>>,
    subscribers: Arc<SubscriberRegistry<S>>,
    queue: ReentrantMutex<RefCell<DispatchQueue<A>>>,
    max_nested_dispatches: usize,
}

/// Actions dispatched while another dispatch is running on the same thread.
struct DispatchQueue<A> {
    draining: bool,
    pending: VecDeque<A>,
}

impl<S: State, A: Action> Store<S, A> {
    /// Create a store with the default [`StoreConfig`].
    pub fn new<R>(initial: S, reducer: R, middleware: Vec<Box<dyn Middleware<S, A>>>) -> Self
    where
        R: Reducer<S, A>,
    {
        Self::with_config(initial, reducer, middleware, StoreConfig::default())
    }

    pub fn with_config<R>(
        initial: S,
        reducer: R,
        middleware: Vec<Box<dyn Middleware<S, A>>>,
        config: StoreConfig,
    ) -> Self
    where
        R: Reducer<S, A>,
    {
        let initial = Arc::new(initial);
        let (watch, _) = watch::channel(Arc::clone(&initial));

        tracing::debug!(
            store = %config.name,
            middleware = middleware.len(),
            max_nested_dispatches = config.max_nested_dispatches,
            "Store created"
        );

        let inner = Inner {
            name: config.name,
            state: ArcSwap::new(initial),
            watch,
            reducer: Box::new(reducer),
            middleware,
            subscribers: Arc::new(SubscriberRegistry::new()),
            queue: ReentrantMutex::new(RefCell::new(DispatchQueue {
                draining: false,
                pending: VecDeque::new(),
            })),
            max_nested_dispatches: config.max_nested_dispatches,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Run `action` through the middleware chain and the reducer, publish the
    /// resulting state and notify subscribers.
    ///
    /// # Errors
    /// Returns the middleware or reducer error that aborted the dispatch;
    /// state is unchanged in that case. Returns
    /// [`DispatchError::NestedDispatchOverflow`] when subscribers or
    /// middleware queue more follow-ups than the configured limit. That
    /// error arrives after `action` itself has been published.
    pub fn dispatch(&self, action: A) -> Result<(), DispatchError> {
        self.inner.dispatch(action)
    }

    /// Register `callback` to receive every published state.
    ///
    /// Callbacks run synchronously on the dispatching thread, in subscription
    /// order. Dropping the returned [`Subscription`] does not unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<S>
    where
        F: Fn(&Arc<S>) + Send + Sync + 'static,
    {
        let gate = Arc::downgrade(&self.inner) as Weak<dyn DispatchGate>;
        let subscription = self.inner.subscribers.register(
            Box::new(callback),
            self.inner.watch.subscribe(),
            gate,
        );
        tracing::debug!(
            store = %self.inner.name,
            subscriber = subscription.id(),
            "Subscriber registered"
        );
        subscription
    }

    /// Current snapshot. Never blocks.
    pub fn state(&self) -> Arc<S> {
        self.inner.state.load_full()
    }

    /// Receiver that always holds the latest published snapshot.
    ///
    /// For async consumers that await the next change rather than register a
    /// synchronous callback.
    pub fn watch(&self) -> watch::Receiver<Arc<S>> {
        self.inner.watch.subscribe()
    }

    /// Weak handle that can dispatch without keeping the store alive.
    pub fn handle(&self) -> StoreHandle<S, A> {
        StoreHandle::new(&self.inner)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl<S: State, A: Action> Inner<S, A> {
    fn dispatch(self: &Arc<Self>, action: A) -> Result<(), DispatchError> {
        let queue = self.queue.lock();
        {
            let mut q = queue.borrow_mut();
            if q.draining {
                tracing::trace!(store = %self.name, ?action, "Queueing nested dispatch");
                q.pending.push_back(action);
                return Ok(());
            }
            q.draining = true;
        }

        // Reset on every exit path, including a panicking reducer.
        let queue = scopeguard::guard(queue, |queue| {
            let mut q = queue.borrow_mut();
            q.draining = false;
            q.pending.clear();
        });

        let result = self.run(action);

        let mut processed = 0usize;
        loop {
            let next = queue.borrow_mut().pending.pop_front();
            let Some(next) = next else {
                break;
            };

            processed += 1;
            if processed > self.max_nested_dispatches {
                let dropped = queue.borrow().pending.len() + 1;
                tracing::error!(
                    store = %self.name,
                    limit = self.max_nested_dispatches,
                    dropped,
                    "Nested dispatch limit exceeded, aborting"
                );
                return Err(DispatchError::NestedDispatchOverflow {
                    limit: self.max_nested_dispatches,
                });
            }

            if let Err(error) = self.run(next) {
                tracing::warn!(store = %self.name, error = %error, "Nested dispatch failed");
            }
        }

        result
    }

    fn run(self: &Arc<Self>, action: A) -> Result<(), DispatchError> {
        let pipeline = Pipeline::new(
            self.state.load_full(),
            self.reducer.as_ref(),
            StoreHandle::new(self),
        );

        let Some(next_state) = pipeline.run(&self.middleware, action)? else {
            tracing::trace!(store = %self.name, "Action did not reach the reducer");
            return Ok(());
        };

        self.state.store(Arc::clone(&next_state));
        self.watch.send_replace(Arc::clone(&next_state));
        self.subscribers.notify(&next_state);
        Ok(())
    }
}

impl<S: State, A: Action> DispatchGate for Inner<S, A> {
    fn serialize(&self, work: &mut dyn FnMut()) {
        let _queue = self.queue.lock();
        work();
    }
}

/// Weak dispatch capability handed to middleware and async tasks.
///
/// Once every [`Store`] clone has been dropped, dispatching through the
/// handle fails with [`DispatchError::StoreClosed`] and changes nothing.
pub struct StoreHandle<S, A> {
    inner: Weak<Inner<S, A>>,
}

impl<S, A> Clone for StoreHandle<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S, A> StoreHandle<S, A> {
    fn new(inner: &Arc<Inner<S, A>>) -> Self {
        Self {
            inner: Arc::downgrade(inner),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

impl<S: State, A: Action> StoreHandle<S, A> {
    pub fn dispatch(&self, action: A) -> Result<(), DispatchError> {
        match self.inner.upgrade() {
            Some(inner) => inner.dispatch(action),
            None => {
                tracing::debug!(?action, "Store dropped, discarding action");
                Err(DispatchError::StoreClosed)
            }
        }
    }

    /// Current snapshot, or `None` if the store is gone.
    pub fn state(&self) -> Option<Arc<S>> {
        self.inner.upgrade().map(|inner| inner.state.load_full())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::error::ReducerError;
    use crate::store::middleware::{MiddlewareContext, Next};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Counter {
        value: i64,
    }

    impl State for Counter {}

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Add(i64),
        Fail,
    }

    impl Action for Op {}

    fn reduce(state: &Counter, op: Op) -> Result<Counter, ReducerError> {
        match op {
            Op::Add(n) => Ok(Counter {
                value: state.value + n,
            }),
            Op::Fail => Err(ReducerError::Invalid("fail".to_string())),
        }
    }

    fn counter_store(middleware: Vec<Box<dyn Middleware<Counter, Op>>>) -> Store<Counter, Op> {
        Store::new(Counter::default(), reduce, middleware)
    }

    struct Suppress;

    impl Middleware<Counter, Op> for Suppress {
        fn handle(
            &self,
            _ctx: &MiddlewareContext<'_, Counter, Op>,
            _next: &Next<'_, Counter, Op>,
            _action: Op,
        ) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    #[test]
    fn dispatch_replaces_state() {
        let store = counter_store(Vec::new());
        store.dispatch(Op::Add(2)).unwrap();
        store.dispatch(Op::Add(3)).unwrap();
        assert_eq!(store.state().value, 5);
    }

    #[test]
    fn reducer_error_leaves_state_unchanged() {
        let store = counter_store(Vec::new());
        store.dispatch(Op::Add(1)).unwrap();
        let before = store.state();

        let result = store.dispatch(Op::Fail);
        assert!(matches!(result, Err(DispatchError::Reducer(_))));
        assert!(Arc::ptr_eq(&before, &store.state()));
    }

    #[test]
    fn suppressed_action_publishes_nothing() {
        let store = counter_store(vec![Box::new(Suppress)]);
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        let _sub = store.subscribe(move |_| *counter.lock() += 1);

        store.dispatch(Op::Add(1)).unwrap();
        assert_eq!(store.state().value, 0);
        assert_eq!(*seen.lock(), 0);
    }

    #[test]
    fn handle_fails_after_store_dropped() {
        let store = counter_store(Vec::new());
        let handle = store.handle();
        assert!(!handle.is_closed());
        handle.dispatch(Op::Add(1)).unwrap();
        assert_eq!(handle.state().map(|s| s.value), Some(1));

        drop(store);
        assert!(handle.is_closed());
        assert!(matches!(
            handle.dispatch(Op::Add(1)),
            Err(DispatchError::StoreClosed)
        ));
        assert!(handle.state().is_none());
    }

    #[test]
    fn clones_share_state() {
        let store = counter_store(Vec::new());
        let other = store.clone();
        other.dispatch(Op::Add(4)).unwrap();
        assert_eq!(store.state().value, 4);
    }

    #[test]
    fn watch_sees_latest_state() {
        let store = counter_store(Vec::new());
        let rx = store.watch();
        store.dispatch(Op::Add(7)).unwrap();
        assert_eq!(rx.borrow().value, 7);
    }

    #[test]
    fn resume_catch_up_is_ordered_before_concurrent_dispatch() {
        let store = counter_store(Vec::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let workers = Arc::new(Mutex::new(Vec::new()));
        let started = Arc::new(AtomicBool::new(false));

        let sub = {
            let seen = Arc::clone(&seen);
            let workers = Arc::clone(&workers);
            let handle = store.handle();
            store.subscribe(move |state: &Arc<Counter>| {
                // The first delivery is the catch-up: race a dispatch against it.
                if !started.swap(true, Ordering::SeqCst) {
                    let handle = handle.clone();
                    workers.lock().push(thread::spawn(move || {
                        handle.dispatch(Op::Add(1)).unwrap();
                    }));
                    thread::sleep(std::time::Duration::from_millis(20));
                }
                seen.lock().push(state.value);
            })
        };

        sub.pause();
        sub.resume();
        let worker = workers.lock().pop().unwrap();
        worker.join().unwrap();

        assert_eq!(*seen.lock(), vec![0, 1]);
        assert_eq!(seen.lock().last().copied(), Some(store.state().value));
    }

    #[test]
    fn overflow_is_reported_after_outer_action_is_published() {
        let store = Store::with_config(
            Counter::default(),
            reduce,
            Vec::new(),
            StoreConfig {
                max_nested_dispatches: 4,
                ..StoreConfig::default()
            },
        );
        let notified = Arc::new(Mutex::new(0));
        let handle = store.handle();
        let counter = Arc::clone(&notified);
        let _sub = store.subscribe(move |_| {
            *counter.lock() += 1;
            let _ = handle.dispatch(Op::Add(1));
        });

        let result = store.dispatch(Op::Add(1));

        assert!(matches!(
            result,
            Err(DispatchError::NestedDispatchOverflow { limit: 4 })
        ));
        // Outer action plus four follow-ups were applied and delivered.
        assert_eq!(store.state().value, 5);
        assert_eq!(*notified.lock(), 5);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("More than 4 follow-up dispatches"));
    }
}
