//! Middleware chain for the dispatch pipeline.
//!
//! Middleware wraps dispatch like layers of an onion: the first registered
//! middleware sees the raw action first and finishes last.
//!
//! ```text
//! dispatch(a) ──→ A.pre ──→ B.pre ──→ reducer
//!                                       │
//!       A.post ←── B.post ←─────────────┘
//! ```

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Instant;

use super::action::Action;
use super::engine::StoreHandle;
use super::error::DispatchError;
use super::reducer::Reducer;
use super::state::State;

/// A link in the dispatch chain.
///
/// A middleware may:
/// - pass the action unchanged to `next`
/// - transform it, or call `next` with a different action
/// - skip `next` entirely, which keeps the action from reaching the reducer
/// - call `next` more than once
///
/// Blocking work must not happen here. Spawn it and dispatch a follow-up
/// action through [`MiddlewareContext::store`] once it completes.
pub trait Middleware<S, A>: Send + Sync + 'static {
    /// Name used in logs and in [`DispatchError::Middleware`].
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn handle(
        &self,
        ctx: &MiddlewareContext<'_, S, A>,
        next: &Next<'_, S, A>,
        action: A,
    ) -> Result<(), DispatchError>;
}

/// Bookkeeping for a single pipeline run.
///
/// Reductions land in `pending` and are only published by the store once the
/// whole chain returned `Ok`.
pub(crate) struct Pipeline<'a, S, A> {
    current: Arc<S>,
    pending: RefCell<Option<Arc<S>>>,
    reducer: &'a dyn Reducer<S, A>,
    handle: StoreHandle<S, A>,
}

impl<'a, S: 'static, A: 'static> Pipeline<'a, S, A> {
    pub(crate) fn new(
        current: Arc<S>,
        reducer: &'a dyn Reducer<S, A>,
        handle: StoreHandle<S, A>,
    ) -> Self {
        Self {
            current,
            pending: RefCell::new(None),
            reducer,
            handle,
        }
    }

    /// Run `action` through `chain` and return the state to publish, if the
    /// reducer ran at least once.
    pub(crate) fn run(
        &self,
        chain: &[Box<dyn Middleware<S, A>>],
        action: A,
    ) -> Result<Option<Arc<S>>, DispatchError> {
        let next = Next {
            pipeline: self,
            rest: chain,
        };
        next.call(action)?;
        Ok(self.pending.borrow_mut().take())
    }

    fn state(&self) -> Arc<S> {
        match self.pending.borrow().as_ref() {
            Some(pending) => Arc::clone(pending),
            None => Arc::clone(&self.current),
        }
    }

    fn reduce(&self, action: A) -> Result<(), DispatchError> {
        let base = self.state();
        let reduced = self.reducer.reduce(&base, action)?;
        *self.pending.borrow_mut() = Some(Arc::new(reduced));
        Ok(())
    }
}

/// Read access to the store from inside a middleware.
pub struct MiddlewareContext<'a, S, A> {
    pipeline: &'a Pipeline<'a, S, A>,
}

impl<S: 'static, A: 'static> MiddlewareContext<'_, S, A> {
    /// Current state as seen by this link.
    ///
    /// Before `next` returns this is the state the dispatch started from;
    /// afterwards it includes whatever the inner links reduced.
    pub fn state(&self) -> Arc<S> {
        self.pipeline.state()
    }

    /// Weak handle for scheduling follow-up dispatches.
    ///
    /// Dispatching through it while the chain is still running queues the
    /// action until the current dispatch has been published.
    pub fn store(&self) -> StoreHandle<S, A> {
        self.pipeline.handle.clone()
    }
}

/// Continuation to the rest of the chain; the innermost link is the reducer.
pub struct Next<'a, S, A> {
    pipeline: &'a Pipeline<'a, S, A>,
    rest: &'a [Box<dyn Middleware<S, A>>],
}

impl<S: 'static, A: 'static> Next<'_, S, A> {
    pub fn call(&self, action: A) -> Result<(), DispatchError> {
        match self.rest.split_first() {
            Some((head, rest)) => {
                let ctx = MiddlewareContext {
                    pipeline: self.pipeline,
                };
                let next = Next {
                    pipeline: self.pipeline,
                    rest,
                };
                head.handle(&ctx, &next, action)
            }
            None => self.pipeline.reduce(action),
        }
    }
}

/// Logs every action passing through the chain.
///
/// Emits a `debug` event with the action, whether the state changed and how
/// long the inner chain took; failures are logged at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl<S: State, A: Action> Middleware<S, A> for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn handle(
        &self,
        ctx: &MiddlewareContext<'_, S, A>,
        next: &Next<'_, S, A>,
        action: A,
    ) -> Result<(), DispatchError> {
        let label = format!("{:?}", action);
        let before = ctx.state();
        let started = Instant::now();

        let result = next.call(action);

        let elapsed_us = started.elapsed().as_micros() as u64;
        match &result {
            Ok(()) => {
                let after = ctx.state();
                let changed = !Arc::ptr_eq(&before, &after) && *before != *after;
                tracing::debug!(action = %label, changed, elapsed_us, "Action dispatched");
            }
            Err(error) => {
                tracing::warn!(action = %label, error = %error, elapsed_us, "Action failed");
            }
        }
        result
    }
}
