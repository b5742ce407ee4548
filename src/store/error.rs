//! Error types for the dispatch pipeline.

use thiserror::Error;

/// Errors a reducer may report for an action it cannot apply.
///
/// Reducers normally treat bad payloads as no-ops. These variants exist for
/// actions whose contract requires the referenced entity to exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReducerError {
    #[error("{action} references unknown {entity} '{id}'")]
    MissingEntity {
        action: &'static str,
        entity: &'static str,
        id: String,
    },

    #[error("Invalid action: {0}")]
    Invalid(String),
}

/// Errors returned from [`Store::dispatch`](super::Store::dispatch).
///
/// `Reducer` and `Middleware` failures leave the stored state unchanged and
/// notify nobody. `NestedDispatchOverflow` is different: see its docs.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Reducer rejected action: {0}")]
    Reducer(#[from] ReducerError),

    #[error("Middleware '{middleware}' failed: {source}")]
    Middleware {
        middleware: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// More than `limit` follow-up dispatches were queued while one outer
    /// dispatch was draining. The limit counts follow-ups in total, not
    /// recursion depth.
    ///
    /// The outer action and the first `limit` follow-ups were already
    /// published and notified; only the rest of the queue was discarded.
    /// Retrying the outer action applies it again.
    #[error("More than {limit} follow-up dispatches queued by one dispatch; remaining queue discarded")]
    NestedDispatchOverflow { limit: usize },

    #[error("Store has been dropped")]
    StoreClosed,
}

impl DispatchError {
    /// Wrap an arbitrary error raised inside a middleware.
    pub fn middleware<E>(middleware: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        DispatchError::Middleware {
            middleware,
            source: source.into(),
        }
    }
}
