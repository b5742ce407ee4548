//! Reducer trait for the store.

use super::error::ReducerError;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Action) -> State.
///
/// Any `Fn(&S, A) -> Result<S, ReducerError>` closure is a reducer, so a
/// store can be built from a plain function as well as from a dedicated type.
pub trait Reducer<S, A>: Send + Sync + 'static {
    /// Process an action and return the new state.
    ///
    /// Returning an error aborts the dispatch: the stored state stays as it
    /// was and no subscriber is notified.
    fn reduce(&self, state: &S, action: A) -> Result<S, ReducerError>;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&S, A) -> Result<S, ReducerError> + Send + Sync + 'static,
{
    fn reduce(&self, state: &S, action: A) -> Result<S, ReducerError> {
        self(state, action)
    }
}
