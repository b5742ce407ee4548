//! Base trait for actions dispatched to a [`Store`](super::Store).

use std::fmt::Debug;

/// Marker trait for action values.
///
/// Actions represent:
/// - User actions (selection, page changes)
/// - System events (sync results, list refreshes)
///
/// Actions are plain data. They are consumed once by the dispatch pipeline
/// and handed to the reducer to produce the next state.
pub trait Action: Debug + Send + 'static {}
