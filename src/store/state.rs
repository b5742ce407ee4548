//! Base trait for state snapshots held by a [`Store`](super::Store).

/// Marker trait for state snapshots.
///
/// States should be:
/// - Immutable (a reduction produces a new value, the old one is never touched)
/// - Self-contained (everything an observer needs at one instant)
/// - Comparable (PartialEq for detecting changes)
///
/// Snapshots are shared with observers behind an `Arc`, so they must be
/// `Send + Sync`.
pub trait State: Clone + PartialEq + Send + Sync + 'static {}
