//! Unidirectional state container.
//!
//! This module provides the building blocks for a store with a single,
//! explicit mutation path.
//!
//! # Architecture
//!
//! ```text
//! dispatch(Action) ──→ Middleware chain ──→ Reducer ──→ State ──→ Subscribers
//!        ↑                    │                                     │
//!        └── StoreHandle ─────┘ (async follow-ups)                  │
//!        └──────────────────────────────────────────────────────────┘
//! ```
//!
//! - **State**: Immutable snapshot of everything observable
//! - **Action**: Plain data describing an intended change
//! - **Reducer**: Pure function that computes the next state
//! - **Middleware**: Cross-cutting logic wrapped around the reducer
//! - **Store**: Owns the above and serializes dispatches

mod action;
mod engine;
mod error;
mod middleware;
mod reducer;
mod state;
mod subscription;

pub use action::Action;
pub use engine::{Store, StoreHandle};
pub use error::{DispatchError, ReducerError};
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareContext, Next};
pub use reducer::Reducer;
pub use state::State;
pub use subscription::Subscription;
