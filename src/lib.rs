//! Unidirectional state container with ordered middleware, plus the tabs
//! tray store built on it.

pub mod config;
pub mod logging;
pub mod store;
pub mod tray;
