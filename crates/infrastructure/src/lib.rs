//! Remodel Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading and logging
//! initialisation.

pub mod adapters;
pub mod logging;
pub mod settings;

pub use adapters::{ReqwestDriver, TracingNotifier};
pub use settings::{SettingsError, SettingsLoader, apply_overrides};
