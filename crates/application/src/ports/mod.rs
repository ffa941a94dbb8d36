//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the query layer and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod http_driver;
mod notifier;

pub use http_driver::{DriverError, HttpDriver, ensure_dispatchable};
pub use notifier::Notifier;
