//! Adapter implementations for application ports

mod reqwest_driver;
mod tracing_notifier;

pub use reqwest_driver::ReqwestDriver;
pub use tracing_notifier::TracingNotifier;
