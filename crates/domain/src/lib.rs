//! Remodel Domain - Core data-access types
//!
//! This crate defines the pure data of the Remodel data-access layer: query
//! state and its wire serialization, model schemas and record state, and the
//! HTTP request/response values handed to drivers.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod model;
pub mod query;
pub mod request;
pub mod response;
pub mod settings;

pub use error::{DomainError, DomainResult};
pub use model::{Attributes, ModelSchema, RESERVED_ATTRIBUTE, Record};
pub use query::{Direction, Query, UNLIMITED};
pub use request::{DataType, Header, Headers, HttpMethod, HttpRequest};
pub use response::{HttpResponse, StatusCode};
pub use settings::ClientSettings;
