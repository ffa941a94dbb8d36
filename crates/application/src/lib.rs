//! Remodel Application - Query builder, models and ports
//!
//! This crate turns the pure query and record state of `remodel-domain` into
//! HTTP calls through the [`ports::HttpDriver`] port:
//!
//! - [`Resource`]: a model type registered against a driver and settings
//! - [`Builder`]: constraints, variables and pagination for one query
//! - [`Model`]: one record with dirty tracking, `save` and `delete_model`
//! - [`ModelCollection`]: keyed result set that can load further pages

pub mod builder;
pub mod collection;
pub mod error;
pub mod model;
mod payload;
pub mod ports;
pub mod resource;

#[cfg(test)]
mod test_support;

pub use builder::Builder;
pub use collection::ModelCollection;
pub use error::{QueryError, QueryResult, QueryResultExt};
pub use model::Model;
pub use resource::Resource;
