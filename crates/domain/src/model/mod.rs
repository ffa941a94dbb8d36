//! Model schema and record state

mod record;
mod schema;

pub use record::{Attributes, RESERVED_ATTRIBUTE, Record};
pub use schema::{Accessor, DEFAULT_DATE_FORMAT, FieldAccess, ModelSchema, Mutator};
