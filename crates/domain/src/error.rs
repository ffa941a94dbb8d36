//! Domain error types

use thiserror::Error;

/// Domain-level errors raised synchronously while building queries or
/// manipulating model state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A query variable with this name has already been appended.
    #[error("duplicate query variable: {0}")]
    DuplicateVariable(String),

    /// The query variable was never appended, so it cannot be updated.
    #[error("unknown query variable: {0}")]
    UnknownVariable(String),

    /// The attribute name is reserved and cannot hold model data.
    #[error("invalid attribute name: {0}")]
    InvalidAttribute(String),

    /// A date attribute holds a value that cannot be parsed.
    #[error("invalid date in attribute {attribute}: {value}")]
    InvalidDate {
        /// The attribute that was read.
        attribute: String,
        /// The raw stored value.
        value: String,
    },

    /// The attribute is not declared as a date on the model schema.
    #[error("attribute is not a date: {0}")]
    NotADateAttribute(String),

    /// A reserved numeric variable (`limit`, `page`) holds a value that is
    /// not an integer.
    #[error("variable {name} must be an integer, got {value}")]
    InvalidNumber {
        /// The variable name.
        name: String,
        /// The rejected value as it would appear on the wire.
        value: String,
    },

    /// A sort direction other than `asc` or `desc`.
    #[error("invalid sort direction: {0}")]
    InvalidDirection(String),

    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
