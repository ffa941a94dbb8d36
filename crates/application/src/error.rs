//! Application error types

use remodel_domain::{DomainError, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::ports::{DriverError, Notifier};

/// Errors produced while building or executing a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A query or model operation was rejected before any request was sent.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The driver could not deliver the request.
    #[error("HTTP driver error: {0}")]
    Driver(#[from] DriverError),

    /// The backend answered with a non-success status.
    #[error("request rejected with {status}")]
    Rejected {
        /// Response status
        status: StatusCode,
        /// Decoded response body, e.g. field-level validation detail
        response: Value,
    },

    /// Next-page loading was requested on a collection without a builder.
    #[error("collection has no query builder to load more pages from")]
    MissingQueryBuilder,

    /// Next-page loading was requested on an unlimited query.
    #[error("pagination is disabled for queries without a limit")]
    PaginationDisabled,

    /// The driver returned without settling the request.
    #[error("the driver finished without a response")]
    NoResponse,

    /// The response body does not have the expected shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl QueryError {
    /// Returns the response status for rejected requests.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body for rejected requests.
    #[must_use]
    pub const fn response(&self) -> Option<&Value> {
        match self {
            Self::Rejected { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns true for a `422` validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.status().is_some_and(|s| s.is_validation_error())
    }

    /// Returns true for a `403` permission failure.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status().is_some_and(|s| s.is_forbidden())
    }

    /// Returns true for a 5xx failure.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }

    /// Message suitable for showing to an end user.
    ///
    /// A `message` string in a rejected response body takes precedence.
    #[must_use]
    pub fn user_message(&self) -> String {
        if let Some(message) = self
            .response()
            .and_then(|r| r.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
        match self.status().map(|s| s.as_u16()) {
            Some(422) => "The submitted data is invalid.".to_string(),
            Some(403) => "You are not allowed to perform this action.".to_string(),
            Some(500) => "The server encountered an error.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Default error handling for callers without a handler of their own.
pub trait QueryResultExt<T> {
    /// Returns the value, or hands the error to `notifier` and returns `None`.
    fn or_notify(self, notifier: &dyn Notifier) -> Option<T>;
}

impl<T> QueryResultExt<T> for QueryResult<T> {
    fn or_notify(self, notifier: &dyn Notifier) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                notifier.notify(&error.user_message());
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl Notifier for Collect {
        fn notify(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    fn rejected(code: u16, response: Value) -> QueryError {
        QueryError::Rejected {
            status: StatusCode::new(code),
            response,
        }
    }

    #[test]
    fn test_status_helpers() {
        assert!(rejected(422, Value::Null).is_validation());
        assert!(rejected(403, Value::Null).is_forbidden());
        assert!(rejected(500, Value::Null).is_server_error());
        assert!(!QueryError::NoResponse.is_validation());
        assert_eq!(QueryError::NoResponse.status(), None);
    }

    #[test]
    fn test_user_message_prefers_response() {
        let error = rejected(422, json!({"message": "Name is required"}));
        assert_eq!(error.user_message(), "Name is required");
        assert_eq!(
            rejected(403, Value::Null).user_message(),
            "You are not allowed to perform this action."
        );
    }

    #[test]
    fn test_or_notify() {
        let notifier = Collect::default();

        let ok: QueryResult<u8> = Ok(1);
        assert_eq!(ok.or_notify(&notifier), Some(1));

        let failed: QueryResult<u8> = Err(rejected(500, Value::Null));
        assert_eq!(failed.or_notify(&notifier), None);

        assert_eq!(
            *notifier.0.lock().unwrap(),
            vec!["The server encountered an error.".to_string()]
        );
    }
}
