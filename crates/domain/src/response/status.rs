//! Response status and payload types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP status code with helpers for the codes the backend contract names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// `200 OK`, the only success status of the contract.
    pub const OK: Self = Self(200);
    /// `403 Forbidden`, returned when a delete is not permitted.
    pub const FORBIDDEN: Self = Self(403);
    /// `422 Unprocessable Entity`, returned for validation failures.
    pub const UNPROCESSABLE_ENTITY: Self = Self(422);
    /// `500 Internal Server Error`.
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Creates a new `StatusCode`.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns true for `200`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.0 == 200
    }

    /// Returns true for `422`.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        self.0 == 422
    }

    /// Returns true for `403`.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        self.0 == 403
    }

    /// Returns true if this is a 5xx server error status.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Returns the canonical reason phrase for common status codes.
    #[must_use]
    pub const fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Status and decoded body of a completed HTTP call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// Response status
    pub status: StatusCode,
    /// Decoded body; `Null` for an empty body
    pub body: Value,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: impl Into<StatusCode>, body: Value) -> Self {
        Self {
            status: status.into(),
            body,
        }
    }
}
