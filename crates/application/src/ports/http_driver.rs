//! HTTP driver port

use async_trait::async_trait;
use remodel_domain::HttpRequest;
use thiserror::Error;

/// Errors raised by a driver before a response could be handed to the
/// request's callback slots.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// The request cannot be dispatched as built.
    #[error("invalid request parameter: {0}")]
    InvalidParameter(String),

    /// The request URL does not parse.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that was exceeded
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// A driver performs the call described by an [`HttpRequest`] and settles it
/// with [`HttpRequest::resolve`], which fires exactly one callback slot:
/// `200` reaches `on_success`, every other status reaches `on_failure`
/// together with the code. Timeouts, retries and cancellation are the
/// driver's business.
#[async_trait]
pub trait HttpDriver: Send + Sync {
    /// Executes the request and settles its callbacks.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::InvalidParameter` if the request is not
    /// dispatchable (see [`ensure_dispatchable`]), or a transport error when
    /// no response was received. In both cases no callback fires.
    async fn execute(&self, request: HttpRequest) -> Result<(), DriverError>;
}

/// Checks that a request carries everything a driver needs.
///
/// # Errors
///
/// Returns `DriverError::InvalidParameter` for an empty URL or a missing
/// callback slot.
pub fn ensure_dispatchable(request: &HttpRequest) -> Result<(), DriverError> {
    if request.url.trim().is_empty() {
        return Err(DriverError::InvalidParameter("URL is required".to_string()));
    }
    if !request.has_success_callback() || !request.has_failure_callback() {
        return Err(DriverError::InvalidParameter(
            "request has no callback slots".to_string(),
        ));
    }
    Ok(())
}
