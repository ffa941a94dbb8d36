//! HTTP request types

mod header;
mod http_request;
mod method;

pub use header::{Header, Headers};
pub use http_request::{DataType, FailureCallback, HttpRequest, SuccessCallback};
pub use method::HttpMethod;
