//! A single HTTP call handed to a driver.

use std::fmt;

use serde_json::Value;

use super::{Header, Headers, HttpMethod};
use crate::response::{HttpResponse, StatusCode};

/// Callback slot invoked with the decoded body of a successful response.
pub type SuccessCallback = Box<dyn FnOnce(Value) + Send>;

/// Callback slot invoked with the decoded body and status of a failed response.
pub type FailureCallback = Box<dyn FnOnce(Value, StatusCode) + Send>;

/// How the driver should decode the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    /// Decode the body as JSON.
    #[default]
    Json,
    /// Hand the body over as a JSON string.
    Text,
}

impl DataType {
    /// Returns the `Accept` header value matching this data type.
    #[must_use]
    pub const fn accept(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain",
        }
    }
}

/// Mutable description of one HTTP call.
///
/// The driver executes the call and settles it through [`HttpRequest::resolve`],
/// which consumes the request so that exactly one of the two callback slots
/// can ever fire.
#[derive(Default)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL, query string included
    pub url: String,
    /// Headers in send order
    pub headers: Headers,
    /// Expected response encoding
    pub data_type: DataType,
    /// JSON body for methods that carry one
    pub body: Option<Value>,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl HttpRequest {
    /// Creates a request without body or callbacks.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request with an optional JSON body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            body,
            ..Self::new(HttpMethod::Post, url)
        }
    }

    /// Appends a header. Existing headers with the same name are kept.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Appends every header from `headers`.
    #[must_use]
    pub fn with_headers<'a>(mut self, headers: impl IntoIterator<Item = &'a Header>) -> Self {
        self.headers.extend(headers.into_iter().cloned());
        self
    }

    /// Sets the expected response encoding.
    #[must_use]
    pub const fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Installs the success callback.
    pub fn on_success(&mut self, callback: impl FnOnce(Value) + Send + 'static) {
        self.on_success = Some(Box::new(callback));
    }

    /// Installs the failure callback.
    pub fn on_failure(&mut self, callback: impl FnOnce(Value, StatusCode) + Send + 'static) {
        self.on_failure = Some(Box::new(callback));
    }

    /// Returns true if a success callback is installed.
    #[must_use]
    pub const fn has_success_callback(&self) -> bool {
        self.on_success.is_some()
    }

    /// Returns true if a failure callback is installed.
    #[must_use]
    pub const fn has_failure_callback(&self) -> bool {
        self.on_failure.is_some()
    }

    /// Settles the request with the response the driver received.
    ///
    /// `200` goes to the success slot; every other status goes to the failure
    /// slot together with its code. A missing slot silently drops the outcome.
    pub fn resolve(self, response: HttpResponse) {
        let HttpResponse { status, body } = response;
        if status.is_ok() {
            if let Some(callback) = self.on_success {
                callback(body);
            }
        } else if let Some(callback) = self.on_failure {
            callback(body, status);
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("data_type", &self.data_type)
            .field("body", &self.body)
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Outcome = Arc<Mutex<Vec<String>>>;

    fn tracked(url: &str) -> (HttpRequest, Outcome) {
        let outcome: Outcome = Arc::new(Mutex::new(Vec::new()));
        let mut request = HttpRequest::get(url);
        let ok = Arc::clone(&outcome);
        request.on_success(move |body| ok.lock().unwrap().push(format!("ok {body}")));
        let failed = Arc::clone(&outcome);
        request.on_failure(move |body, status| {
            failed.lock().unwrap().push(format!("err {} {body}", status.as_u16()));
        });
        (request, outcome)
    }

    #[test]
    fn test_resolve_success() {
        let (request, outcome) = tracked("https://api.example.com/users");
        request.resolve(HttpResponse::new(200, json!({"data": []})));
        assert_eq!(*outcome.lock().unwrap(), vec![r#"ok {"data":[]}"#]);
    }

    #[test]
    fn test_resolve_failure_passes_code() {
        for code in [422u16, 500, 403] {
            let (request, outcome) = tracked("https://api.example.com/users");
            request.resolve(HttpResponse::new(code, json!("nope")));
            assert_eq!(*outcome.lock().unwrap(), vec![format!("err {code} \"nope\"")]);
        }
    }

    #[test]
    fn test_headers_keep_duplicates() {
        let request = HttpRequest::get("https://api.example.com")
            .with_header("X-Tag", "a")
            .with_header("X-Tag", "b");
        assert_eq!(request.headers.len(), 2);
    }

    #[test]
    fn test_callback_flags() {
        let mut request = HttpRequest::post("https://api.example.com/store", None);
        assert!(!request.has_success_callback());
        request.on_success(|_| {});
        assert!(request.has_success_callback());
        assert!(!request.has_failure_callback());
    }
}
