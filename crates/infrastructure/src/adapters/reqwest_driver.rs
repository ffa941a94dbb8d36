//! HTTP driver implementation using reqwest.
//!
//! This adapter implements the `HttpDriver` port using the reqwest library.
//! It performs the call, decodes the body and settles the request's
//! callback slots with the status it received.

use std::time::Duration;

use async_trait::async_trait;
use remodel_application::ports::{DriverError, HttpDriver, ensure_dispatchable};
use remodel_domain::{ClientSettings, DataType, HttpMethod, HttpRequest, HttpResponse};
use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;

/// HTTP driver backed by `reqwest::Client`.
pub struct ReqwestDriver {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestDriver {
    /// Creates a driver configured from the client settings.
    ///
    /// Configuration taken from the settings:
    /// - per-request timeout
    /// - User-Agent
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(settings: &ClientSettings) -> Result<Self, DriverError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| DriverError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: settings.timeout_ms,
        })
    }

    /// Creates a driver around a preconfigured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    /// Decodes a response body.
    ///
    /// An empty body decodes to `Null`. A JSON body that does not parse is
    /// handed over as a string so error pages still reach the failure slot.
    fn decode(data_type: DataType, bytes: &[u8]) -> Value {
        if bytes.is_empty() {
            return Value::Null;
        }
        let text = || Value::String(String::from_utf8_lossy(bytes).into_owned());
        match data_type {
            DataType::Json => serde_json::from_slice(bytes).unwrap_or_else(|_| text()),
            DataType::Text => text(),
        }
    }

    /// Maps reqwest errors to `DriverError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> DriverError {
        if error.is_timeout() {
            return DriverError::Timeout { timeout_ms };
        }
        if error.is_connect() {
            return DriverError::ConnectionFailed(error.to_string());
        }
        if error.is_decode() || error.is_body() {
            return DriverError::Decode(error.to_string());
        }
        DriverError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpDriver for ReqwestDriver {
    async fn execute(&self, mut request: HttpRequest) -> Result<(), DriverError> {
        ensure_dispatchable(&request)?;

        let url = Url::parse(&request.url)
            .map_err(|e| DriverError::InvalidUrl(format!("{e}: {}", request.url)))?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);

        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }

        if let Some(body) = request.body.take() {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        tracing::debug!(status, url = %request.url, "response received");

        let body = Self::decode(request.data_type, &bytes);
        request.resolve(HttpResponse::new(status, body));
        Ok(())
    }
}
