//! Client Settings
//!
//! Connection-wide configuration shared by every resource.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};
use crate::query::DEFAULT_LIMIT;
use crate::request::Headers;

/// Settings for talking to one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// API root every resource path is joined to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page size seeded into new queries.
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    /// Per-request timeout applied by the driver.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Headers sent with every request, in order.
    #[serde(default)]
    pub headers: Headers,

    /// User-Agent sent by the driver.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

const fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("remodel/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_limit: default_limit(),
            timeout_ms: default_timeout_ms(),
            headers: Headers::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientSettings {
    /// Creates default settings for the given API root.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins a resource path onto the base URL. Absolute URLs are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the result does not parse.
    pub fn resource_url(&self, path: &str) -> DomainResult<String> {
        let joined = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.is_empty() {
            self.base_url.trim_end_matches('/').to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };
        Url::parse(&joined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {joined}")))?;
        Ok(joined)
    }
}
