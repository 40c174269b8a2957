//! Request specification type

use std::time::Duration;

use url::Url;

use super::{Header, Headers, HttpMethod};

/// Everything the transport needs to issue one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL
    pub url: Url,
    /// HTTP headers
    pub headers: Headers,
    /// Upper bound for the whole exchange
    pub timeout: Duration,
}

impl RequestSpec {
    /// Creates a GET request with no headers.
    #[must_use]
    pub const fn get(url: Url, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Headers::new(),
            timeout,
        }
    }

    /// Adds a header, builder style.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Timeout in whole milliseconds, saturating.
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
