//! Raw transport response
//!
//! The minimal view of an HTTP response the decoders need: status,
//! headers, body bytes and the moment the response was received.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::StatusCode;
use crate::request::{Header, Headers};

/// HTTP response as delivered by the transport, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: StatusCode,
    status_text: String,
    headers: Headers,
    body: Vec<u8>,
    received_at: DateTime<Utc>,
    duration: Duration,
}

impl RawResponse {
    /// Creates a response; the status text defaults to the canonical reason phrase.
    #[must_use]
    pub fn new(status: impl Into<StatusCode>, body: impl Into<Vec<u8>>, received_at: DateTime<Utc>) -> Self {
        let status = status.into();
        Self {
            status,
            status_text: status.reason_phrase().to_string(),
            headers: Headers::new(),
            body: body.into(),
            received_at,
            duration: Duration::ZERO,
        }
    }

    /// Overrides the status text reported by the server.
    #[must_use]
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Replaces all response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Records how long the exchange took.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status description (e.g., "Not Found").
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns all response headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body as raw bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body as UTF-8 text, replacing invalid sequences.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns when the response was received.
    #[must_use]
    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Returns how long the exchange took.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

/// Renders the full response: status line, headers, blank line, body.
impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HTTP {} {}", self.status.as_u16(), self.status_text)?;
        for header in self.headers.iter() {
            let value = if header.is_sensitive() { "<redacted>" } else { header.value.as_str() };
            writeln!(f, "{}: {}", header.name, value)?;
        }
        writeln!(f)?;
        f.write_str(&self.body_text())
    }
}
