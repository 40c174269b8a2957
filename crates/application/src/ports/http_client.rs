//! HTTP Client port

use std::future::Future;
use std::pin::Pin;

use lumen_domain::{RawResponse, RequestSpec};
use thiserror::Error;

/// Future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<RawResponse, HttpClientError>> + Send + 'a>>;

/// Transport-level failures. None of these reach callers as errors; the
/// client turns each into a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpClientError {
    /// The URL could not be used.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// No response within the configured timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The host name did not resolve.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The TLS handshake failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
/// Implementations must be safe to share between concurrent calls.
pub trait HttpClient: Send + Sync {
    /// Executes a request and returns the raw response.
    ///
    /// Any status code counts as a response; only transport failures are errors.
    fn execute(&self, request: &RequestSpec) -> HttpFuture<'_>;
}
