//! HTTP client implementation using reqwest.
//!
//! Implements the `HttpClient` port. Any status code the server answers with
//! is a response; only failures to complete the exchange become errors.

use std::error::Error as _;
use std::time::Instant;

use chrono::Utc;
use lumen_application::ports::{HttpClient, HttpClientError, HttpFuture};
use lumen_domain::{ClientSettings, Header, Headers, HttpMethod, RawResponse, RequestSpec};
use reqwest::{Client, Method};
use tracing::trace;

/// Redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// `HttpClient` backed by a shared `reqwest::Client`.
///
/// The inner client pools connections, so one instance should serve every
/// call a `ModelsClient` makes.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Builds a client with the configured user agent and a redirect limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps an already configured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
        }
    }

    /// Classifies a reqwest failure.
    ///
    /// reqwest only exposes coarse predicates, so the finer cases are read off
    /// the rendered source chain.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }
        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }
        if error.is_builder() {
            return HttpClientError::InvalidUrl(error_chain(error));
        }
        if error.is_body() || error.is_decode() {
            return HttpClientError::Body(error.to_string());
        }

        let chain = error_chain(error);
        let lowered = chain.to_lowercase();
        let host = error
            .url()
            .and_then(|u| u.host_str())
            .unwrap_or("unknown")
            .to_string();

        if error.is_connect() {
            if lowered.contains("dns") || lowered.contains("resolve") {
                return HttpClientError::DnsError { host, message: chain };
            }
            if lowered.contains("refused") {
                let port = error
                    .url()
                    .and_then(reqwest::Url::port_or_known_default)
                    .unwrap_or(80);
                return HttpClientError::ConnectionRefused { host, port };
            }
            if lowered.contains("certificate") || lowered.contains("tls") {
                return HttpClientError::Tls(chain);
            }
            return HttpClientError::ConnectionFailed(chain);
        }

        HttpClientError::Other(chain)
    }

    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .map(|(name, value)| Header::new(name.as_str(), value.to_str().unwrap_or("<binary>")))
            .collect()
    }
}

/// The error's message followed by each source, joined with `": "`.
fn error_chain(error: &reqwest::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: &RequestSpec) -> HttpFuture<'_> {
        let method = Self::to_reqwest_method(request.method);
        let url = request.url.clone();
        let headers = request.headers.clone();
        let timeout = request.timeout;
        let timeout_ms = request.timeout_ms();

        Box::pin(async move {
            let start = Instant::now();

            let mut builder = self.client.request(method, url).timeout(timeout);
            for header in headers.iter() {
                builder = builder.header(&header.name, &header.value);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status();
            let status_text = status.canonical_reason().unwrap_or_default();
            let response_headers = Self::convert_headers(response.headers());

            let body = response
                .bytes()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;
            let received_at = Utc::now();
            let duration = start.elapsed();

            trace!(status = status.as_u16(), bytes = body.len(), ?duration, "response received");

            Ok(RawResponse::new(status.as_u16(), body.to_vec(), received_at)
                .with_status_text(status_text)
                .with_headers(response_headers)
                .with_duration(duration))
        })
    }
}
