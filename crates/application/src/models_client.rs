//! Models client
//!
//! The two remote operations of the API: list every model, or retrieve one
//! by id. Each call issues one HTTP request through the [`HttpClient`] port
//! and resolves to an [`Envelope`]. Configuration problems, transport
//! faults, timeouts and cancellation all come back as failure envelopes;
//! the operations never return `Err`.

use std::sync::Arc;
use std::time::Duration;

use lumen_domain::{
    ClientSettings, Envelope, Model, ModelId, RawResponse, RequestContext, RequestSpec,
    generate_correlation_id,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{Clock, HttpClient, HttpClientError};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Overrides the client-wide timeout for this call.
    pub timeout: Option<Duration>,
    /// Aborts the call when cancelled.
    pub cancellation: Option<CancellationToken>,
    /// Correlation id to use when the server sends none. A fresh one is
    /// generated when unset.
    pub correlation_id: Option<Uuid>,
}

impl CallOptions {
    /// Sets the timeout for this call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Sets the fallback correlation id.
    #[must_use]
    pub const fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// Client for the `/models` endpoints.
///
/// Calls share no mutable state, so one client can serve many concurrent
/// operations.
///
/// # Example
///
/// ```ignore
/// let http = Arc::new(ReqwestHttpClient::from_settings(&settings)?);
/// let client = ModelsClient::new(http, SystemClock::new(), settings);
///
/// let envelope = client.list_models(&CallOptions::default()).await;
/// for model in envelope.items() {
///     println!("{}", model.id());
/// }
/// ```
pub struct ModelsClient<C, K> {
    http: Arc<C>,
    clock: K,
    settings: ClientSettings,
}

impl<C: HttpClient, K: Clock> ModelsClient<C, K> {
    /// Creates a client over the given transport and clock.
    pub const fn new(http: Arc<C>, clock: K, settings: ClientSettings) -> Self {
        Self {
            http,
            clock,
            settings,
        }
    }

    /// Returns the settings this client was built with.
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Lists all models (`GET {base}/models`).
    ///
    /// Items that fail to parse are skipped; their errors end up in the
    /// envelope's diagnostic.
    pub async fn list_models(&self, options: &CallOptions) -> Envelope<Vec<Model>> {
        self.call(&["models"], options, |raw, fallback| {
            Envelope::decode_array(raw, fallback, Model::parse)
        })
        .await
    }

    /// Retrieves one model (`GET {base}/models/{id}`).
    pub async fn get_model(&self, id: &ModelId, options: &CallOptions) -> Envelope<Model> {
        self.call(&["models", id.as_str()], options, |raw, fallback| {
            Envelope::decode_object(raw, fallback, Model::parse)
        })
        .await
    }

    async fn call<T>(
        &self,
        path: &[&str],
        options: &CallOptions,
        decode: impl FnOnce(RawResponse, Uuid) -> Envelope<T>,
    ) -> Envelope<T> {
        let correlation_id = options.correlation_id.unwrap_or_else(generate_correlation_id);

        let url = match self.settings.endpoint(path) {
            Ok(url) => url,
            Err(error) => return self.not_sent(&ApplicationError::from(error), correlation_id),
        };
        let timeout = options.timeout.unwrap_or_else(|| self.settings.timeout());
        let request = RequestSpec::get(url, timeout);
        let context = RequestContext::for_request(&request, correlation_id, self.clock.now());

        let request = match self.authorize(request) {
            Ok(request) => request,
            Err(error) => return self.not_sent(&error, correlation_id).with_context(context),
        };

        debug!(
            method = %request.method,
            url = %request.url,
            %correlation_id,
            "sending request"
        );

        let envelope = match self.send(&request, options.cancellation.as_ref()).await {
            Ok(raw) => {
                let status = raw.status();
                let envelope = decode(raw, correlation_id);
                if envelope.is_failure() {
                    warn!(%correlation_id, %status, message = envelope.message(), "call failed");
                } else if let Some(diagnostic) = envelope.diagnostic() {
                    debug!(
                        %correlation_id,
                        failures = diagnostic.lines().count(),
                        "skipped items that failed to parse"
                    );
                }
                envelope
            }
            Err(error) => {
                warn!(%correlation_id, %error, "transport failure");
                Envelope::exception(&error)
                    .with_timestamp(self.clock.now())
                    .with_correlation_id(correlation_id)
            }
        };

        envelope.with_context(context)
    }

    /// Adds the credential and content headers.
    fn authorize(&self, request: RequestSpec) -> ApplicationResult<RequestSpec> {
        let api_key = self
            .settings
            .api_key
            .as_ref()
            .ok_or(ApplicationError::MissingApiKey)?;

        let mut request = request
            .with_header("Accept", "application/json")
            .with_header("Authorization", format!("Bearer {api_key}"));
        if let Some(organization) = &self.settings.organization {
            request = request.with_header("OpenAI-Organization", organization.as_str());
        }
        Ok(request)
    }

    fn not_sent<T>(&self, error: &ApplicationError, correlation_id: Uuid) -> Envelope<T> {
        warn!(%correlation_id, %error, "request not sent");
        Envelope::exception(error)
            .with_timestamp(self.clock.now())
            .with_correlation_id(correlation_id)
    }

    /// Runs the exchange under the call's timeout, racing the cancellation token.
    async fn send(
        &self,
        request: &RequestSpec,
        cancellation: Option<&CancellationToken>,
    ) -> Result<RawResponse, HttpClientError> {
        let timeout_ms = request.timeout_ms();
        let exchange = async {
            match tokio::time::timeout(request.timeout, self.http.execute(request)).await {
                Ok(result) => result,
                Err(_) => Err(HttpClientError::Timeout { timeout_ms }),
            }
        };

        match cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(HttpClientError::Cancelled),
                    result = exchange => result,
                }
            }
            None => exchange.await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ports::HttpFuture;
    use chrono::{DateTime, TimeZone, Utc};
    use lumen_domain::{ApiKey, OrganizationId, StatusCode};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    const CURIE: &str = r#"{"id":"text-curie:001","object":"model","created":1641955047,"owned_by":"system","root":"text-curie:001","parent":null}"#;

    /// Mock HTTP client for testing.
    struct MockHttpClient {
        response: Result<RawResponse, HttpClientError>,
        delay: Duration,
        requests: Mutex<Vec<RequestSpec>>,
    }

    impl MockHttpClient {
        fn respond(status: u16, body: &str) -> Self {
            Self {
                response: Ok(RawResponse::new(status, body, fixed_now())),
                delay: Duration::ZERO,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn error(err: HttpClientError) -> Self {
            Self {
                response: Err(err),
                delay: Duration::ZERO,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn requests(&self) -> Vec<RequestSpec> {
            self.requests.lock().expect("Lock poisoned").clone()
        }
    }

    impl HttpClient for MockHttpClient {
        fn execute(&self, request: &RequestSpec) -> HttpFuture<'_> {
            self.requests
                .lock()
                .expect("Lock poisoned")
                .push(request.clone());
            let result = self.response.clone();
            let delay = self.delay;
            Box::pin(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            })
        }
    }

    /// Routes on the last path segment so concurrent calls get distinct bodies.
    struct EchoModelClient;

    impl HttpClient for EchoModelClient {
        fn execute(&self, request: &RequestSpec) -> HttpFuture<'_> {
            let id = request
                .url
                .path_segments()
                .and_then(Iterator::last)
                .unwrap_or_default()
                .to_string();
            Box::pin(async move {
                let body = format!(
                    r#"{{"id":"{id}","object":"model","created":1,"owned_by":"openai"}}"#
                );
                Ok(RawResponse::new(200u16, body, fixed_now()))
            })
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            fixed_now()
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn settings() -> ClientSettings {
        ClientSettings {
            base_url: "https://api.example.com/v1".to_string(),
            api_key: ApiKey::try_parse("sk-test"),
            organization: OrganizationId::try_parse("org-42"),
            ..ClientSettings::default()
        }
    }

    fn client<C: HttpClient>(http: C) -> (Arc<C>, ModelsClient<C, FixedClock>) {
        let http = Arc::new(http);
        (
            Arc::clone(&http),
            ModelsClient::new(http, FixedClock, settings()),
        )
    }

    #[tokio::test]
    async fn test_list_models_success() {
        let body = format!(r#"{{"object":"list","data":[{CURIE},{{"id":"davinci"}}]}}"#);
        let (http, client) = client(MockHttpClient::respond(200, &body));
        let correlation_id = Uuid::from_u128(1);

        let envelope = client
            .list_models(&CallOptions::default().with_correlation_id(correlation_id))
            .await;

        assert!(envelope.is_success());
        assert_eq!(envelope.items().len(), 1);
        assert_eq!(
            envelope.diagnostic(),
            Some("Object type invalid or missing")
        );
        assert_eq!(envelope.correlation_id(), Some(correlation_id));

        let context = envelope.context().expect("context attached");
        assert_eq!(context.url.as_str(), "https://api.example.com/v1/models");
        assert_eq!(context.correlation_id, correlation_id);
        assert_eq!(context.sent_at, fixed_now());

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].headers.get("Authorization"), Some("Bearer sk-test"));
        assert_eq!(requests[0].headers.get("OpenAI-Organization"), Some("org-42"));
        assert_eq!(requests[0].headers.get("Accept"), Some("application/json"));
        assert_eq!(requests[0].timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_get_model_builds_url_from_id() {
        let (http, client) = client(MockHttpClient::respond(200, CURIE));
        let id = ModelId::parse("text-curie:001").unwrap();

        let envelope = client.get_model(&id, &CallOptions::default()).await;

        assert!(envelope.is_success());
        assert_eq!(envelope.payload().map(Model::id), Some(&id));
        assert_eq!(
            http.requests()[0].url.as_str(),
            "https://api.example.com/v1/models/text-curie:001"
        );
    }

    #[tokio::test]
    async fn test_get_model_not_found() {
        let body = r#"{"error":{"message":"no such model"}}"#;
        let (_, client) = client(MockHttpClient::respond(404, body));
        let id = ModelId::parse("missing").unwrap();

        let envelope = client.get_model(&id, &CallOptions::default()).await;

        assert!(envelope.is_failure());
        assert_eq!(envelope.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(envelope.diagnostic(), Some(body));
        assert!(envelope.context().is_some());
    }

    #[tokio::test]
    async fn test_missing_api_key_sends_nothing() {
        let http = Arc::new(MockHttpClient::respond(200, CURIE));
        let client = ModelsClient::new(
            Arc::clone(&http),
            FixedClock,
            ClientSettings::default(),
        );

        let envelope = client.list_models(&CallOptions::default()).await;

        assert!(envelope.is_failure());
        assert_eq!(envelope.message(), "no API key configured");
        assert_eq!(envelope.timestamp(), fixed_now());
        assert!(envelope.correlation_id().is_some());
        let context = envelope.context().unwrap();
        assert_eq!(context.url.as_str(), "https://api.openai.com/v1/models");
        assert_eq!(context.correlation_id, envelope.correlation_id().unwrap());
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_bad_base_url_is_a_failure_envelope() {
        let http = Arc::new(MockHttpClient::respond(200, CURIE));
        let client = ModelsClient::new(
            Arc::clone(&http),
            FixedClock,
            ClientSettings {
                base_url: "nowhere".to_string(),
                ..settings()
            },
        );

        let envelope = client.list_models(&CallOptions::default()).await;

        assert!(envelope.is_failure());
        assert!(envelope.message().starts_with("domain error: invalid URL"));
        assert!(envelope.context().is_none());
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_becomes_exception_envelope() {
        let (_, client) = client(MockHttpClient::error(HttpClientError::ConnectionRefused {
            host: "api.example.com".to_string(),
            port: 443,
        }));
        let correlation_id = Uuid::from_u128(9);

        let envelope = client
            .list_models(&CallOptions::default().with_correlation_id(correlation_id))
            .await;

        assert!(envelope.is_failure());
        assert!(envelope.items().is_empty());
        assert_eq!(envelope.message(), "connection refused by api.example.com:443");
        assert!(envelope.diagnostic().unwrap().contains("ConnectionRefused"));
        assert_eq!(envelope.timestamp(), fixed_now());
        assert_eq!(envelope.correlation_id(), Some(correlation_id));
        assert!(envelope.raw_response().is_none());
        assert!(envelope.context().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves_to_failure() {
        let (_, client) =
            client(MockHttpClient::respond(200, CURIE).delayed(Duration::from_secs(10)));

        let envelope = client
            .list_models(&CallOptions::default().with_timeout(Duration::from_millis(250)))
            .await;

        assert!(envelope.is_failure());
        assert_eq!(envelope.message(), "request timed out after 250 ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_call_timeout_falls_back_to_settings() {
        let (http, client) = client(MockHttpClient::respond(200, CURIE));
        let id = ModelId::parse("ada").unwrap();

        client.get_model(&id, &CallOptions::default()).await;
        client
            .get_model(&id, &CallOptions::default().with_timeout(Duration::from_secs(2)))
            .await;

        let timeouts: Vec<Duration> = http.requests().iter().map(|r| r.timeout).collect();
        assert_eq!(timeouts, vec![Duration::from_secs(30), Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (_, client) = client(MockHttpClient::respond(200, CURIE));
        let token = CancellationToken::new();
        token.cancel();

        let envelope = client
            .list_models(&CallOptions::default().with_cancellation(token))
            .await;

        assert!(envelope.is_failure());
        assert_eq!(envelope.message(), "request cancelled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_while_in_flight() {
        let (_, client) =
            client(MockHttpClient::respond(200, CURIE).delayed(Duration::from_secs(5)));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let envelope = client
            .list_models(&CallOptions::default().with_cancellation(token))
            .await;

        assert!(envelope.is_failure());
        assert_eq!(envelope.message(), "request cancelled");
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let (_, client) = client(EchoModelClient);
        let ada = ModelId::parse("ada").unwrap();
        let babbage = ModelId::parse("babbage").unwrap();
        let options = CallOptions::default();

        let (first, second) = tokio::join!(
            client.get_model(&ada, &options),
            client.get_model(&babbage, &options)
        );

        assert_eq!(first.payload().map(Model::id), Some(&ada));
        assert_eq!(second.payload().map(Model::id), Some(&babbage));
        assert_ne!(first.correlation_id(), second.correlation_id());
    }
}
