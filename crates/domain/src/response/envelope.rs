//! Response envelope
//!
//! Every remote operation resolves to an [`Envelope`]: either a payload, or a
//! failure described by a status message and diagnostic text. Failures are
//! data, never errors, so callers above the decoders handle one type only.

use std::error::Error;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use uuid::Uuid;

use super::{RawResponse, StatusCode};
use crate::request::RequestContext;

/// Success or failure of one remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The call produced a payload.
    Success(T),
    /// The call failed; details live on the envelope.
    Failure,
}

/// Outcome of one remote operation plus everything needed to diagnose it.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    outcome: Outcome<T>,
    message: String,
    diagnostic: Option<String>,
    timestamp: DateTime<Utc>,
    raw_response: Option<RawResponse>,
    correlation_id: Option<Uuid>,
    context: Option<RequestContext>,
}

impl<T> Envelope<T> {
    fn with_outcome(outcome: Outcome<T>, message: String) -> Self {
        Self {
            outcome,
            message,
            diagnostic: None,
            timestamp: Utc::now(),
            raw_response: None,
            correlation_id: None,
            context: None,
        }
    }

    /// Wraps a payload. The status message is empty.
    #[must_use]
    pub fn success(payload: T) -> Self {
        Self::with_outcome(Outcome::Success(payload), String::new())
    }

    /// Builds a failure with an explicit status message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Failure, message.into())
    }

    /// Builds a failure from a caught error.
    ///
    /// The status message is the error's `Display` text; the diagnostic is
    /// its `Debug` form followed by every `source()` in the chain.
    #[must_use]
    pub fn exception<E: Error + ?Sized>(error: &E) -> Self {
        Self::error(error.to_string()).with_diagnostic(error_trace(error))
    }

    /// Failure with no status message, for non-success HTTP statuses.
    pub(crate) fn failure() -> Self {
        Self::with_outcome(Outcome::Failure, String::new())
    }

    /// Attaches diagnostic text.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    /// Overrides the timestamp (defaults to construction time).
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Keeps the raw transport response for introspection.
    #[must_use]
    pub fn with_raw_response(mut self, raw_response: RawResponse) -> Self {
        self.raw_response = Some(raw_response);
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub const fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Attaches the originating request context.
    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns true when the envelope carries a payload.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Returns true when the envelope carries no payload.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the outcome.
    #[must_use]
    pub const fn outcome(&self) -> &Outcome<T> {
        &self.outcome
    }

    /// Returns the payload, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(payload) => Some(payload),
            Outcome::Failure => None,
        }
    }

    /// Consumes the envelope and returns the payload, if any.
    #[must_use]
    pub fn into_payload(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(payload) => Some(payload),
            Outcome::Failure => None,
        }
    }

    /// Human-readable status message; empty on success.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Additional diagnostic text (trace, raw body, per-item errors).
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Server-supplied or construction-time timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The raw transport response, when one was received.
    #[must_use]
    pub const fn raw_response(&self) -> Option<&RawResponse> {
        self.raw_response.as_ref()
    }

    /// Status code of the raw response, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.raw_response.as_ref().map(RawResponse::status)
    }

    /// Correlation id from the `x-request-id` header or the caller's fallback.
    #[must_use]
    pub const fn correlation_id(&self) -> Option<Uuid> {
        self.correlation_id
    }

    /// The originating request context.
    #[must_use]
    pub const fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }
}

impl<T> Envelope<Vec<T>> {
    /// Parsed items; empty on failure.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.payload().map_or(&[], Vec::as_slice)
    }

    /// Consumes the envelope and returns the items; empty on failure.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.into_payload().unwrap_or_default()
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 8)?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("diagnostic", &self.diagnostic)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("correlation_id", &self.correlation_id)?;
        state.serialize_field("status", &self.status())?;
        state.serialize_field("context", &self.context)?;
        state.serialize_field("payload", &self.payload())?;
        state.end()
    }
}

/// Renders an error and its `source()` chain.
fn error_trace<E: Error + ?Sized>(error: &E) -> String {
    let mut trace = format!("{error:?}");
    let mut source = error.source();
    while let Some(cause) = source {
        trace.push_str("\ncaused by: ");
        trace.push_str(&cause.to_string());
        source = cause.source();
    }
    trace
}
