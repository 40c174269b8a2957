//! Envelope decoders
//!
//! Turn a [`RawResponse`] into an [`Envelope`]. Neither decoder returns an
//! error: empty bodies, non-success statuses, malformed JSON and item parser
//! failures all come back as failure envelopes.

use std::error::Error;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::{Envelope, RawResponse};

/// Response header carrying the server-side correlation id.
pub const CORRELATION_HEADER: &str = "x-request-id";

/// Structural problems found in a response body before item parsing.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The body is valid JSON but not an object.
    #[error("response body is not a JSON object")]
    NotAnObject,

    /// A collection response has no `data` array.
    #[error("data array invalid or missing")]
    MissingData,
}

impl<T> Envelope<T> {
    /// Decodes a single-object response.
    ///
    /// On 200/201 the whole JSON object is handed to `parse_item`. Other
    /// statuses yield a failure carrying the raw body as diagnostic.
    pub fn decode_object<F, E>(raw: RawResponse, fallback_correlation_id: Uuid, parse_item: F) -> Self
    where
        F: FnOnce(&Value) -> Result<T, E>,
        E: Error,
    {
        decode(raw, fallback_correlation_id, |json| match parse_item(json) {
            Ok(item) => Self::success(item),
            Err(error) => Self::exception(&error),
        })
    }
}

impl<T> Envelope<Vec<T>> {
    /// Decodes a collection response of the form `{"data": [...]}`.
    ///
    /// Items are parsed independently. An item that fails to parse is
    /// skipped and its error message is kept; the messages are joined with
    /// newlines into the diagnostic of an envelope that is still a success.
    pub fn decode_array<F, E>(raw: RawResponse, fallback_correlation_id: Uuid, mut parse_item: F) -> Self
    where
        F: FnMut(&Value) -> Result<T, E>,
        E: Error,
    {
        decode(raw, fallback_correlation_id, |json| {
            let Some(data) = json.get("data").and_then(Value::as_array) else {
                return Self::exception(&DecodeError::MissingData);
            };

            let mut items = Vec::with_capacity(data.len());
            let mut item_errors = Vec::new();
            for element in data {
                match parse_item(element) {
                    Ok(item) => items.push(item),
                    Err(error) => item_errors.push(error.to_string()),
                }
            }

            let envelope = Self::success(items);
            if item_errors.is_empty() {
                envelope
            } else {
                envelope.with_diagnostic(item_errors.join("\n"))
            }
        })
    }
}

/// Shared pipeline; `decode_payload` only runs for 200/201 with a JSON object body.
fn decode<T>(
    raw: RawResponse,
    fallback_correlation_id: Uuid,
    decode_payload: impl FnOnce(&Value) -> Envelope<T>,
) -> Envelope<T> {
    let correlation_id = correlation_id(&raw, fallback_correlation_id);

    if raw.body().is_empty() {
        let message = format!("{} - {}", raw.status().as_u16(), raw.status_text());
        let diagnostic = raw.to_string();
        let received_at = raw.received_at();
        return Envelope::error(message)
            .with_diagnostic(diagnostic)
            .with_timestamp(received_at)
            .with_raw_response(raw)
            .with_correlation_id(correlation_id);
    }

    let envelope = match parse_object(raw.body()) {
        Ok(json) => {
            let timestamp = body_timestamp(&json).unwrap_or_else(Utc::now);
            let envelope = if raw.status().carries_payload() {
                decode_payload(&json)
            } else {
                Envelope::failure().with_diagnostic(raw.body_text())
            };
            envelope.with_timestamp(timestamp)
        }
        Err(error) => Envelope::exception(&error),
    };

    envelope
        .with_raw_response(raw)
        .with_correlation_id(correlation_id)
}

fn parse_object(body: &[u8]) -> Result<Value, DecodeError> {
    let json: Value = serde_json::from_slice(body)?;
    if json.is_object() {
        Ok(json)
    } else {
        Err(DecodeError::NotAnObject)
    }
}

/// `x-request-id` when it holds a UUID, otherwise the caller's fallback.
fn correlation_id(raw: &RawResponse, fallback: Uuid) -> Uuid {
    raw.header(CORRELATION_HEADER)
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .unwrap_or(fallback)
}

/// Top-level `timestamp`: epoch seconds or an RFC 3339 string.
fn body_timestamp(json: &Value) -> Option<DateTime<Utc>> {
    match json.get("timestamp")? {
        Value::Number(seconds) => seconds
            .as_i64()
            .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single()),
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        _ => None,
    }
}
