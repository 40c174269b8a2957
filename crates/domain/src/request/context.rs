//! Request context attached to every envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{HttpMethod, RequestSpec};

/// Where a response came from: the originating call and its correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Method of the originating request.
    pub method: HttpMethod,
    /// URL of the originating request.
    pub url: Url,
    /// Correlation id chosen by the caller for this call.
    pub correlation_id: Uuid,
    /// When the request was handed to the transport.
    pub sent_at: DateTime<Utc>,
}

impl RequestContext {
    /// Captures the context of a request about to be sent.
    #[must_use]
    pub fn for_request(request: &RequestSpec, correlation_id: Uuid, sent_at: DateTime<Utc>) -> Self {
        Self {
            method: request.method,
            url: request.url.clone(),
            correlation_id,
            sent_at,
        }
    }
}
