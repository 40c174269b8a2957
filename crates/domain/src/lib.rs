//! Lumen Domain - Core types for the models API client
//!
//! This crate defines the typed identifiers, the model record, and the
//! response envelope with its decoders. All types here are pure Rust with
//! no I/O dependencies.

pub mod error;
pub mod id;
pub mod model;
pub mod request;
pub mod response;
pub mod settings;

pub use error::{DomainError, DomainResult};
pub use id::{
    ApiKey, Identifier, IdentifierKind, ModelId, ObjectType, OrganizationId, OwnerId,
    generate_correlation_id,
};
pub use model::Model;
pub use request::{Header, Headers, HttpMethod, RequestContext, RequestSpec};
pub use response::{CORRELATION_HEADER, DecodeError, Envelope, Outcome, RawResponse, StatusCode};
pub use settings::{ClientSettings, DEFAULT_BASE_URL};
