//! Lumen Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the transport and the clock)
//! - The models client, which turns every call into an envelope
//! - Application-level error handling

pub mod error;
pub mod models_client;
pub mod ports;

pub use error::{ApplicationError, ApplicationResult};
pub use models_client::{CallOptions, ModelsClient};
pub use ports::{Clock, HttpClient, HttpClientError, HttpFuture};
pub use tokio_util::sync::CancellationToken;
