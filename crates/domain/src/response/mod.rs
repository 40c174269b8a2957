//! HTTP Response domain types

mod decode;
mod envelope;
mod raw;
mod status;

pub use decode::{CORRELATION_HEADER, DecodeError};
pub use envelope::{Envelope, Outcome};
pub use raw::RawResponse;
pub use status::StatusCode;
