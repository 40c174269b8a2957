//! Outgoing request types

mod context;
mod header;
mod method;
mod spec;

pub use context::RequestContext;
pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use spec::RequestSpec;
