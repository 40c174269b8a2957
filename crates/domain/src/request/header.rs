//! HTTP Header types

use std::fmt;

/// Header names whose values never appear in `Debug` output.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "openai-organization"];

/// A single HTTP header with name and value.
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    /// The header name (e.g., "Accept")
    pub name: String,
    /// The header value (e.g., "application/json")
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns true if the value must be hidden from logs.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        SENSITIVE_HEADERS
            .iter()
            .any(|name| self.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.is_sensitive() {
            "<redacted>"
        } else {
            self.value.as_str()
        };
        f.debug_struct("Header")
            .field("name", &self.name)
            .field("value", &value)
            .finish()
    }
}

/// A collection of HTTP headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a header to the collection.
    pub fn add(&mut self, header: Header) {
        self.items.push(header);
    }

    /// Gets the first value for a header name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns an iterator over all headers.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let headers: Headers = [
            Header::new("Accept", "application/json"),
            Header::new("X-Trace", "abc"),
        ]
        .into_iter()
        .collect();

        assert_eq!(headers.get("accept"), Some("application/json"));
        assert_eq!(headers.get("x-trace"), Some("abc"));
        assert_eq!(headers.get("missing"), None);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_debug_redacts_authorization() {
        let header = Header::new("Authorization", "Bearer sk-secret");
        let debug = format!("{header:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));

        let plain = Header::new("Accept", "application/json");
        assert!(format!("{plain:?}").contains("application/json"));
    }
}
