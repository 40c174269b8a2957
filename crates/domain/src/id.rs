//! Typed identifiers.
//!
//! Every handle the API hands out is a plain string on the wire. `Identifier<K>`
//! validates that string once and keeps the different kinds apart at compile
//! time through the marker type `K`:
//!
//! ```compile_fail
//! use lumen_domain::id::{ModelId, OwnerId};
//!
//! let owner: OwnerId = ModelId::parse("openai").unwrap();
//! ```
//!
//! Equality, ordering and hashing ignore character case; the stored text keeps
//! the spelling it was parsed from.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Marker trait implemented by every identifier kind.
pub trait IdentifierKind {
    /// Type name used in `Debug` output and validation errors.
    const NAME: &'static str;

    /// When true, `Debug` output hides the value.
    const SENSITIVE: bool = false;
}

/// Marker for API keys.
#[derive(Debug)]
pub enum ApiKeyKind {}

impl IdentifierKind for ApiKeyKind {
    const NAME: &'static str = "ApiKey";
    const SENSITIVE: bool = true;
}

/// Marker for organization ids.
#[derive(Debug)]
pub enum OrganizationKind {}

impl IdentifierKind for OrganizationKind {
    const NAME: &'static str = "OrganizationId";
}

/// Marker for owner ids.
#[derive(Debug)]
pub enum OwnerKind {}

impl IdentifierKind for OwnerKind {
    const NAME: &'static str = "OwnerId";
}

/// Marker for model ids.
#[derive(Debug)]
pub enum ModelKind {}

impl IdentifierKind for ModelKind {
    const NAME: &'static str = "ModelId";
}

/// Marker for object-type tags (`"model"`, `"list"`, ...).
#[derive(Debug)]
pub enum ObjectTypeKind {}

impl IdentifierKind for ObjectTypeKind {
    const NAME: &'static str = "ObjectType";
}

/// Secret key sent as a bearer token.
pub type ApiKey = Identifier<ApiKeyKind>;
/// Organization the requests are billed to.
pub type OrganizationId = Identifier<OrganizationKind>;
/// Owner of a model.
pub type OwnerId = Identifier<OwnerKind>;
/// Model identifier, e.g. `text-curie:001`.
pub type ModelId = Identifier<ModelKind>;
/// Object-type tag attached to every API object.
pub type ObjectType = Identifier<ObjectTypeKind>;

/// A validated, case-insensitive string identifier.
pub struct Identifier<K> {
    value: String,
    kind: PhantomData<fn() -> K>,
}

impl<K: IdentifierKind> Identifier<K> {
    /// Parses an identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidIdentifier`] when the trimmed text is empty.
    pub fn parse(text: &str) -> DomainResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidIdentifier(K::NAME));
        }
        Ok(Self {
            value: trimmed.to_owned(),
            kind: PhantomData,
        })
    }

    /// Parses an identifier, returning `None` instead of an error.
    #[must_use]
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }
}

impl<K> Identifier<K> {
    /// Returns the identifier text as parsed (trimmed, original case).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Consumes the identifier and returns the owned text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.value
    }

    /// Case-folded view used by every comparison.
    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.value.chars().flat_map(char::to_uppercase)
    }
}

impl<K> Clone for Identifier<K> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            kind: PhantomData,
        }
    }
}

impl<K> PartialEq for Identifier<K> {
    fn eq(&self, other: &Self) -> bool {
        self.folded().eq(other.folded())
    }
}

impl<K> Eq for Identifier<K> {}

impl<K> PartialOrd for Identifier<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Identifier<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl<K> Hash for Identifier<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.folded() {
            c.hash(state);
        }
        state.write_u8(0xff);
    }
}

impl<K: IdentifierKind> fmt::Debug for Identifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if K::SENSITIVE {
            write!(f, "{}(<redacted>)", K::NAME)
        } else {
            write!(f, "{}({:?})", K::NAME, self.value)
        }
    }
}

impl<K> fmt::Display for Identifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K> AsRef<str> for Identifier<K> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<K: IdentifierKind> FromStr for Identifier<K> {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: IdentifierKind> TryFrom<&str> for Identifier<K> {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl<K: IdentifierKind> TryFrom<String> for Identifier<K> {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl<K> Serialize for Identifier<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, K: IdentifierKind> Deserialize<'de> for Identifier<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Generates a fresh correlation id.
///
/// UUID v7 embeds a timestamp, so ids sort by creation time.
#[must_use]
pub fn generate_correlation_id() -> Uuid {
    Uuid::now_v7()
}
