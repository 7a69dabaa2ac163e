//! Attribute definitions and the case-insensitive collection name wrapper.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The semantic type of a stored attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// UTF-8 text.
    Text,
    /// Signed integer.
    Integer,
    /// Floating point.
    Float,
    /// Boolean.
    Boolean,
    /// Arbitrary nested JSON-shaped structure.
    Json,
    /// Raw bytes.
    Binary,
}

/// A single attribute (column) definition within a collection schema.
///
/// Two attributes are equal iff every field is equal — the derived
/// [`PartialEq`] implementation is exactly that comparison, no hand-written
/// override needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, unique within its collection.
    pub name: String,
    /// Semantic type of the attribute's values.
    pub attr_type: AttributeType,
    /// Whether values for this attribute must be unique within the
    /// collection.
    pub unique: bool,
    /// Whether the attribute must be present (non-null) on every record.
    pub required: bool,
    /// Whether this attribute is (part of) the collection's primary key.
    pub primary_key: bool,
}

impl Attribute {
    /// Build a plain, non-unique, non-required, non-primary-key attribute
    /// of the given type — the shape produced by the shorthand form of an
    /// attribute input.
    pub fn plain(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Attribute {
            name: name.into(),
            attr_type,
            unique: false,
            required: false,
            primary_key: false,
        }
    }
}

/// A collection name that compares, hashes, and looks up case-insensitively.
///
/// Internally stores the lower-cased form so every [`CollectionName`]
/// constructed from case-variants of the same string is interchangeable as
/// a map key, satisfying "identified by a case-insensitive name" without
/// requiring callers to remember to lower-case at every call site.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct CollectionName(String);

impl CollectionName {
    /// Wrap a collection name, normalizing it to lower case.
    pub fn new(name: impl AsRef<str>) -> Self {
        CollectionName(name.as_ref().to_lowercase())
    }

    /// The normalized (lower-case) name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq for CollectionName {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Hash for CollectionName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Borrow<str> for CollectionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<T: AsRef<str>> From<T> for CollectionName {
    fn from(value: T) -> Self {
        CollectionName::new(value)
    }
}
