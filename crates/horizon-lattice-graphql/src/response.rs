//! GraphQL error entries and their aggregated form.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A single entry of a response's `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// The error message; empty when the server sent none.
    #[serde(default)]
    pub message: String,

    /// Locations in the document where the error occurred.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub locations: Vec<Location>,

    /// Path to the field that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    /// Additional error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl ErrorEntry {
    /// Create an entry with a message and no locations.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }

    /// Add a location.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.locations.push(Location { line, column });
        self
    }
}

/// A location in a GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// A segment in a response path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A field name.
    Field(String),
    /// An array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// The non-empty `errors` array of a response, reported as one failure.
///
/// The display form concatenates `Message: <message>, Locations: [...]` for
/// every entry in response order, with no separator between entries. Callers
/// that need structure should walk [`GraphQLErrors::entries`] instead of
/// parsing the text.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLErrors {
    entries: Vec<ErrorEntry>,
}

impl GraphQLErrors {
    /// Wrap a list of entries, or `None` when the list is empty.
    pub fn from_entries(entries: Vec<ErrorEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    /// The wrapped entries.
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Number of entries (always at least one).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, ErrorEntry> {
        self.entries.iter()
    }

    /// Unwrap into the underlying entries.
    pub fn into_entries(self) -> Vec<ErrorEntry> {
        self.entries
    }
}

impl fmt::Display for GraphQLErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "Message: {}, Locations: [", entry.message)?;
            for (i, location) in entry.locations.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{{Line:{} Column:{}}}", location.line, location.column)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLErrors {}

impl IntoIterator for GraphQLErrors {
    type Item = ErrorEntry;
    type IntoIter = std::vec::IntoIter<ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a GraphQLErrors {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Deserialize a list that servers sometimes send as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
