//! Structural decoding of response data into typed targets.
//!
//! The decoder walks a JSON value and a target in lockstep. Records are
//! matched member by member through their cached [`ObjectDescriptor`]; every
//! other slot kind implements [`GraphQLType`] directly.
//!
//! Decoding writes into the target in place. When a member fails to decode,
//! the error is returned immediately and the members already written stay
//! written.
//!
//! # Name resolution
//!
//! Each field has a primary name (from `#[graphql(...)]`, or the camelCase
//! field name) and optionally a secondary name (from `#[serde(rename)]`).
//! With `strict` off, a member that matches no primary name falls back to
//! the secondary names; with `strict` on it is ignored.
//!
//! ```ignore
//! #[derive(Default, GraphQLObject)]
//! struct Query {
//!     #[graphql("user(login: $login)")]
//!     user: Option<User>,
//! }
//!
//! #[derive(Default, GraphQLObject)]
//! struct User {
//!     name: String,
//!     #[serde(rename = "avatar_url")]
//!     avatar_url: Option<String>,
//! }
//! ```

mod descriptor;
mod scalar;

pub use descriptor::{FieldDescriptor, ObjectDescriptor, Shape};
pub use scalar::{Id, decode_with_serde};

use serde_json::Value;
use std::fmt;

use crate::response::PathSegment;

/// A type the structural decoder can populate.
pub trait GraphQLType {
    /// The structural shape of this type.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Populate `self` from `value`.
    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError>;
}

/// A record type with a field descriptor table.
///
/// Usually derived with `#[derive(GraphQLObject)]`.
pub trait GraphQLObject: GraphQLType {
    /// The cached descriptor for this type.
    fn descriptor() -> &'static ObjectDescriptor
    where
        Self: Sized;

    /// Access the field at `index` of [`ObjectDescriptor::fields`].
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn GraphQLType>;
}

/// State threaded through one decode call.
#[derive(Debug)]
pub struct DecodeContext {
    strict: bool,
    path: Vec<PathSegment>,
}

impl DecodeContext {
    /// Create a context for a top-level decode.
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            path: Vec::new(),
        }
    }

    /// Whether secondary names are ignored.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// The path of the value currently being decoded.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Decode `value` into `slot` one level below the current path.
    pub fn descend(
        &mut self,
        segment: PathSegment,
        slot: &mut dyn GraphQLType,
        value: &Value,
    ) -> Result<(), DecodeError> {
        self.path.push(segment);
        let result = slot.decode(value, self);
        self.path.pop();
        result
    }

    /// Build an error located at the current path.
    pub fn error(&self, message: impl Into<String>) -> DecodeError {
        DecodeError {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    /// Build a type-mismatch error located at the current path.
    pub fn mismatch(&self, expected: &str, found: &Value) -> DecodeError {
        self.error(format!("expected {expected}, found {}", kind_of(found)))
    }
}

/// A target/value mismatch found during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    path: Vec<PathSegment>,
    message: String,
}

impl DecodeError {
    /// The path of the offending value.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// The mismatch description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode data")?;
        if !self.path.is_empty() {
            write!(f, " at ")?;
            for (i, segment) in self.path.iter().enumerate() {
                if i > 0 && matches!(segment, PathSegment::Field(_)) {
                    write!(f, ".")?;
                }
                write!(f, "{segment}")?;
            }
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Short description of a JSON value's kind for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Populate a record from a JSON object.
///
/// Unknown members are ignored and fields without a member keep their
/// current value. A field is written at most once; when both its primary
/// and secondary names are present, the primary member wins. Inline
/// fragment fields receive the whole object after the direct members are
/// applied.
pub fn decode_object<T: GraphQLObject>(
    target: &mut T,
    value: &Value,
    cx: &mut DecodeContext,
) -> Result<(), DecodeError> {
    let members = match value {
        Value::Object(members) => members,
        Value::Null => return Ok(()),
        other => return Err(cx.mismatch("object", other)),
    };

    let descriptor = T::descriptor();
    let mut written = vec![false; descriptor.fields().len()];

    // Primary names claim their fields before any secondary name is looked at.
    for (key, member) in members {
        if let Some(index) = descriptor.resolve(key, true) {
            decode_member(target, index, key, member, &mut written, cx)?;
        }
    }

    if !cx.strict() {
        for (key, member) in members {
            if let Some(index) = descriptor.resolve_secondary(key) {
                decode_member(target, index, key, member, &mut written, cx)?;
            }
        }
    }

    for &index in descriptor.fragments() {
        if written[index] {
            continue;
        }
        if let Some(slot) = target.field_mut(index) {
            slot.decode(value, cx)?;
            written[index] = true;
        }
    }

    Ok(())
}

fn decode_member<T: GraphQLObject>(
    target: &mut T,
    index: usize,
    key: &str,
    member: &Value,
    written: &mut [bool],
    cx: &mut DecodeContext,
) -> Result<(), DecodeError> {
    if written[index] {
        return Ok(());
    }
    if let Some(slot) = target.field_mut(index) {
        cx.descend(PathSegment::Field(key.to_string()), slot, member)?;
        written[index] = true;
    }
    Ok(())
}

/// Decode `data` into `target`, the entry point used by the client.
pub fn decode_data(
    data: &Value,
    target: &mut dyn GraphQLType,
    strict: bool,
) -> Result<(), DecodeError> {
    let mut cx = DecodeContext::new(strict);
    target.decode(data, &mut cx)
}

#[cfg(test)]
mod tests;
