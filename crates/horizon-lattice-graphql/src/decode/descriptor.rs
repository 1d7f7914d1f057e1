//! Type descriptors consumed by the decoder and the query builder.

use std::collections::HashMap;

/// The structural kind of a target slot.
#[derive(Debug, Clone)]
pub enum Shape {
    /// A leaf value with the given GraphQL type name.
    Scalar(&'static str),
    /// Opaque JSON, passed through without typing.
    Any,
    /// A record described by an [`ObjectDescriptor`].
    Object(&'static ObjectDescriptor),
    /// A slot that may hold `null`.
    Nullable(Box<Shape>),
    /// An ordered sequence.
    List(Box<Shape>),
}

impl Shape {
    /// The record descriptor reachable through nullable and list wrappers.
    pub fn object(&self) -> Option<&'static ObjectDescriptor> {
        match self {
            Self::Object(descriptor) => Some(descriptor),
            Self::Nullable(inner) | Self::List(inner) => inner.object(),
            Self::Scalar(_) | Self::Any => None,
        }
    }
}

/// Declared metadata for one field of a record.
#[derive(Debug)]
pub struct FieldDescriptor {
    rust_name: &'static str,
    query: &'static str,
    primary: Option<&'static str>,
    secondary: Option<&'static str>,
    fragment: bool,
    shape: fn() -> Shape,
}

impl FieldDescriptor {
    /// Describe a field.
    ///
    /// `query` is the text the field contributes to a selection set: a plain
    /// name, `alias: name`, `name(arg: $var)` or `... on Type`. The primary
    /// wire name is derived from it. `secondary` is the name used by generic
    /// serialization, if any.
    pub fn new(
        rust_name: &'static str,
        query: &'static str,
        secondary: Option<&'static str>,
        shape: fn() -> Shape,
    ) -> Self {
        let trimmed = query.trim();
        let fragment = trimmed.starts_with("...");
        Self {
            rust_name,
            query: trimmed,
            primary: if fragment {
                None
            } else {
                Some(response_key(trimmed))
            },
            secondary,
            fragment,
            shape,
        }
    }

    /// The Rust field identifier.
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// The selection text for this field.
    pub fn query(&self) -> &'static str {
        self.query
    }

    /// The response key matched first during decoding.
    pub fn primary_name(&self) -> Option<&'static str> {
        self.primary
    }

    /// The fallback response key used when decoding is not strict.
    pub fn secondary_name(&self) -> Option<&'static str> {
        self.secondary
    }

    /// Whether this field is an inline fragment on its parent's object.
    pub fn is_fragment(&self) -> bool {
        self.fragment
    }

    /// The field's structural shape.
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }
}

/// Reduce selection text to the key the server uses in the response.
fn response_key(query: &str) -> &str {
    let name = match query.find('(') {
        Some(idx) => &query[..idx],
        None => query,
    };
    let name = match name.find(':') {
        Some(idx) => &name[..idx],
        None => name,
    };
    name.trim()
}

/// Descriptor for a record type, built once per type and cached.
#[derive(Debug)]
pub struct ObjectDescriptor {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    by_primary: HashMap<&'static str, usize>,
    by_secondary: HashMap<&'static str, usize>,
    fragments: Vec<usize>,
}

impl ObjectDescriptor {
    /// Build a descriptor and its lookup tables.
    ///
    /// When several fields declare the same name, the first one wins.
    pub fn new(type_name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        let mut by_primary = HashMap::new();
        let mut by_secondary = HashMap::new();
        let mut fragments = Vec::new();

        for (index, field) in fields.iter().enumerate() {
            if field.fragment {
                fragments.push(index);
            }
            if let Some(name) = field.primary {
                by_primary.entry(name).or_insert(index);
            }
            if let Some(name) = field.secondary {
                by_secondary.entry(name).or_insert(index);
            }
        }

        Self {
            type_name,
            fields,
            by_primary,
            by_secondary,
            fragments,
        }
    }

    /// The Rust type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All described fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Indices of inline fragment fields.
    pub fn fragments(&self) -> &[usize] {
        &self.fragments
    }

    /// Find the field a response member belongs to.
    ///
    /// Primary names always win. Secondary names are consulted only when
    /// `strict` is off and no field declares `key` as its primary name.
    pub fn resolve(&self, key: &str, strict: bool) -> Option<usize> {
        if let Some(&index) = self.by_primary.get(key) {
            return Some(index);
        }
        if strict {
            return None;
        }
        self.by_secondary.get(key).copied()
    }

    /// Find the field `key` names as its secondary name.
    ///
    /// Keys that are some field's primary name never resolve here.
    pub fn resolve_secondary(&self, key: &str) -> Option<usize> {
        if self.by_primary.contains_key(key) {
            return None;
        }
        self.by_secondary.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_shape() -> Shape {
        Shape::Scalar("String")
    }

    #[test]
    fn test_response_key_extraction() {
        assert_eq!(response_key("login"), "login");
        assert_eq!(response_key("user(login: $login)"), "user");
        assert_eq!(response_key("owner: repositoryOwner(login: \"a:b\")"), "owner");
        assert_eq!(response_key(" viewer "), "viewer");
    }

    #[test]
    fn test_fragment_has_no_primary_name() {
        let field = FieldDescriptor::new("droid", "... on Droid", None, string_shape);
        assert!(field.is_fragment());
        assert_eq!(field.primary_name(), None);
    }

    #[test]
    fn test_resolution_precedence() {
        let descriptor = ObjectDescriptor::new(
            "Node",
            vec![
                FieldDescriptor::new("id", "id", Some("identifier"), string_shape),
                FieldDescriptor::new("legacy_id", "legacyId", Some("id"), string_shape),
                FieldDescriptor::new("title", "title", Some("name"), string_shape),
            ],
        );

        // A primary match is never displaced by a secondary one.
        assert_eq!(descriptor.resolve("id", false), Some(0));
        assert_eq!(descriptor.resolve("name", false), Some(2));
        assert_eq!(descriptor.resolve("name", true), None);
        assert_eq!(descriptor.resolve("unknown", false), None);

        assert_eq!(descriptor.resolve_secondary("name"), Some(2));
        assert_eq!(descriptor.resolve_secondary("id"), None);
        assert_eq!(descriptor.resolve_secondary("title"), None);
    }
}
