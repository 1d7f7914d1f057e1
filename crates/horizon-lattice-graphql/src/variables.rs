//! Operation variables.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::decode::Id;
use crate::error::{GraphQLClientError, Result};

/// A Rust type usable as a GraphQL variable.
///
/// The input type is used in the variable definitions of generated
/// documents, e.g. `$login:String!`.
pub trait InputType: Serialize {
    /// The GraphQL input type, including the non-null marker.
    fn input_type() -> String;
}

macro_rules! input_type {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl InputType for $ty {
                fn input_type() -> String {
                    $name.to_string()
                }
            }
        )*
    };
}

input_type! {
    String => "String!",
    str => "String!",
    bool => "Boolean!",
    i32 => "Int!",
    i64 => "Int!",
    u32 => "Int!",
    u64 => "Int!",
    f32 => "Float!",
    f64 => "Float!",
    Id => "ID!",
}

impl<T: InputType + ?Sized> InputType for &T {
    fn input_type() -> String {
        T::input_type()
    }
}

impl<T: InputType> InputType for Option<T> {
    fn input_type() -> String {
        let inner = T::input_type();
        match inner.strip_suffix('!') {
            Some(nullable) => nullable.to_string(),
            None => inner,
        }
    }
}

impl<T: InputType + ?Sized> InputType for Box<T> {
    fn input_type() -> String {
        T::input_type()
    }
}

impl<T: InputType> InputType for Vec<T> {
    fn input_type() -> String {
        format!("[{}]!", T::input_type())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Variable {
    value: Value,
    input_type: Option<String>,
}

/// The variable mapping sent with an operation.
///
/// Each entry carries its JSON value and, when known, its GraphQL input
/// type. Only the values go on the wire; the types are needed to generate
/// variable definitions for shaped requests.
#[derive(Clone, Default, PartialEq)]
pub struct Variables {
    entries: BTreeMap<String, Variable>,
}

impl Variables {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, inferring its input type.
    pub fn insert<T: InputType>(&mut self, name: impl Into<String>, value: T) -> Result<()> {
        self.insert_typed(name, T::input_type(), value)
    }

    /// Insert a value with an explicitly declared input type.
    pub fn insert_typed(
        &mut self,
        name: impl Into<String>,
        input_type: impl Into<String>,
        value: impl Serialize,
    ) -> Result<()> {
        let value = serde_json::to_value(value).map_err(GraphQLClientError::Encode)?;
        self.entries.insert(
            name.into(),
            Variable {
                value,
                input_type: Some(input_type.into()),
            },
        );
        Ok(())
    }

    /// Insert a raw JSON value without an input type.
    ///
    /// Untyped variables are fine for manual requests, but a shaped request
    /// cannot declare them.
    pub fn insert_value(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(
            name.into(),
            Variable {
                value,
                input_type: None,
            },
        );
    }

    /// Builder form of [`Variables::insert`].
    pub fn with<T: InputType>(mut self, name: impl Into<String>, value: T) -> Result<Self> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Get a variable's value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|v| &v.value)
    }

    /// Get a variable's declared input type.
    pub fn input_type(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|v| v.input_type.as_deref())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether there are no variables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over names, values and declared types, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value, Option<&str>)> {
        self.entries
            .iter()
            .map(|(name, v)| (name.as_str(), &v.value, v.input_type.as_deref()))
    }

    /// Render the values as a JSON object.
    pub fn to_json(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(name, v)| (name.clone(), v.value.clone()))
            .collect()
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, &v.value)))
            .finish()
    }
}

impl From<Map<String, Value>> for Variables {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl FromIterator<(String, Value)> for Variables {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut variables = Self::new();
        for (name, value) in iter {
            variables.insert_value(name, value);
        }
        variables
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, variable) in &self.entries {
            map.serialize_entry(name, &variable.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Variables {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Map::<String, Value>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inferred_input_types() {
        assert_eq!(String::input_type(), "String!");
        assert_eq!(<&str>::input_type(), "String!");
        assert_eq!(Option::<i32>::input_type(), "Int");
        assert_eq!(Vec::<Id>::input_type(), "[ID!]!");
        assert_eq!(Option::<Vec<Option<bool>>>::input_type(), "[Boolean]");
        assert_eq!(u64::input_type(), "Int!");
        assert_eq!(Box::<str>::input_type(), "String!");
        assert_eq!(Option::<Box<u64>>::input_type(), "Int");
    }

    #[test]
    fn test_insert_and_lookup() {
        let variables = Variables::new()
            .with("login", "octocat")
            .unwrap()
            .with("first", 10)
            .unwrap();

        assert_eq!(variables.len(), 2);
        assert_eq!(variables.get("login"), Some(&json!("octocat")));
        assert_eq!(variables.input_type("first"), Some("Int!"));
    }

    #[test]
    fn test_untyped_from_json_map() {
        let map = json!({"id": "1", "filter": {"open": true}});
        let variables = Variables::from(map.as_object().unwrap().clone());

        assert_eq!(variables.input_type("id"), None);
        assert_eq!(variables.get("filter"), Some(&json!({"open": true})));
    }

    #[test]
    fn test_serializes_values_only() {
        let mut variables = Variables::new();
        variables.insert_typed("episode", "Episode!", "JEDI").unwrap();

        assert_eq!(
            serde_json::to_value(&variables).unwrap(),
            json!({"episode": "JEDI"})
        );
    }
}
