//! Leaf and container slot implementations.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DecodeContext, DecodeError, GraphQLType, Shape};
use crate::response::PathSegment;

// A `null` for a non-nullable slot leaves the slot untouched, so a field
// nulled out by a partial failure keeps its default.

impl GraphQLType for String {
    fn shape() -> Shape {
        Shape::Scalar("String")
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
        match value {
            Value::String(s) => {
                self.clone_from(s);
                Ok(())
            }
            Value::Null => Ok(()),
            other => Err(cx.mismatch("String", other)),
        }
    }
}

impl GraphQLType for bool {
    fn shape() -> Shape {
        Shape::Scalar("Boolean")
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
        match value {
            Value::Bool(b) => {
                *self = *b;
                Ok(())
            }
            Value::Null => Ok(()),
            other => Err(cx.mismatch("Boolean", other)),
        }
    }
}

macro_rules! integer_slot {
    ($($ty:ty),*) => {
        $(
            impl GraphQLType for $ty {
                fn shape() -> Shape {
                    Shape::Scalar("Int")
                }

                fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
                    match value {
                        Value::Number(n) => {
                            let parsed = n
                                .as_i64()
                                .and_then(|i| <$ty>::try_from(i).ok())
                                .or_else(|| n.as_u64().and_then(|u| <$ty>::try_from(u).ok()));
                            match parsed {
                                Some(v) => {
                                    *self = v;
                                    Ok(())
                                }
                                None => Err(cx.error(format!(
                                    "number {n} does not fit in {}",
                                    stringify!($ty)
                                ))),
                            }
                        }
                        Value::Null => Ok(()),
                        other => Err(cx.mismatch("Int", other)),
                    }
                }
            }
        )*
    };
}

integer_slot!(i32, i64, u32, u64);

macro_rules! float_slot {
    ($($ty:ty),*) => {
        $(
            impl GraphQLType for $ty {
                fn shape() -> Shape {
                    Shape::Scalar("Float")
                }

                fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
                    match value {
                        Value::Number(n) => match n.as_f64() {
                            Some(v) => {
                                *self = v as $ty;
                                Ok(())
                            }
                            None => Err(cx.error(format!("number {n} is not a float"))),
                        },
                        Value::Null => Ok(()),
                        other => Err(cx.mismatch("Float", other)),
                    }
                }
            }
        )*
    };
}

float_slot!(f32, f64);

/// A GraphQL `ID`.
///
/// Servers serialize IDs as strings, but integer IDs are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub String);

impl Id {
    /// Borrow the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl GraphQLType for Id {
    fn shape() -> Shape {
        Shape::Scalar("ID")
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
        match value {
            Value::String(s) => self.0.clone_from(s),
            Value::Number(n) if n.is_i64() || n.is_u64() => self.0 = n.to_string(),
            Value::Null => {}
            other => return Err(cx.mismatch("ID", other)),
        }
        Ok(())
    }
}

impl<T: GraphQLType + Default> GraphQLType for Option<T> {
    fn shape() -> Shape {
        Shape::Nullable(Box::new(T::shape()))
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::default).decode(value, cx)
    }
}

impl<T: GraphQLType + Default> GraphQLType for Vec<T> {
    fn shape() -> Shape {
        Shape::List(Box::new(T::shape()))
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
        let items = match value {
            Value::Array(items) => items,
            Value::Null => return Ok(()),
            other => return Err(cx.mismatch("list", other)),
        };

        self.clear();
        self.reserve(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut element = T::default();
            cx.descend(PathSegment::Index(index), &mut element, item)?;
            self.push(element);
        }
        Ok(())
    }
}

impl<T: GraphQLType> GraphQLType for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
        (**self).decode(value, cx)
    }
}

impl GraphQLType for Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn decode(&mut self, value: &Value, _cx: &mut DecodeContext) -> Result<(), DecodeError> {
        self.clone_from(value);
        Ok(())
    }
}

impl GraphQLType for Map<String, Value> {
    fn shape() -> Shape {
        Shape::Any
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) -> Result<(), DecodeError> {
        match value {
            Value::Object(members) => {
                self.clone_from(members);
                Ok(())
            }
            Value::Null => Ok(()),
            other => Err(cx.mismatch("object", other)),
        }
    }
}

/// Decode a leaf through its serde implementation.
///
/// Backs [`graphql_scalar!`](crate::graphql_scalar) for enums and custom
/// scalars.
pub fn decode_with_serde<T: DeserializeOwned>(
    slot: &mut T,
    value: &Value,
    cx: &mut DecodeContext,
) -> Result<(), DecodeError> {
    if value.is_null() {
        return Ok(());
    }
    *slot = T::deserialize(value).map_err(|e| cx.error(e.to_string()))?;
    Ok(())
}

/// Implement the decoder and variable traits for a serde-capable leaf type.
///
/// ```ignore
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// enum Episode {
///     #[default]
///     NewHope,
///     Empire,
///     Jedi,
/// }
///
/// graphql_scalar!(Episode, "Episode");
/// ```
#[macro_export]
macro_rules! graphql_scalar {
    ($ty:ty, $name:literal) => {
        impl $crate::GraphQLType for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::Scalar($name)
            }

            fn decode(
                &mut self,
                value: &$crate::__private::Value,
                cx: &mut $crate::DecodeContext,
            ) -> ::std::result::Result<(), $crate::DecodeError> {
                $crate::decode::decode_with_serde(self, value, cx)
            }
        }

        impl $crate::InputType for $ty {
            fn input_type() -> ::std::string::String {
                ::std::format!("{}!", $name)
            }
        }
    };
}
