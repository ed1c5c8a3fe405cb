//! # Values
//!
//! Borrowed views of in-memory field values, and the traits that produce them.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;

use crate::binding::Shape;

/// A request model or nested object that the marshaller can walk.
///
/// `field(i)` returns the value of the `i`-th binding of `shape()`, or `None`
/// when the field is unset. Implemented by [`structured!`](crate::structured).
pub trait Structured {
    fn shape(&self) -> &'static Shape;
    fn field(&self, index: usize) -> Option<Value<'_>>;
}

impl std::fmt::Debug for dyn Structured + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {{ .. }}", self.shape().name())
    }
}

/// Types whose shape is known without an instance.
pub trait StaticShape {
    const SHAPE: &'static Shape;
}

/// A borrowed, typed view of one field value.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// An explicit null (list elements that are unset, nullable fields).
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(&'a str),
    Bytes(&'a [u8]),
    Timestamp(DateTime<Utc>),
    /// A closed-vocabulary variant, already in its wire form.
    Enum(&'static str),
    Structured(&'a dyn Structured),
    List(Vec<Value<'a>>),
    Map(Vec<(&'a str, Value<'a>)>),
}

impl Value<'_> {
    /// A short name for the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Enum(_) => "enum",
            Value::Structured(_) => "structure",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

/// Conversion from a model field to a [`Value`]. `None` means unset.
pub trait ToValue {
    fn to_value(&self) -> Option<Value<'_>>;
}

/// Binary data, kept distinct from `Vec<T>` lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob(pub Vec<u8>);

impl From<Vec<u8>> for Blob {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl ToValue for Blob {
    fn to_value(&self) -> Option<Value<'_>> {
        Some(Value::Bytes(&self.0))
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Option<Value<'_>> {
        self.as_ref().and_then(ToValue::to_value)
    }
}

impl<T: ToValue> ToValue for Box<T> {
    fn to_value(&self) -> Option<Value<'_>> {
        self.as_ref().to_value()
    }
}

impl ToValue for String {
    fn to_value(&self) -> Option<Value<'_>> {
        Some(Value::String(self))
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Option<Value<'_>> {
        Some(Value::String(self))
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Option<Value<'_>> {
        Some(Value::Bool(*self))
    }
}

macro_rules! integer_to_value {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Option<Value<'_>> {
                    Some(Value::Integer(i64::from(*self)))
                }
            }
        )*
    };
}

integer_to_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for f32 {
    fn to_value(&self) -> Option<Value<'_>> {
        Some(Value::Float(f64::from(*self)))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Option<Value<'_>> {
        Some(Value::Float(*self))
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Option<Value<'_>> {
        Some(Value::Timestamp(*self))
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Option<Value<'_>> {
        let items = self.iter().map(|v| v.to_value().unwrap_or(Value::Null)).collect();
        Some(Value::List(items))
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Option<Value<'_>> {
        let entries = self
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_value().unwrap_or(Value::Null)))
            .collect();
        Some(Value::Map(entries))
    }
}

impl<T: ToValue> ToValue for HashMap<String, T> {
    fn to_value(&self) -> Option<Value<'_>> {
        let entries = self
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_value().unwrap_or(Value::Null)))
            .collect();
        Some(Value::Map(entries))
    }
}
