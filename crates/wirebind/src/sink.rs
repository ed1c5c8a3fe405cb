//! # Sink Contract
//!
//! The target the marshaller writes into. A transport-serialization layer
//! implements it; the marshaller only ever calls these three methods.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::binding::Location;

/// A rendered wire primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl std::fmt::Display for WireValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireValue::Null => Ok(()),
            WireValue::Bool(v) => write!(f, "{}", v),
            WireValue::Integer(v) => write!(f, "{}", v),
            WireValue::Float(v) => write!(f, "{}", v),
            WireValue::String(v) => f.write_str(v),
            WireValue::Bytes(v) => f.write_str(&STANDARD.encode(v)),
        }
    }
}

/// A writable wire representation.
///
/// # Invariants
/// - `set_at` calls must be applied in call order; list elements rely on it.
/// - `begin_structured` opens a payload-scoped child rooted at `wire_name`.
///   The child is closed with `finish`, after which the parent is usable again
///   (the borrow enforces this).
pub trait Sink: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sink type for nested structures. A nested sink should name itself as
    /// its own `Nested` type so that recursion through it stays finite.
    type Nested<'a>: Sink<Error = Self::Error>
    where
        Self: 'a;

    /// Writes one scalar at `location` under `wire_name`.
    fn set_at(&mut self, location: Location, wire_name: &str, value: WireValue) -> Result<(), Self::Error>;

    /// Opens a nested object under `wire_name` in the payload.
    fn begin_structured(&mut self, wire_name: &str) -> Result<Self::Nested<'_>, Self::Error>;

    /// Closes this scope.
    fn finish(self) -> Result<(), Self::Error>;
}
