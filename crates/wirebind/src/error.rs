//! # Error Definitions
//!
//! Registration-time, marshalling-time and vocabulary failures.

use crate::binding::Location;
use crate::binding::ValueKind;
use crate::codec::CodecError;

/// An invalid binding or shape. Raised while binding tables are built;
/// never recoverable at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A binding with an empty wire name.
    EmptyWireName { location: Location },
    /// The value kind cannot be rendered at the location.
    KindNotAllowed { wire_name: &'static str, location: Location, kind: ValueKind },
    /// Only payload fields may be nullable.
    NullableOutsidePayload { wire_name: &'static str, location: Location },
    /// Two fields of one shape share a wire name at the same location.
    DuplicateWireName { shape: &'static str, wire_name: &'static str, location: Location },
    /// A payload-root field must be the only payload binding of its shape.
    ConflictingPayloadRoot { shape: &'static str, wire_name: &'static str },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyWireName { location } => write!(f, "binding at {:?} has an empty wire name", location),
            Self::KindNotAllowed { wire_name, location, kind } => {
                write!(f, "binding '{}': {:?} values cannot be written at {:?}", wire_name, kind, location)
            }
            Self::NullableOutsidePayload { wire_name, location } => {
                write!(f, "binding '{}': only payload fields can be nullable, found {:?}", wire_name, location)
            }
            Self::DuplicateWireName { shape, wire_name, location } => {
                write!(f, "shape {}: wire name '{}' bound twice at {:?}", shape, wire_name, location)
            }
            Self::ConflictingPayloadRoot { shape, wire_name } => {
                write!(f, "shape {}: payload root '{}' conflicts with other payload bindings", shape, wire_name)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// A request model could not be written to its sink.
///
/// The originating fault is kept and exposed through `source()`.
#[derive(Debug)]
pub enum MarshallingError {
    /// No model was supplied. Raised before the sink is touched.
    MissingModel,
    /// The model's binding table is inconsistent. Raised before any of its
    /// fields is written.
    InvalidShape(ConfigurationError),
    /// Writing one field failed; marshalling stopped there.
    Field {
        shape: &'static str,
        field: &'static str,
        source: CodecError,
    },
}

impl MarshallingError {
    /// The dotted path of the failing field, innermost last.
    pub fn field_path(&self) -> Vec<&'static str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Field { field, source, .. } = current {
            path.push(*field);
            match source {
                CodecError::Nested(inner) => current = inner.as_ref(),
                _ => break,
            }
        }
        path
    }
}

impl std::fmt::Display for MarshallingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingModel => write!(f, "invalid argument passed to marshall: no request model"),
            Self::InvalidShape(e) => write!(f, "unable to marshall: {}", e),
            Self::Field { shape, field, source } => {
                write!(f, "unable to marshall {}.{}: {}", shape, field, source)
            }
        }
    }
}

impl std::error::Error for MarshallingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingModel => None,
            Self::InvalidShape(e) => Some(e),
            Self::Field { source, .. } => Some(source),
        }
    }
}

/// A wire string that is not part of a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownVariantError {
    /// The input was absent or empty.
    Empty { type_name: &'static str },
    /// The input matched no declared wire string exactly.
    Unknown { type_name: &'static str, value: String },
}

impl std::fmt::Display for UnknownVariantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { type_name } => write!(f, "{}: value cannot be null or empty", type_name),
            Self::Unknown { type_name, value } => write!(f, "cannot create {} from '{}'", type_name, value),
        }
    }
}

impl std::error::Error for UnknownVariantError {}
