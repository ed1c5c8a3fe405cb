//! # Value Codec
//!
//! Renders one bound value and writes it into a sink.
//!
//! ## Invariants
//! - **Absent is silent**: an unset field produces no write at all, unless its
//!   binding is nullable, in which case exactly one explicit null is written.
//! - **Order**: list elements are written in source order, one write each,
//!   under `name.1`, `name.2`, ...
//! - **Payload scoping**: inside a nested structure only payload fields are legal.
//! - **Recursion Safety**: nesting is bounded by `MarshallerConfig::max_depth`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::SecondsFormat;

use crate::binding::Binding;
use crate::binding::ElementKind;
use crate::binding::Location;
use crate::binding::ValueKind;
use crate::error::MarshallingError;
use crate::marshaller::ProtocolMarshaller;
use crate::sink::Sink;
use crate::sink::WireValue;
use crate::value::Structured;
use crate::value::Value;

/// A failure while writing a single field.
#[derive(Debug)]
pub enum CodecError {
    /// The value's shape does not match the binding's kind.
    KindMismatch { expected: ValueKind, found: &'static str },
    /// A nested structure declared a path, query, header or payload-root binding.
    LocationNotAllowed(Location),
    /// Nesting went deeper than the configured limit.
    RecursionLimitExceeded(usize),
    /// The sink rejected a write.
    Sink(Box<dyn std::error::Error + Send + Sync>),
    /// A field of a nested structure failed.
    Nested(Box<MarshallingError>),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KindMismatch { expected, found } => {
                write!(f, "expected a {:?} value, found {}", expected, found)
            }
            Self::LocationNotAllowed(location) => {
                write!(f, "{:?} bindings are not allowed inside a nested structure", location)
            }
            Self::RecursionLimitExceeded(limit) => write!(f, "nesting exceeds {} levels", limit),
            Self::Sink(e) => write!(f, "sink rejected write: {}", e),
            Self::Nested(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sink(e) => Some(e.as_ref()),
            Self::Nested(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Position of the marshaller in the model tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cx {
    pub depth: usize,
    /// Inside a nested structure (or a payload-root structure).
    pub nested: bool,
}

impl Cx {
    pub const ROOT: Cx = Cx { depth: 0, nested: false };

    fn enter(self, max_depth: usize) -> Result<Cx> {
        if self.depth + 1 > max_depth {
            return Err(CodecError::RecursionLimitExceeded(max_depth));
        }
        Ok(Cx { depth: self.depth + 1, nested: true })
    }
}

fn sink_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> CodecError {
    CodecError::Sink(Box::new(e))
}

/// Writes one field value according to its binding.
pub(crate) fn write<S: Sink>(
    marshaller: &ProtocolMarshaller,
    sink: &mut S,
    binding: &Binding,
    value: Option<Value<'_>>,
    cx: Cx,
) -> Result<()> {
    let location = binding.location();
    if cx.nested && location != Location::PayloadField {
        return Err(CodecError::LocationNotAllowed(location));
    }

    let value = match value {
        Some(v) => v,
        None if binding.is_nullable() => Value::Null,
        None => return Ok(()),
    };
    let name = binding.wire_name();

    match (binding.kind(), value) {
        (_, Value::Null) => write_scalar(sink, location, name, &Value::Null),
        (ValueKind::Scalar, value) => write_scalar(sink, location, name, &value),
        (ValueKind::Structured, Value::Structured(model)) => {
            if location == Location::PayloadRoot {
                // the structure is the payload itself
                marshaller
                    .marshall_fields(model, sink, cx.enter(marshaller.config().max_depth)?)
                    .map_err(|e| CodecError::Nested(Box::new(e)))
            } else {
                write_structured(marshaller, sink, name, model, cx)
            }
        }
        (ValueKind::List(element), Value::List(items)) => {
            for (i, item) in items.into_iter().enumerate() {
                let name = format!("{}.{}", name, i + 1);
                write_element(marshaller, sink, location, &name, element, item, cx)?;
            }
            Ok(())
        }
        (ValueKind::Map(element), Value::Map(entries)) => {
            for (key, item) in entries {
                let name = format!("{}.{}", name, key);
                write_element(marshaller, sink, location, &name, element, item, cx)?;
            }
            Ok(())
        }
        (expected, value) => Err(CodecError::KindMismatch { expected, found: value.kind_name() }),
    }
}

fn write_element<S: Sink>(
    marshaller: &ProtocolMarshaller,
    sink: &mut S,
    location: Location,
    name: &str,
    element: ElementKind,
    item: Value<'_>,
    cx: Cx,
) -> Result<()> {
    match (element, item) {
        (_, Value::Null) => write_scalar(sink, location, name, &Value::Null),
        (ElementKind::Scalar, item) => write_scalar(sink, location, name, &item),
        (ElementKind::Structured, Value::Structured(model)) => write_structured(marshaller, sink, name, model, cx),
        (ElementKind::Structured, item) => Err(CodecError::KindMismatch {
            expected: ValueKind::Structured,
            found: item.kind_name(),
        }),
    }
}

fn write_structured<S: Sink>(
    marshaller: &ProtocolMarshaller,
    sink: &mut S,
    name: &str,
    model: &dyn Structured,
    cx: Cx,
) -> Result<()> {
    let cx = cx.enter(marshaller.config().max_depth)?;
    let mut scope = sink.begin_structured(name).map_err(sink_error)?;
    marshaller
        .marshall_fields(model, &mut scope, cx)
        .map_err(|e| CodecError::Nested(Box::new(e)))?;
    scope.finish().map_err(sink_error)
}

fn write_scalar<S: Sink>(sink: &mut S, location: Location, name: &str, value: &Value<'_>) -> Result<()> {
    let Some(rendered) = render(value, location)? else {
        return Ok(());
    };
    sink.set_at(location, name, rendered).map_err(sink_error)
}

/// Renders a scalar into its wire primitive for `location`.
///
/// Returns `None` for a null outside the payload: path, query and header slots
/// have no null marker, so nothing is written.
pub fn render(value: &Value<'_>, location: Location) -> Result<Option<WireValue>> {
    let payload = location.is_payload();
    let rendered = match value {
        Value::Null if payload => WireValue::Null,
        Value::Null => return Ok(None),
        Value::Bool(v) => WireValue::Bool(*v),
        Value::Integer(v) => WireValue::Integer(*v),
        Value::Float(v) => WireValue::Float(*v),
        Value::String(v) => WireValue::String((*v).to_string()),
        Value::Enum(v) => WireValue::String((*v).to_string()),
        Value::Bytes(v) if payload => WireValue::Bytes(v.to_vec()),
        Value::Bytes(v) => WireValue::String(STANDARD.encode(v)),
        Value::Timestamp(t) if payload => WireValue::Float(t.timestamp_millis() as f64 / 1000.0),
        Value::Timestamp(t) => WireValue::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Value::Structured(_) | Value::List(_) | Value::Map(_) => {
            return Err(CodecError::KindMismatch { expected: ValueKind::Scalar, found: value.kind_name() });
        }
    };
    Ok(Some(rendered))
}
