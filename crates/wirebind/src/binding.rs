//! # Binding Descriptors
//!
//! Immutable metadata describing where one field lands on the wire.
//!
//! Bindings are built with `const fn`s so that binding tables are plain statics,
//! shared by every invocation. An illegal combination panics during constant
//! evaluation, which turns a bad table into a build failure; `try_new` reports
//! the same rules as a `ConfigurationError` for descriptors built at runtime.
//! Whole tables are checked the same way by [`Shape::validate`].

use crate::error::ConfigurationError;

/// The wire slot a field is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// A `{label}` in the operation's URI template.
    Path,
    /// A query string parameter.
    Query,
    /// A request header.
    Header,
    /// The value is the whole payload.
    PayloadRoot,
    /// A named field inside the payload document.
    PayloadField,
}

impl Location {
    pub const fn is_payload(self) -> bool {
        matches!(self, Location::PayloadRoot | Location::PayloadField)
    }
}

/// The kind of the items in a list or map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Scalar,
    Structured,
}

/// The structural kind of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Rendered to a single wire primitive.
    Scalar,
    /// A nested object, marshalled through its own shape.
    Structured,
    /// Ordered elements, written under `name.1`, `name.2`, ...
    List(ElementKind),
    /// Keyed entries, written under `name.key`.
    Map(ElementKind),
}

impl ValueKind {
    /// Whether the value can be rendered into a path, query or header slot.
    const fn is_scalar_renderable(self) -> bool {
        matches!(
            self,
            ValueKind::Scalar | ValueKind::List(ElementKind::Scalar) | ValueKind::Map(ElementKind::Scalar)
        )
    }
}

/// One field's wire placement and value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    wire_name: &'static str,
    location: Location,
    kind: ValueKind,
    nullable: bool,
}

impl Binding {
    /// Creates a binding.
    ///
    /// # Panics
    /// Panics if the combination is invalid (see [`Binding::try_new`]). In a
    /// `const` or `static` initializer this is a compile-time error.
    pub const fn new(wire_name: &'static str, location: Location, kind: ValueKind) -> Self {
        match check(wire_name, location, kind, false) {
            Ok(()) => {}
            Err(ConfigurationError::EmptyWireName { .. }) => panic!("binding wire name must not be empty"),
            Err(ConfigurationError::KindNotAllowed { .. }) => {
                panic!("binding kind cannot be written at its location")
            }
            Err(_) => panic!("invalid binding"),
        }
        Self { wire_name, location, kind, nullable: false }
    }

    /// Creates a binding, reporting an invalid combination as an error.
    ///
    /// # Errors
    /// - `EmptyWireName` if `wire_name` is empty.
    /// - `KindNotAllowed` if a path slot receives anything but a scalar, a
    ///   query/header slot receives a structured value (directly or as elements),
    ///   or a payload root is a list or map.
    pub const fn try_new(
        wire_name: &'static str,
        location: Location,
        kind: ValueKind,
    ) -> Result<Self, ConfigurationError> {
        match check(wire_name, location, kind, false) {
            Ok(()) => Ok(Self { wire_name, location, kind, nullable: false }),
            Err(e) => Err(e),
        }
    }

    /// A scalar at any location.
    pub const fn scalar(wire_name: &'static str, location: Location) -> Self {
        Self::new(wire_name, location, ValueKind::Scalar)
    }

    /// A nested structure inside the payload.
    pub const fn structured(wire_name: &'static str) -> Self {
        Self::new(wire_name, Location::PayloadField, ValueKind::Structured)
    }

    /// A list at any location that accepts its element kind.
    pub const fn list(wire_name: &'static str, location: Location, element: ElementKind) -> Self {
        Self::new(wire_name, location, ValueKind::List(element))
    }

    /// A map at any location that accepts its element kind.
    pub const fn map(wire_name: &'static str, location: Location, element: ElementKind) -> Self {
        Self::new(wire_name, location, ValueKind::Map(element))
    }

    /// Marks the field as nullable: when absent an explicit null is written.
    ///
    /// # Panics
    /// Panics unless the binding is a payload field.
    pub const fn nullable(self) -> Self {
        match self.try_nullable() {
            Ok(b) => b,
            Err(_) => panic!("only payload fields can be nullable"),
        }
    }

    /// Fallible form of [`Binding::nullable`].
    pub const fn try_nullable(self) -> Result<Self, ConfigurationError> {
        match check(self.wire_name, self.location, self.kind, true) {
            Ok(()) => Ok(Self { nullable: true, ..self }),
            Err(e) => Err(e),
        }
    }

    pub const fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    pub const fn location(&self) -> Location {
        self.location
    }

    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }
}

const fn check(
    wire_name: &'static str,
    location: Location,
    kind: ValueKind,
    nullable: bool,
) -> Result<(), ConfigurationError> {
    if wire_name.is_empty() {
        return Err(ConfigurationError::EmptyWireName { location });
    }
    let allowed = match location {
        Location::Path => matches!(kind, ValueKind::Scalar),
        Location::Query | Location::Header => kind.is_scalar_renderable(),
        // the root is the whole body: one scalar or one structure
        Location::PayloadRoot => matches!(kind, ValueKind::Scalar | ValueKind::Structured),
        Location::PayloadField => true,
    };
    if !allowed {
        return Err(ConfigurationError::KindNotAllowed { wire_name, location, kind });
    }
    if nullable && !matches!(location, Location::PayloadField) {
        return Err(ConfigurationError::NullableOutsidePayload { wire_name, location });
    }
    Ok(())
}

/// The ordered binding table of one structured type.
///
/// Field order is the declared order of `fields`; the marshaller never
/// reorders it.
#[derive(Debug, PartialEq, Eq)]
pub struct Shape {
    name: &'static str,
    fields: &'static [Binding],
}

impl Shape {
    pub const fn new(name: &'static str, fields: &'static [Binding]) -> Self {
        Self { name, fields }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn fields(&self) -> &'static [Binding] {
        self.fields
    }

    /// Checks the table as a whole. `structured!` runs this during constant
    /// evaluation, and the marshaller runs it again before the first write.
    ///
    /// # Errors
    /// - `DuplicateWireName` if two fields share a wire name at the same location.
    /// - `ConflictingPayloadRoot` if a payload-root field coexists with another
    ///   payload-root or payload-field binding.
    pub const fn validate(&self) -> Result<(), ConfigurationError> {
        let fields = self.fields;
        let mut root: Option<&'static str> = None;
        let mut has_fields = false;

        let mut i = 0;
        while i < fields.len() {
            let a = &fields[i];
            let mut j = i + 1;
            while j < fields.len() {
                let b = &fields[j];
                if a.location as u8 == b.location as u8 && str_eq(a.wire_name, b.wire_name) {
                    return Err(ConfigurationError::DuplicateWireName {
                        shape: self.name,
                        wire_name: b.wire_name,
                        location: b.location,
                    });
                }
                j += 1;
            }
            match a.location {
                Location::PayloadRoot => {
                    if root.is_some() {
                        return Err(ConfigurationError::ConflictingPayloadRoot { shape: self.name, wire_name: a.wire_name });
                    }
                    root = Some(a.wire_name);
                }
                Location::PayloadField => has_fields = true,
                _ => {}
            }
            i += 1;
        }

        if let (Some(wire_name), true) = (root, has_fields) {
            return Err(ConfigurationError::ConflictingPayloadRoot { shape: self.name, wire_name });
        }
        Ok(())
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
