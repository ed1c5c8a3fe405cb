//! Scope-tracking encoder.

use crate::Error;
use crate::Result;
use crate::Scope;
use crate::Tag;

/// An open container on the encoder stack.
struct Frame {
    /// Offset of the first body byte (just past the length placeholder).
    start: usize,
    scope: Scope,
    count: usize,
    /// Field name, kept for error reporting.
    name: Option<String>,
}

impl Frame {
    fn root() -> Self {
        Self { start: 0, scope: Scope::Root, count: 0, name: None }
    }
}

/// A bounded, state-machine driven encoder.
///
/// The encoder keeps a stack of open scopes, validates every write against
/// the innermost one and back-patches container lengths when a scope closes.
///
/// # Structural Invariants
///
/// 1. **Map scopes** accept only `field_begin()` entries.
/// 2. **Field scopes** accept exactly one item; closing an empty field fails.
/// 3. **Root scope**: bytes can only be taken once every scope is closed.
pub struct Encoder {
    buf: Vec<u8>,
    top: Frame,
    parents: Vec<Frame>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Creates a new encoder with default capacity.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(256),
            top: Frame::root(),
            parents: Vec::with_capacity(8),
        }
    }

    /// Number of open scopes above the root.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// The innermost open scope.
    pub fn scope(&self) -> Scope {
        self.top.scope
    }

    /// Consumes the encoder and returns the encoded bytes.
    ///
    /// # Errors
    /// Returns `Error::ScopeStillOpen` if any scope is still open.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if !self.parents.is_empty() {
            return Err(Error::ScopeStillOpen);
        }
        Ok(self.buf)
    }

    fn check_write(&self, tag: Tag) -> Result<()> {
        match self.top.scope {
            Scope::Root | Scope::List => Ok(()),
            Scope::Map if tag == Tag::Field => Ok(()),
            Scope::Map => Err(Error::InvalidMapEntry),
            Scope::Field if self.top.count >= 1 => Err(Error::TooManyItems),
            Scope::Field => Ok(()),
        }
    }

    fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.check_write(tag)?;
        self.buf.push(tag as u8);
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| Error::BlobTooLarge(len))?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        Ok(())
    }

    fn begin_scope(&mut self, tag: Tag, scope: Scope, name: Option<String>) -> Result<()> {
        self.write_tag(tag)?;
        self.buf.extend_from_slice(&[0, 0, 0, 0]); // length placeholder

        let frame = Frame { start: self.buf.len(), scope, count: 0, name };
        self.parents.push(std::mem::replace(&mut self.top, frame));
        Ok(())
    }

    fn end_scope(&mut self, expected: Scope) -> Result<()> {
        if self.top.scope != expected {
            if self.parents.is_empty() {
                return Err(Error::ScopeUnderflow);
            }
            return Err(Error::ScopeMismatch { expected, actual: self.top.scope });
        }
        if expected == Scope::Field && self.top.count == 0 {
            return Err(Error::EmptyField(self.top.name.clone().unwrap_or_default()));
        }
        let Some(parent) = self.parents.pop() else {
            return Err(Error::ScopeUnderflow);
        };
        let frame = std::mem::replace(&mut self.top, parent);

        let body_len = self.buf.len() - frame.start;
        let len = u32::try_from(body_len).map_err(|_| Error::BlobTooLarge(body_len))?;
        self.buf[frame.start - 4..frame.start].copy_from_slice(&len.to_le_bytes());

        self.top.count += 1;
        Ok(())
    }

    /// Encodes an explicit null.
    pub fn null(&mut self) -> Result<()> { self.write_tag(Tag::Null)?; self.top.count += 1; Ok(()) }

    /// Encodes a boolean.
    pub fn bool(&mut self, v: bool) -> Result<()> {
        self.write_tag(if v { Tag::True } else { Tag::False })?;
        self.top.count += 1;
        Ok(())
    }

    /// Encodes a signed 64-bit integer (LE).
    pub fn int(&mut self, v: i64) -> Result<()> {
        self.write_tag(Tag::Int)?;
        self.buf.extend_from_slice(&v.to_le_bytes());
        self.top.count += 1;
        Ok(())
    }

    /// Encodes a 64-bit float (LE).
    pub fn float(&mut self, v: f64) -> Result<()> {
        self.write_tag(Tag::Float)?;
        self.buf.extend_from_slice(&v.to_le_bytes());
        self.top.count += 1;
        Ok(())
    }

    /// Encodes a UTF-8 string blob.
    pub fn str(&mut self, v: &str) -> Result<()> {
        self.blob(Tag::String, v.as_bytes())
    }

    /// Encodes a raw byte blob.
    pub fn bytes(&mut self, v: &[u8]) -> Result<()> {
        self.blob(Tag::Bytes, v)
    }

    fn blob(&mut self, tag: Tag, v: &[u8]) -> Result<()> {
        if v.len() > u32::MAX as usize {
            return Err(Error::BlobTooLarge(v.len()));
        }
        self.write_tag(tag)?;
        self.write_len(v.len())?;
        self.buf.extend_from_slice(v);
        self.top.count += 1;
        Ok(())
    }

    /// Begins a list. Must be closed with `list_end()`.
    pub fn list_begin(&mut self) -> Result<()> { self.begin_scope(Tag::List, Scope::List, None) }
    /// Ends a list.
    pub fn list_end(&mut self) -> Result<()> { self.end_scope(Scope::List) }

    /// Begins a map. Only `field_begin()` is allowed as a direct child.
    pub fn map_begin(&mut self) -> Result<()> { self.begin_scope(Tag::Map, Scope::Map, None) }
    /// Ends a map.
    pub fn map_end(&mut self) -> Result<()> { self.end_scope(Scope::Map) }

    /// Begins a named field.
    ///
    /// Encodes the name immediately; exactly one item (the value) must follow
    /// before `field_end()`.
    pub fn field_begin(&mut self, name: &str) -> Result<()> {
        self.begin_scope(Tag::Field, Scope::Field, Some(name.to_string()))?;
        // the name is metadata, not the field's value
        self.top.scope = Scope::List;
        self.str(name)?;
        self.top.scope = Scope::Field;
        self.top.count = 0;
        Ok(())
    }
    /// Ends a named field.
    pub fn field_end(&mut self) -> Result<()> { self.end_scope(Scope::Field) }
}
