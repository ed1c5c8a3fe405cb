//! # Wirepack
//!
//! The payload format carried in request and response bodies.
//!
//! ## Philosophy
//!
//! - **TLV Architecture**: `[Tag][Length?][Value]` so a reader can skip fields it does not know.
//! - **Keyed Documents**: Payloads are maps of named fields, the shape the marshaller writes.
//! - **Bounded**: The encoder tracks its open scopes explicitly. The decoder is a zero-copy,
//!   bounds-checked view; the owned `Document` tree caps nesting depth.
//!
//! ## Format
//!
//! - **Scalars**: `[Tag: 1b][Data: N]`
//! - **Blobs**: `[Tag: 1b][Len: 4b][Data: Len]`
//! - **Containers**: `[Tag: 1b][Len: 4b][Body: Len]`
//! - **Fields**: a container whose body is `[String name][exactly one item]`
//!
//! All integers are Little-Endian.

mod decoder;
mod document;
mod encoder;

#[cfg(test)]
mod tests;

pub use decoder::Decoder;
pub use decoder::FieldIter;
pub use decoder::ListIter;
pub use document::Document;
pub use document::MAX_DEPTH;
pub use encoder::Encoder;

/// Wirepack encoding and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Byte does not correspond to a valid `Tag`.
    InvalidTag(u8),
    /// Expected one tag, found another.
    UnexpectedTag { expected: Tag, found: Tag },
    /// String data is not valid UTF-8.
    InvalidUtf8,
    /// Closing a scope that does not match the active scope.
    ScopeMismatch { expected: Scope, actual: Scope },
    /// Attempted to close a scope when only the root remains.
    ScopeUnderflow,
    /// Attempted to finalize the buffer with open scopes.
    ScopeStillOpen,
    /// Buffer exhausted while reading.
    UnexpectedEnd,
    /// Blob or container length exceeds `u32::MAX`.
    BlobTooLarge(usize),
    /// A field scope received a second item.
    TooManyItems,
    /// A field scope was closed without its value.
    EmptyField(String),
    /// Only fields may be written directly into a map.
    InvalidMapEntry,
    /// The same field name appeared twice in one map.
    DuplicateField(String),
    /// Nesting exceeded `MAX_DEPTH` while building a `Document`.
    TooDeep,
    /// Bytes left over after the top-level item.
    TrailingBytes(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidTag(b) => write!(f, "invalid tag byte: {:#04x}", b),
            Error::UnexpectedTag { expected, found } => {
                write!(f, "unexpected tag: expected {:?}, found {:?}", expected, found)
            }
            Error::ScopeMismatch { expected, actual } => {
                write!(f, "scope mismatch: expected {:?}, found {:?}", expected, actual)
            }
            Error::EmptyField(name) => write!(f, "field '{}' closed without a value", name),
            Error::DuplicateField(name) => write!(f, "field '{}' appears more than once", name),
            Error::TooDeep => write!(f, "document nested deeper than {} levels", MAX_DEPTH),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for Error {}

/// Specialized `Result` for wirepack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Identifies the type of an encoded item.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Explicit null (written for nullable fields only).
    Null = 0x00,
    True = 0x01,
    False = 0x02,
    Int = 0x03,
    Float = 0x04,

    // Blobs (Tag + u32 Len + Bytes)
    String = 0x10,
    Bytes = 0x11,

    // Containers (Tag + u32 Len + Body)
    List = 0x20,
    Map = 0x21,
    Field = 0x22,
}

impl Tag {
    /// Returns the Tag for a given byte, or `None` if invalid.
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(Tag::Null),
            0x01 => Some(Tag::True),
            0x02 => Some(Tag::False),
            0x03 => Some(Tag::Int),
            0x04 => Some(Tag::Float),
            0x10 => Some(Tag::String),
            0x11 => Some(Tag::Bytes),
            0x20 => Some(Tag::List),
            0x21 => Some(Tag::Map),
            0x22 => Some(Tag::Field),
            _ => None,
        }
    }
}

/// Container kinds tracked on the `Encoder` stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The virtual root; allows any item.
    Root,
    /// Ordered sequence; allows any number of items.
    List,
    /// Keyed document; allows only `Field` entries.
    Map,
    /// Named entry; allows exactly one item after the name.
    Field,
}
