//! Owned document tree, used when a payload must outlive its buffer.

use std::collections::BTreeMap;

use crate::Decoder;
use crate::Encoder;
use crate::Error;
use crate::Result;
use crate::Tag;

/// The maximum nesting depth accepted when building a `Document`.
pub const MAX_DEPTH: usize = 64;

/// A fully decoded payload item.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Document>),
    Map(BTreeMap<String, Document>),
}

impl Document {
    /// Decodes a complete buffer holding exactly one item.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let doc = Self::read(&mut dec, 0)?;
        if dec.remaining() != 0 {
            return Err(Error::TrailingBytes(dec.remaining()));
        }
        Ok(doc)
    }

    fn read(dec: &mut Decoder<'_>, depth: usize) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(Error::TooDeep);
        }
        let doc = match dec.peek_tag()? {
            Tag::Null => { dec.null()?; Document::Null }
            Tag::True | Tag::False => Document::Bool(dec.bool()?),
            Tag::Int => Document::Int(dec.int()?),
            Tag::Float => Document::Float(dec.float()?),
            Tag::String => Document::String(dec.str()?.to_string()),
            Tag::Bytes => Document::Bytes(dec.bytes()?.to_vec()),
            Tag::List => {
                let mut items = Vec::new();
                for item in dec.list()? {
                    let mut item = item?;
                    items.push(Self::read(&mut item, depth + 1)?);
                }
                Document::List(items)
            }
            Tag::Map => {
                let mut fields = BTreeMap::new();
                for field in dec.map()? {
                    let (name, mut value) = field?;
                    let value = Self::read(&mut value, depth + 1)?;
                    if fields.insert(name.to_string(), value).is_some() {
                        return Err(Error::DuplicateField(name.to_string()));
                    }
                }
                Document::Map(fields)
            }
            found => return Err(Error::UnexpectedTag { expected: Tag::Map, found }),
        };
        Ok(doc)
    }

    /// Encodes this document as a single item.
    pub fn encode(&self, enc: &mut Encoder) -> Result<()> {
        match self {
            Document::Null => enc.null(),
            Document::Bool(v) => enc.bool(*v),
            Document::Int(v) => enc.int(*v),
            Document::Float(v) => enc.float(*v),
            Document::String(v) => enc.str(v),
            Document::Bytes(v) => enc.bytes(v),
            Document::List(items) => {
                enc.list_begin()?;
                for item in items {
                    item.encode(enc)?;
                }
                enc.list_end()
            }
            Document::Map(fields) => {
                enc.map_begin()?;
                for (name, value) in fields {
                    enc.field_begin(name)?;
                    value.encode(enc)?;
                    enc.field_end()?;
                }
                enc.map_end()
            }
        }
    }

    /// Encodes this document into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut enc = Encoder::new();
        self.encode(&mut enc)?;
        enc.into_bytes()
    }

    /// Looks up a field of a map document.
    pub fn get(&self, name: &str) -> Option<&Document> {
        match self {
            Document::Map(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Document::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Document::Float(v) => Some(*v),
            Document::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Document]> {
        match self {
            Document::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }
}
