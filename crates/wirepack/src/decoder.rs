//! Zero-copy, bounds-checked reader.

use crate::Error;
use crate::Result;
use crate::Tag;

/// A zero-copy cursor over an encoded buffer.
///
/// Reading advances the cursor. Container reads return new decoders (or
/// iterators) restricted to the container's body, so a malformed child can
/// never read past its parent.
///
/// # Errors
/// All reads return `Error::UnexpectedEnd` if the buffer is exhausted.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over the slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Peeks the next tag without advancing.
    pub fn peek_tag(&self) -> Result<Tag> {
        let Some(&b) = self.buf.first() else {
            return Err(Error::UnexpectedEnd);
        };
        Tag::from_u8(b).ok_or(Error::InvalidTag(b))
    }

    fn consume(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.buf.len() {
            return Err(Error::UnexpectedEnd);
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_len(&mut self) -> Result<usize> {
        Ok(u32::from_le_bytes(self.read_array()?) as usize)
    }

    fn expect_tag(&mut self, expected: Tag) -> Result<()> {
        let found = self.peek_tag()?;
        if found != expected {
            return Err(Error::UnexpectedTag { expected, found });
        }
        self.consume(1)
    }

    /// Skips the next item and everything nested in it.
    pub fn skip(&mut self) -> Result<()> {
        let tag = self.peek_tag()?;
        self.consume(1)?;
        match tag {
            Tag::Null | Tag::True | Tag::False => Ok(()),
            Tag::Int | Tag::Float => self.consume(8),
            Tag::String | Tag::Bytes | Tag::List | Tag::Map | Tag::Field => {
                let len = self.read_len()?;
                self.consume(len)
            }
        }
    }

    /// Decodes an explicit null.
    pub fn null(&mut self) -> Result<()> { self.expect_tag(Tag::Null) }

    /// Decodes a bool.
    pub fn bool(&mut self) -> Result<bool> {
        match self.peek_tag()? {
            Tag::True => { self.consume(1)?; Ok(true) }
            Tag::False => { self.consume(1)?; Ok(false) }
            found => Err(Error::UnexpectedTag { expected: Tag::True, found }),
        }
    }

    /// Decodes a signed 64-bit integer.
    pub fn int(&mut self) -> Result<i64> { self.expect_tag(Tag::Int)?; Ok(i64::from_le_bytes(self.read_array()?)) }

    /// Decodes a 64-bit float.
    pub fn float(&mut self) -> Result<f64> { self.expect_tag(Tag::Float)?; Ok(f64::from_le_bytes(self.read_array()?)) }

    /// Decodes a string slice.
    pub fn str(&mut self) -> Result<&'a str> {
        self.expect_tag(Tag::String)?;
        let len = self.read_len()?;
        std::str::from_utf8(self.read_bytes(len)?).map_err(|_| Error::InvalidUtf8)
    }

    /// Decodes a byte slice.
    pub fn bytes(&mut self) -> Result<&'a [u8]> {
        self.expect_tag(Tag::Bytes)?;
        let len = self.read_len()?;
        self.read_bytes(len)
    }

    fn enter(&mut self, expected: Tag) -> Result<Decoder<'a>> {
        self.expect_tag(expected)?;
        let len = self.read_len()?;
        Ok(Decoder::new(self.read_bytes(len)?))
    }

    /// Decodes a list into an iterator over item decoders.
    pub fn list(&mut self) -> Result<ListIter<'a>> {
        Ok(ListIter { dec: self.enter(Tag::List)? })
    }

    /// Decodes a map into an iterator over `(name, value decoder)` pairs.
    pub fn map(&mut self) -> Result<FieldIter<'a>> {
        Ok(FieldIter { dec: self.enter(Tag::Map)? })
    }

    /// Decodes a single named field.
    pub fn field(&mut self) -> Result<(&'a str, Decoder<'a>)> {
        let mut inner = self.enter(Tag::Field)?;
        let name = inner.str()?;
        Ok((name, inner))
    }
}

/// Iterator over the items of a list.
#[derive(Debug)]
pub struct ListIter<'a> {
    dec: Decoder<'a>,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = Result<Decoder<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.dec.remaining() == 0 {
            return None;
        }
        let mut probe = self.dec.clone();
        if let Err(e) = probe.skip() {
            self.dec = Decoder::new(&[]);
            return Some(Err(e));
        }
        let len = self.dec.remaining() - probe.remaining();
        Some(self.dec.read_bytes(len).map(Decoder::new))
    }
}

/// Iterator over the fields of a map.
#[derive(Debug)]
pub struct FieldIter<'a> {
    dec: Decoder<'a>,
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Result<(&'a str, Decoder<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.dec.remaining() == 0 {
            return None;
        }
        let item = self.dec.field();
        if item.is_err() {
            self.dec = Decoder::new(&[]);
        }
        Some(item)
    }
}
