//! # Response Unmarshalling
//!
//! Reads operation outputs out of a decoded `wirepack` document.
//!
//! Missing and null members both read as `None`. A member of the wrong type is
//! an error, never a silent default.

use chrono::DateTime;
use chrono::Utc;
use wirebind::UnknownVariantError;
use wirebind::WireEnum;
use wirepack::Document;

#[derive(Debug)]
pub enum UnmarshallError {
    Payload(wirepack::Error),
    /// A member holds a different type than the output declares.
    WrongType { member: String, expected: &'static str },
    /// A required member is missing or null.
    Missing(&'static str),
    Vocabulary(UnknownVariantError),
}

impl std::fmt::Display for UnmarshallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Payload(e) => write!(f, "malformed payload: {}", e),
            Self::WrongType { member, expected } => write!(f, "member '{}' is not a {}", member, expected),
            Self::Missing(member) => write!(f, "required member '{}' is missing", member),
            Self::Vocabulary(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for UnmarshallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Payload(e) => Some(e),
            Self::Vocabulary(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wirepack::Error> for UnmarshallError {
    fn from(e: wirepack::Error) -> Self {
        Self::Payload(e)
    }
}

impl From<UnknownVariantError> for UnmarshallError {
    fn from(e: UnknownVariantError) -> Self {
        Self::Vocabulary(e)
    }
}

pub type Result<T> = std::result::Result<T, UnmarshallError>;

/// An operation output that can be read from a response document.
pub trait Unmarshall: Sized {
    fn unmarshall(document: &Document) -> Result<Self>;
}

/// Operations without output ignore the body.
impl Unmarshall for () {
    fn unmarshall(_: &Document) -> Result<Self> {
        Ok(())
    }
}

/// Decodes a response body. An empty body is a null document.
pub fn decode(body: &[u8]) -> Result<Document> {
    if body.is_empty() {
        return Ok(Document::Null);
    }
    Ok(Document::decode(body)?)
}

fn member<'d>(document: &'d Document, name: &str) -> Option<&'d Document> {
    document.get(name).filter(|d| !d.is_null())
}

fn typed<'d, T>(
    document: &'d Document,
    name: &str,
    expected: &'static str,
    read: impl FnOnce(&'d Document) -> Option<T>,
) -> Result<Option<T>> {
    match member(document, name) {
        None => Ok(None),
        Some(d) => read(d).map(Some).ok_or_else(|| UnmarshallError::WrongType { member: name.to_string(), expected }),
    }
}

pub fn string(document: &Document, name: &str) -> Result<Option<String>> {
    typed(document, name, "string", |d| d.as_str().map(str::to_string))
}

pub fn integer(document: &Document, name: &str) -> Result<Option<i64>> {
    typed(document, name, "integer", Document::as_int)
}

pub fn boolean(document: &Document, name: &str) -> Result<Option<bool>> {
    typed(document, name, "boolean", Document::as_bool)
}

/// Timestamps travel as fractional epoch seconds.
pub fn timestamp(document: &Document, name: &str) -> Result<Option<DateTime<Utc>>> {
    typed(document, name, "timestamp", |d| {
        let millis = (d.as_float()? * 1000.0).round() as i64;
        DateTime::from_timestamp_millis(millis)
    })
}

pub fn enumeration<T: WireEnum>(document: &Document, name: &str) -> Result<Option<T>> {
    match string(document, name)? {
        Some(wire) => Ok(Some(T::from_wire(&wire)?)),
        None => Ok(None),
    }
}

pub fn structure<T: Unmarshall>(document: &Document, name: &str) -> Result<Option<T>> {
    match member(document, name) {
        Some(d) => Ok(Some(T::unmarshall(d)?)),
        None => Ok(None),
    }
}

pub fn list<T: Unmarshall>(document: &Document, name: &str) -> Result<Option<Vec<T>>> {
    let Some(items) = typed(document, name, "list", Document::as_list)? else {
        return Ok(None);
    };
    items.iter().map(T::unmarshall).collect::<Result<Vec<_>>>().map(Some)
}

/// Turns an optional member into a required one.
pub fn required<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(UnmarshallError::Missing(name))
}
