//! # Request Sink
//!
//! Collects marshalled fields and assembles them into an HTTP request.
//!
//! ## Layout
//!
//! - **Path** fields fill the `{label}` segments of the operation's URI template.
//! - **Query** fields become form-encoded query pairs, in write order.
//! - **Header** fields become request headers, replacing configured defaults.
//! - **Payload** fields are written into one `wirepack` map, the request body.
//!   Nested structures become nested maps. A scalar payload root replaces the
//!   body with its raw bytes and must be the only payload write.

use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use http::header;
use wirebind::Location;
use wirebind::Sink;
use wirebind::WireValue;
use wirepack::Encoder;

use crate::client::Operation;
use crate::config::ClientConfig;

pub const PAYLOAD_CONTENT_TYPE: &str = "application/x-wirepack";
pub const TARGET_HEADER: &str = "x-target";

#[derive(Debug)]
pub enum RequestError {
    /// A nested structure tried to write outside the payload.
    LocationNotAllowed { name: String, location: Location },
    /// The URI template names a label no field filled.
    MissingPathLabel(String),
    /// A path field has no matching label in the URI template.
    UnknownPathLabel(String),
    InvalidHeader { name: String, reason: String },
    /// A payload root was written twice, or mixed with payload fields.
    PayloadRootConflict(String),
    /// The endpoint cannot carry path segments.
    InvalidEndpoint,
    Payload(wirepack::Error),
    Http(http::Error),
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocationNotAllowed { name, location } => {
                write!(f, "field '{}' cannot be written at {:?} inside a nested structure", name, location)
            }
            Self::MissingPathLabel(label) => write!(f, "no value for path label '{}'", label),
            Self::UnknownPathLabel(label) => write!(f, "path label '{}' is not in the URI template", label),
            Self::InvalidHeader { name, reason } => write!(f, "invalid header '{}': {}", name, reason),
            Self::PayloadRootConflict(name) => {
                write!(f, "payload root '{}' must be the only write to the payload", name)
            }
            Self::InvalidEndpoint => write!(f, "endpoint cannot take a path"),
            Self::Payload(e) => write!(f, "payload encoding failed: {}", e),
            Self::Http(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Payload(e) => Some(e),
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wirepack::Error> for RequestError {
    fn from(e: wirepack::Error) -> Self {
        Self::Payload(e)
    }
}

impl From<http::Error> for RequestError {
    fn from(e: http::Error) -> Self {
        Self::Http(e)
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;

/// A [`Sink`] that builds the HTTP request of one operation call.
pub struct RequestSink<'c> {
    config: &'c ClientConfig,
    operation: &'c Operation,
    labels: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    payload: Encoder,
    has_fields: bool,
    root_written: bool,
    raw_body: Option<Vec<u8>>,
}

impl<'c> RequestSink<'c> {
    pub fn new(config: &'c ClientConfig, operation: &'c Operation) -> Result<Self> {
        let mut payload = Encoder::new();
        payload.map_begin()?;
        Ok(Self {
            config,
            operation,
            labels: Vec::new(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            payload,
            has_fields: false,
            root_written: false,
            raw_body: None,
        })
    }

    /// Assembles the request.
    pub fn build(mut self) -> Result<http::Request<Vec<u8>>> {
        let url = self.url()?;

        let mut headers = self.config.headers().clone();
        headers.insert(header::USER_AGENT, header_value(header::USER_AGENT.as_str(), self.config.agent())?);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(PAYLOAD_CONTENT_TYPE));
        if let Some(target) = self.config.target(self.operation.name) {
            headers.insert(HeaderName::from_static(TARGET_HEADER), header_value(TARGET_HEADER, &target)?);
        }
        // bound headers replace defaults of the same name
        headers.extend(std::mem::take(&mut self.headers));

        self.payload.map_end()?;
        let body = match self.raw_body {
            Some(raw) => raw,
            None => self.payload.into_bytes()?,
        };

        let mut request = http::Request::builder()
            .method(self.operation.method.clone())
            .uri(url.as_str())
            .body(body)?;
        *request.headers_mut() = headers;
        Ok(request)
    }

    fn url(&self) -> Result<url::Url> {
        let mut url = self.config.endpoint().clone();
        let template = self.operation.uri.trim_start_matches('/');

        for (label, _) in &self.labels {
            if !template.split('/').any(|segment| label_of(segment) == Some(label.as_str())) {
                return Err(RequestError::UnknownPathLabel(label.clone()));
            }
        }

        {
            let mut segments = url.path_segments_mut().map_err(|()| RequestError::InvalidEndpoint)?;
            segments.pop_if_empty();
            for segment in template.split('/').filter(|s| !s.is_empty()) {
                match label_of(segment) {
                    Some(label) => {
                        let value = self
                            .labels
                            .iter()
                            .find(|(name, _)| name == label)
                            .map(|(_, value)| value.as_str())
                            .ok_or_else(|| RequestError::MissingPathLabel(label.to_string()))?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

fn label_of(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| RequestError::InvalidHeader { name: name.to_string(), reason: e.to_string() })
}

fn write_value(encoder: &mut Encoder, value: &WireValue) -> wirepack::Result<()> {
    match value {
        WireValue::Null => encoder.null(),
        WireValue::Bool(v) => encoder.bool(*v),
        WireValue::Integer(v) => encoder.int(*v),
        WireValue::Float(v) => encoder.float(*v),
        WireValue::String(v) => encoder.str(v),
        WireValue::Bytes(v) => encoder.bytes(v),
    }
}

fn write_field(encoder: &mut Encoder, name: &str, value: &WireValue) -> Result<()> {
    encoder.field_begin(name)?;
    write_value(encoder, value)?;
    encoder.field_end()?;
    Ok(())
}

fn open_nested<'a>(encoder: &'a mut Encoder, name: &str) -> Result<PayloadScope<'a>> {
    encoder.field_begin(name)?;
    encoder.map_begin()?;
    Ok(PayloadScope { encoder })
}

impl Sink for RequestSink<'_> {
    type Error = RequestError;
    type Nested<'a>
        = PayloadScope<'a>
    where
        Self: 'a;

    fn set_at(&mut self, location: Location, wire_name: &str, value: WireValue) -> Result<()> {
        match location {
            Location::Path => self.labels.push((wire_name.to_string(), value.to_string())),
            Location::Query => self.query.push((wire_name.to_string(), value.to_string())),
            Location::Header => {
                let name = HeaderName::from_bytes(wire_name.as_bytes()).map_err(|e| RequestError::InvalidHeader {
                    name: wire_name.to_string(),
                    reason: e.to_string(),
                })?;
                let value = header_value(wire_name, &value.to_string())?;
                self.headers.append(name, value);
            }
            Location::PayloadRoot => {
                if self.root_written || self.has_fields {
                    return Err(RequestError::PayloadRootConflict(wire_name.to_string()));
                }
                self.root_written = true;
                self.raw_body = match value {
                    WireValue::Bytes(bytes) => Some(bytes),
                    WireValue::Null => None,
                    other => Some(other.to_string().into_bytes()),
                };
            }
            Location::PayloadField => {
                if self.root_written {
                    return Err(RequestError::PayloadRootConflict(wire_name.to_string()));
                }
                self.has_fields = true;
                write_field(&mut self.payload, wire_name, &value)?;
            }
        }
        Ok(())
    }

    fn begin_structured(&mut self, wire_name: &str) -> Result<PayloadScope<'_>> {
        if self.root_written {
            return Err(RequestError::PayloadRootConflict(wire_name.to_string()));
        }
        self.has_fields = true;
        open_nested(&mut self.payload, wire_name)
    }

    fn finish(self) -> Result<()> {
        Ok(())
    }
}

/// A nested payload map. Only payload fields may be written into it.
pub struct PayloadScope<'a> {
    encoder: &'a mut Encoder,
}

impl<'s> Sink for PayloadScope<'s> {
    type Error = RequestError;
    type Nested<'a>
        = PayloadScope<'a>
    where
        Self: 'a;

    fn set_at(&mut self, location: Location, wire_name: &str, value: WireValue) -> Result<()> {
        if location != Location::PayloadField {
            return Err(RequestError::LocationNotAllowed { name: wire_name.to_string(), location });
        }
        write_field(self.encoder, wire_name, &value)
    }

    fn begin_structured(&mut self, wire_name: &str) -> Result<PayloadScope<'_>> {
        open_nested(self.encoder, wire_name)
    }

    fn finish(self) -> Result<()> {
        self.encoder.map_end()?;
        self.encoder.field_end()?;
        Ok(())
    }
}
