//! # Service Client
//!
//! Performs one operation call synchronously: marshal the request model into an
//! HTTP request, hand it to the transport, and map the response to the
//! operation's output or a `ClientError`.

use std::sync::Arc;

use tracing::debug;
use tracing::warn;
use wirebind::MarshallerConfig;
use wirebind::ProtocolMarshaller;
use wirebind::Structured;
use wirepack::Document;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::error::Result;
use crate::request::RequestSink;
use crate::transport::Transport;
use crate::unmarshall;
use crate::unmarshall::Unmarshall;

/// A named service operation and its HTTP route.
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: &'static str,
    pub method: http::Method,
    /// URI template with `{label}` segments filled from path bindings.
    pub uri: &'static str,
}

impl Operation {
    pub const fn new(name: &'static str, method: http::Method, uri: &'static str) -> Self {
        Self { name, method, uri }
    }
}

/// Synchronous client. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    marshaller: ProtocolMarshaller,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("endpoint", &self.config.endpoint().as_str()).finish()
    }
}

impl Client {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config: Arc::new(config), transport, marshaller: ProtocolMarshaller::new() }
    }

    pub fn with_marshaller_config(mut self, config: MarshallerConfig) -> Self {
        self.marshaller = ProtocolMarshaller::with_config(config);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the HTTP request for `input` without sending it.
    pub fn prepare<I: Structured>(&self, operation: &Operation, input: Option<&I>) -> Result<http::Request<Vec<u8>>> {
        let mut sink = RequestSink::new(&self.config, operation)?;
        self.marshaller.marshall(input, &mut sink)?;
        Ok(sink.build()?)
    }

    /// Calls `operation` with `input` and reads its output.
    ///
    /// # Errors
    /// - `Marshalling` if `input` is `None` or cannot be marshalled; nothing is sent.
    /// - `Transport` if no response was obtained.
    /// - `Service` for a non-success status, with the code and message the
    ///   service sent back.
    /// - `Unmarshalling` if a success payload does not fit the output type.
    pub fn invoke<I, O>(&self, operation: &Operation, input: Option<&I>) -> Result<O>
    where
        I: Structured,
        O: Unmarshall,
    {
        let request = self.prepare(operation, input)?;
        debug!(operation = operation.name, uri = %request.uri(), "sending request");

        let response = self.transport.invoke(request)?;
        let status = response.status();
        let body = response.into_body();
        debug!(operation = operation.name, status = status.as_u16(), bytes = body.len(), "received response");

        if !status.is_success() {
            let error = service_error(status, &body);
            warn!(operation = operation.name, error = %error, "service call failed");
            return Err(error);
        }
        Ok(O::unmarshall(&unmarshall::decode(&body)?)?)
    }
}

/// Reads `code` and `message` from an error payload, falling back to the status.
fn service_error(status: http::StatusCode, body: &[u8]) -> ClientError {
    let document = unmarshall::decode(body).unwrap_or(Document::Null);
    let text = |name: &str| document.get(name).and_then(Document::as_str).map(str::to_string);
    ClientError::Service {
        status,
        code: text("code").unwrap_or_else(|| "Unknown".to_string()),
        message: text("message")
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_default(),
    }
}
