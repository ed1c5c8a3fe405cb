//! # Transport Abstraction
//!
//! A minimal, blocking interface for exchanging one HTTP request for one response.
//!
//! ## Philosophy
//!
//! - **Message-Oriented**: the transport moves complete requests and responses. It
//!   knows nothing about bindings, payload formats or service errors.
//! - **Blocking**: an invocation holds its thread until the exchange is over. The
//!   async client gets concurrency from the dispatcher, not from the transport.

use std::fmt;

/// Errors that occur at the network/transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint is unreachable or the connection was dropped.
    ConnectionLost(String),
    /// No response arrived in time.
    Timeout,
    /// The endpoint rejected the request size.
    PayloadTooLarge,
    /// Generic I/O error or internal transport failure.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionLost(msg) => write!(f, "connection lost: {}", msg),
            Self::Timeout => write!(f, "request timed out"),
            Self::PayloadTooLarge => write!(f, "payload too large for transport"),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Sends a request and waits for its response.
///
/// Object-safe, shared as `Arc<dyn Transport>` across worker threads.
pub trait Transport: Send + Sync + 'static {
    /// # Invariants
    /// - Any response the endpoint produced, whatever its status, is `Ok`.
    /// - `Err` means no response was obtained.
    fn invoke(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>>;
}
