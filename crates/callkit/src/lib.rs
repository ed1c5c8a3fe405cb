//! # Callkit
//!
//! Service clients built from bound request models.
//!
//! ## Architecture
//!
//! - [`Client`] performs one call synchronously: the request model is marshalled
//!   into a [`RequestSink`](request::RequestSink), the resulting HTTP request goes
//!   through a [`Transport`], and the response becomes the operation's output or
//!   a [`ClientError`].
//! - [`AsyncClient`] submits the same call to a shared
//!   [`Dispatcher`](dispatch::Dispatcher) and returns its handle at once.
//! - [`workflow`] declares a sample service on top of both.

pub mod async_client;
pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod request;
pub mod transport;
pub mod unmarshall;
pub mod workflow;


pub use async_client::AsyncClient;
pub use async_client::Call;
pub use client::Client;
pub use client::Operation;
pub use config::ClientConfig;
pub use error::ClientError;
pub use transport::Transport;
pub use transport::TransportError;
pub use unmarshall::Unmarshall;
