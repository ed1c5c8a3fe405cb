//! # Async Client
//!
//! Runs client calls on a shared [`Dispatcher`]. Each call owns its request
//! model and is submitted as one unit of marshal, send and unmarshal; the
//! caller gets a [`Handle`] back immediately.

use std::sync::Arc;

use dispatch::Dispatcher;
use dispatch::Handle;
use dispatch::Outcome;
use tracing::debug;
use wirebind::Structured;

use crate::client::Client;
use crate::client::Operation;
use crate::error::ClientError;
use crate::error::Result;
use crate::unmarshall::Unmarshall;

/// A call in flight. Fails with the same `ClientError` the sync call would return.
pub type Call<O> = Handle<O, ClientError>;

#[derive(Debug, Clone)]
pub struct AsyncClient {
    client: Client,
    dispatcher: Arc<Dispatcher>,
}

impl AsyncClient {
    pub fn new(client: Client, dispatcher: Arc<Dispatcher>) -> Self {
        Self { client, dispatcher }
    }

    /// The synchronous client this one delegates to.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Queues a call of `operation`.
    ///
    /// # Errors
    /// `ClientError::Submit` if the dispatcher refused the call.
    pub fn invoke_async<I, O>(&self, operation: &'static Operation, input: I) -> Result<Call<O>>
    where
        I: Structured + Send + 'static,
        O: Unmarshall + Send + 'static,
    {
        let client = self.client.clone();
        let handle = self.dispatcher.submit(move || client.invoke::<I, O>(operation, Some(&input)))?;
        debug!(operation = operation.name, id = handle.id(), "call queued");
        Ok(handle)
    }

    /// Queues a call and notifies `callback` with its outcome.
    pub fn invoke_async_with<I, O, C>(&self, operation: &'static Operation, input: I, callback: C) -> Result<Call<O>>
    where
        I: Structured + Send + 'static,
        O: Unmarshall + Send + 'static,
        C: FnOnce(&Outcome<O, ClientError>) + Send + 'static,
    {
        let client = self.client.clone();
        let handle = self
            .dispatcher
            .submit_with(move || client.invoke::<I, O>(operation, Some(&input)), callback)?;
        debug!(operation = operation.name, id = handle.id(), "call queued");
        Ok(handle)
    }

    /// Shuts the shared dispatcher down; see [`Dispatcher::shutdown`].
    pub fn shutdown(&self) -> usize {
        self.dispatcher.shutdown()
    }
}
