//! Mock transports for tests and demos.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::transport;
use crate::transport::Transport;
use crate::transport::TransportError;

/// A transport that answers from a closure.
pub struct FnTransport<F>
where
    F: Fn(&http::Request<Vec<u8>>) -> transport::Result<http::Response<Vec<u8>>> + Send + Sync,
{
    handler: F,
}

impl<F> FnTransport<F>
where
    F: Fn(&http::Request<Vec<u8>>) -> transport::Result<http::Response<Vec<u8>>> + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> Transport for FnTransport<F>
where
    F: Fn(&http::Request<Vec<u8>>) -> transport::Result<http::Response<Vec<u8>>> + Send + Sync + 'static,
{
    fn invoke(&self, request: http::Request<Vec<u8>>) -> transport::Result<http::Response<Vec<u8>>> {
        (self.handler)(&request)
    }
}

/// A transport that replays queued responses in order and keeps every request it saw.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<transport::Result<http::Response<Vec<u8>>>>>,
    seen: Mutex<Vec<http::Request<Vec<u8>>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with `status` and `body`.
    pub fn reply(self, status: u16, body: Vec<u8>) -> Self {
        let response = http::StatusCode::from_u16(status)
            .map_err(|e| TransportError::Io(e.to_string()))
            .map(|status| {
                let mut response = http::Response::new(body);
                *response.status_mut() = status;
                response
            });
        self.push(response)
    }

    /// Queues a transport failure.
    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: transport::Result<http::Response<Vec<u8>>>) -> Self {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner).push_back(reply);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<http::Request<Vec<u8>>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Transport for ScriptedTransport {
    fn invoke(&self, request: http::Request<Vec<u8>>) -> transport::Result<http::Response<Vec<u8>>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::ConnectionLost("no scripted reply left".into())))
    }
}
