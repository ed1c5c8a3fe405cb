//! Client error taxonomy.

use dispatch::SubmitError;
use wirebind::MarshallingError;

use crate::request::RequestError;
use crate::transport::TransportError;
use crate::unmarshall::UnmarshallError;

/// Everything that can go wrong with one service call.
#[derive(Debug)]
pub enum ClientError {
    /// The client was set up with invalid settings.
    Configuration(String),
    /// The request model could not be marshalled.
    Marshalling(MarshallingError),
    /// The marshalled fields could not form an HTTP request.
    Request(RequestError),
    /// No response was obtained.
    Transport(TransportError),
    /// The service answered with a non-success status.
    Service { status: http::StatusCode, code: String, message: String },
    /// The response payload did not match the expected output.
    Unmarshalling(UnmarshallError),
    /// The async client could not queue the call.
    Submit(SubmitError),
}

impl ClientError {
    /// The service error code, for `Service` errors.
    pub fn service_code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {}", msg),
            Self::Marshalling(e) => write!(f, "unable to marshall request: {}", e),
            Self::Request(e) => write!(f, "unable to build request: {}", e),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Service { status, code, message } => {
                write!(f, "service error {} ({}): {}", code, status, message)
            }
            Self::Unmarshalling(e) => write!(f, "unable to unmarshall response: {}", e),
            Self::Submit(e) => write!(f, "unable to submit call: {}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Marshalling(e) => Some(e),
            Self::Request(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Unmarshalling(e) => Some(e),
            Self::Submit(e) => Some(e),
            Self::Configuration(_) | Self::Service { .. } => None,
        }
    }
}

impl From<MarshallingError> for ClientError {
    fn from(e: MarshallingError) -> Self {
        Self::Marshalling(e)
    }
}

impl From<RequestError> for ClientError {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<UnmarshallError> for ClientError {
    fn from(e: UnmarshallError) -> Self {
        Self::Unmarshalling(e)
    }
}

impl From<SubmitError> for ClientError {
    fn from(e: SubmitError) -> Self {
        Self::Submit(e)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
