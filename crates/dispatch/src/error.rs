//! Error types for building pools, submitting work and reading outcomes.

#[derive(Debug)]
pub enum DispatchError {
    /// The configuration was rejected.
    InvalidConfig(&'static str),
    /// The worker runtime could not be started.
    Runtime(std::io::Error),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(reason) => write!(f, "invalid dispatcher configuration: {}", reason),
            Self::Runtime(e) => write!(f, "failed to start worker runtime: {}", e),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Runtime(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<std::io::Error> for DispatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Runtime(e)
    }
}

/// Why a submission was refused. The operation was not enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The dispatcher was shut down or is draining.
    ShutDown,
    /// `limit` unstarted operations are already waiting.
    QueueFull { limit: usize },
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShutDown => write!(f, "dispatcher is shut down"),
            Self::QueueFull { limit } => write!(f, "dispatch queue is full ({} waiting)", limit),
        }
    }
}

impl std::error::Error for SubmitError {}

/// A non-successful outcome, as an error.
///
/// `Failed` carries the operation's own error untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationError<E> {
    Failed(E),
    Cancelled,
    Panicked(String),
}

impl<E> InvocationError<E> {
    /// The operation's own error, if it returned one.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for InvocationError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "{}", e),
            Self::Cancelled => write!(f, "operation was cancelled"),
            Self::Panicked(message) => write!(f, "operation panicked: {}", message),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for InvocationError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Failed(e) => e.source(),
            _ => None,
        }
    }
}
