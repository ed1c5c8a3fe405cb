//! Client configuration.

use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_USER_AGENT: &str = concat!("callkit/", env!("CARGO_PKG_VERSION"));

/// Where and how a client sends its requests.
///
/// ```
/// let config = callkit::ClientConfig::new("https://workflow.example.com")?
///     .target_prefix("WorkflowService")
///     .user_agent("demo/1.0");
/// assert_eq!(config.endpoint().host_str(), Some("workflow.example.com"));
/// # Ok::<(), callkit::ClientError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    endpoint: Url,
    target_prefix: Option<String>,
    user_agent: String,
    default_headers: HeaderMap,
}

impl ClientConfig {
    /// Parses and checks the endpoint: an absolute `http` or `https` URL with a host.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ClientError::Configuration(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        Self::with_endpoint(endpoint)
    }

    pub fn with_endpoint(endpoint: Url) -> Result<Self, ClientError> {
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "unsupported endpoint scheme '{}'",
                endpoint.scheme()
            )));
        }
        if endpoint.host_str().is_none() || endpoint.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!("endpoint '{}' has no host", endpoint)));
        }
        Ok(Self {
            endpoint,
            target_prefix: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: HeaderMap::new(),
        })
    }

    /// Service name sent in the target header as `{prefix}.{operation}`.
    pub fn target_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.target_prefix = Some(prefix.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header sent with every request. Bound header fields override it.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.append(name, value);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn target(&self, operation: &str) -> Option<String> {
        self.target_prefix.as_ref().map(|prefix| format!("{}.{}", prefix, operation))
    }

    pub fn agent(&self) -> &str {
        &self.user_agent
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.default_headers
    }
}
