use crate::error::DispatchError;

/// Worker pool settings.
///
/// ```
/// let config = dispatch::DispatcherConfig::new().workers(2).max_queued(64);
/// assert_eq!(config.worker_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    workers: usize,
    max_queued: Option<usize>,
    thread_name: String,
}

impl DispatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations that may run at the same time.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Maximum number of submitted but unstarted operations. Unbounded by default.
    pub fn max_queued(mut self, max_queued: usize) -> Self {
        self.max_queued = Some(max_queued);
        self
    }

    /// Name prefix of the pool's threads.
    pub fn thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    pub fn queue_limit(&self) -> Option<usize> {
        self.max_queued
    }

    pub fn name(&self) -> &str {
        &self.thread_name
    }

    pub(crate) fn validate(&self) -> Result<(), DispatchError> {
        if self.workers == 0 {
            return Err(DispatchError::InvalidConfig("workers must be at least 1"));
        }
        if self.max_queued == Some(0) {
            return Err(DispatchError::InvalidConfig("max_queued must be at least 1"));
        }
        if self.thread_name.is_empty() {
            return Err(DispatchError::InvalidConfig("thread name must not be empty"));
        }
        Ok(())
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self { workers, max_queued: None, thread_name: "dispatch-worker".to_string() }
    }
}
