//! # Dispatcher
//!
//! A dedicated tokio runtime whose worker slots pull jobs from one queue and
//! run each on the blocking pool.
//!
//! Every unstarted job is listed in a registry keyed by handle id. Whoever
//! removes a job's entry owns it: the worker that claims it, or the shutdown
//! that cancels it. The in-flight count is released once per job, by that owner.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::error::SubmitError;
use crate::handle::Cancel;
use crate::handle::Handle;
use crate::handle::Listener;
use crate::handle::Outcome;
use crate::handle::Shared;

type Job = Box<dyn FnOnce() + Send + 'static>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bookkeeping shared with the jobs themselves.
struct Tracker {
    unstarted: DashMap<u64, Arc<dyn Cancel>>,
    /// Queued plus running jobs.
    active: Mutex<usize>,
    idle: Condvar,
}

impl Tracker {
    fn enter(&self) {
        *lock(&self.active) += 1;
    }

    fn leave(&self) {
        let mut active = lock(&self.active);
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut active = lock(&self.active);
        while *active > 0 {
            active = match deadline {
                None => self.idle.wait(active).unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                        return false;
                    };
                    self.idle.wait_timeout(active, left).unwrap_or_else(PoisonError::into_inner).0
                }
            };
        }
        true
    }
}

/// An owned pool that runs blocking operations and completes their handles.
///
/// Dropping the dispatcher shuts it down.
pub struct Dispatcher {
    config: DispatcherConfig,
    runtime: Mutex<Option<Runtime>>,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    tracker: Arc<Tracker>,
    next_id: AtomicU64,
    accepting: AtomicBool,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("accepting", &self.is_accepting())
            .field("queued", &self.queued())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        let workers = config.worker_count();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name(config.name())
            .enable_all()
            .build()?;

        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        for slot in 0..workers {
            let receiver = receiver.clone();
            runtime.spawn(async move {
                loop {
                    // one slot waits on the queue at a time; the lock is released before running
                    let job = receiver.lock().await.recv().await;
                    let Some(job) = job else {
                        break;
                    };
                    if let Err(e) = tokio::task::spawn_blocking(job).await {
                        warn!(slot, error = %e, "worker lost a job");
                    }
                }
                trace!(slot, "worker slot stopped");
            });
        }

        info!(workers, name = config.name(), "dispatcher started");

        Ok(Self {
            config,
            runtime: Mutex::new(Some(runtime)),
            sender: Mutex::new(Some(sender)),
            tracker: Arc::new(Tracker { unstarted: DashMap::new(), active: Mutex::new(0), idle: Condvar::new() }),
            next_id: AtomicU64::new(1),
            accepting: AtomicBool::new(true),
        })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Whether new submissions are admitted.
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Submitted operations that no worker has claimed yet.
    pub fn queued(&self) -> usize {
        self.tracker.unstarted.len()
    }

    /// Queues `op` and returns its handle without waiting for it to run.
    ///
    /// # Errors
    /// - `ShutDown` once [`shutdown`](Self::shutdown) or [`drain`](Self::drain) began.
    /// - `QueueFull` if the configured number of unstarted operations is reached.
    pub fn submit<T, E, F>(&self, op: F) -> Result<Handle<T, E>, SubmitError>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.enqueue(op, None)
    }

    /// Like [`submit`](Self::submit), with a completion callback attached before
    /// the operation can start.
    pub fn submit_with<T, E, F, C>(&self, op: F, callback: C) -> Result<Handle<T, E>, SubmitError>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        C: FnOnce(&Outcome<T, E>) + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.enqueue(op, Some(Box::new(callback)))
    }

    fn enqueue<T, E, F>(&self, op: F, listener: Option<Listener<T, E>>) -> Result<Handle<T, E>, SubmitError>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        if !self.is_accepting() {
            return Err(SubmitError::ShutDown);
        }

        // held until the job is queued, so shutdown cannot miss its registry entry
        // and concurrent submitters see each other's entries against the limit
        let sender = lock(&self.sender);
        let Some(sender) = sender.as_ref() else {
            return Err(SubmitError::ShutDown);
        };
        if let Some(limit) = self.config.queue_limit() {
            if self.tracker.unstarted.len() >= limit {
                return Err(SubmitError::QueueFull { limit });
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(Shared::new(id));
        if let Some(listener) = listener {
            shared.add_listener(listener);
        }

        self.tracker.enter();
        self.tracker.unstarted.insert(id, shared.clone() as Arc<dyn Cancel>);

        let job = make_job(id, shared.clone(), self.tracker.clone(), op);
        if sender.send(job).is_err() {
            if self.tracker.unstarted.remove(&id).is_some() {
                self.tracker.leave();
            }
            return Err(SubmitError::ShutDown);
        }

        debug!(id, "job submitted");
        Ok(Handle::new(shared))
    }

    /// Stops immediately: refuses new work, cancels every unstarted operation
    /// and abandons the worker runtime. Running operations finish on their own
    /// and complete their handles.
    ///
    /// Returns the number of operations cancelled by this call.
    pub fn shutdown(&self) -> usize {
        self.accepting.store(false, Ordering::Release);
        drop(lock(&self.sender).take());

        let ids: Vec<u64> = self.tracker.unstarted.iter().map(|entry| *entry.key()).collect();
        let mut cancelled = 0;
        for id in ids {
            if let Some((_, job)) = self.tracker.unstarted.remove(&id) {
                if job.cancel() {
                    cancelled += 1;
                }
                self.tracker.leave();
            }
        }

        if let Some(runtime) = lock(&self.runtime).take() {
            runtime.shutdown_background();
            info!(cancelled, "dispatcher shut down");
        }
        cancelled
    }

    /// Refuses new work and blocks until every queued and running operation
    /// has finished, or `timeout` elapses. Returns `true` if the pool went idle.
    pub fn drain(&self, timeout: Duration) -> bool {
        self.accepting.store(false, Ordering::Release);
        drop(lock(&self.sender).take());
        debug!(queued = self.queued(), "draining dispatcher");
        self.tracker.wait_idle(timeout)
    }

    /// Blocks until no operation is queued or running, or `timeout` elapses.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        self.tracker.wait_idle(timeout)
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn make_job<T, E, F>(id: u64, shared: Arc<Shared<T, E>>, tracker: Arc<Tracker>, op: F) -> Job
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    Box::new(move || {
        if tracker.unstarted.remove(&id).is_none() {
            // shutdown took it
            return;
        }
        if shared.start() {
            trace!(id, "job started");
            let outcome = match std::panic::catch_unwind(AssertUnwindSafe(op)) {
                Ok(result) => Outcome::from_result(result),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(id, panic = %message, "operation panicked");
                    Outcome::Panicked(message)
                }
            };
            debug!(id, state = ?outcome.state(), "job completed");
            shared.complete(outcome);
        }
        tracker.leave();
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
