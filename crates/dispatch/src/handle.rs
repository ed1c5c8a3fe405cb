//! # Invocation Handles
//!
//! The caller's view of one submitted operation: its state, its eventual
//! outcome, and the listeners waiting for it.

use std::panic::AssertUnwindSafe;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use tokio::sync::Notify;
use tracing::debug;
use tracing::warn;

use crate::error::InvocationError;

/// Lifecycle of a submitted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    /// Queued, not yet claimed by a worker.
    Pending = 0,
    /// Claimed by a worker; can no longer be cancelled.
    Running = 1,
    Succeeded = 2,
    /// The operation returned an error or panicked.
    Failed = 3,
    Cancelled = 4,
}

impl State {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => State::Pending,
            1 => State::Running,
            2 => State::Succeeded,
            3 => State::Failed,
            _ => State::Cancelled,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, State::Succeeded | State::Failed | State::Cancelled)
    }
}

/// How an operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Succeeded(T),
    /// The operation's own error, unmodified.
    Failed(E),
    Cancelled,
    /// The operation panicked; the payload message if it was a string.
    Panicked(String),
}

impl<T, E> Outcome<T, E> {
    /// The terminal state this outcome records.
    pub fn state(&self) -> State {
        match self {
            Outcome::Succeeded(_) => State::Succeeded,
            Outcome::Failed(_) | Outcome::Panicked(_) => State::Failed,
            Outcome::Cancelled => State::Cancelled,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    pub fn into_result(self) -> Result<T, InvocationError<E>> {
        match self {
            Outcome::Succeeded(v) => Ok(v),
            Outcome::Failed(e) => Err(InvocationError::Failed(e)),
            Outcome::Cancelled => Err(InvocationError::Cancelled),
            Outcome::Panicked(message) => Err(InvocationError::Panicked(message)),
        }
    }

    pub(crate) fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Outcome::Succeeded(v),
            Err(e) => Outcome::Failed(e),
        }
    }
}

pub(crate) type Listener<T, E> = Box<dyn FnOnce(&Outcome<T, E>) + Send + 'static>;

struct Slot<T, E> {
    done: bool,
    /// The outcome is out of the slot while listeners run against it.
    lent: bool,
    outcome: Option<Outcome<T, E>>,
    listeners: Vec<Listener<T, E>>,
}

/// State shared between a handle and the worker that runs its job.
pub(crate) struct Shared<T, E> {
    id: u64,
    state: AtomicU8,
    slot: Mutex<Slot<T, E>>,
    ready: Condvar,
    notify: Notify,
}

impl<T, E> Shared<T, E> {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            state: AtomicU8::new(State::Pending as u8),
            slot: Mutex::new(Slot { done: false, lent: false, outcome: None, listeners: Vec::new() }),
            ready: Condvar::new(),
            notify: Notify::new(),
        }
    }

    pub(crate) fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T, E>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, from: State, to: State) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claims the job for execution. Fails if it was cancelled first.
    pub(crate) fn start(&self) -> bool {
        self.transition(State::Pending, State::Running)
    }

    /// Cancels the job if it has not started.
    pub(crate) fn cancel(&self) -> bool {
        if !self.transition(State::Pending, State::Cancelled) {
            return false;
        }
        debug!(id = self.id, "job cancelled");
        self.complete(Outcome::Cancelled);
        true
    }

    /// Records the outcome and runs the listeners. Only the first call has any effect.
    ///
    /// Listeners run without the slot lock held. Waiters see the outcome only
    /// after every listener has returned.
    pub(crate) fn complete(&self, outcome: Outcome<T, E>) {
        let mut slot = self.lock();
        if slot.done {
            return;
        }
        self.state.store(outcome.state() as u8, Ordering::Release);
        slot.done = true;
        slot.lent = true;
        drop(slot);
        self.settle(outcome);
    }

    /// Runs pending listeners against a lent outcome, then stores it and wakes waiters.
    fn settle(&self, outcome: Outcome<T, E>) {
        loop {
            let mut slot = self.lock();
            if slot.listeners.is_empty() {
                slot.lent = false;
                slot.outcome = Some(outcome);
                break;
            }
            let batch = std::mem::take(&mut slot.listeners);
            drop(slot);
            for listener in batch {
                run_listener(self.id, listener, &outcome);
            }
        }
        self.ready.notify_all();
        self.notify.notify_waiters();
    }

    pub(crate) fn add_listener(&self, listener: Listener<T, E>) {
        let mut slot = self.lock();
        if !slot.done || slot.lent {
            slot.listeners.push(listener);
            return;
        }
        // a handle that gave its outcome away accepts no new listeners
        let Some(outcome) = slot.outcome.take() else {
            return;
        };
        slot.lent = true;
        drop(slot);
        run_listener(self.id, listener, &outcome);
        self.settle(outcome);
    }

    fn take_outcome(&self) -> Option<Outcome<T, E>> {
        self.lock().outcome.take()
    }

    fn wait_until(&self, deadline: Option<Instant>) -> Option<Outcome<T, E>> {
        let mut slot = self.lock();
        loop {
            if let Some(outcome) = slot.outcome.take() {
                return Some(outcome);
            }
            slot = match deadline {
                None => self.ready.wait(slot).unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let left = deadline.checked_duration_since(Instant::now())?;
                    self.ready.wait_timeout(slot, left).unwrap_or_else(PoisonError::into_inner).0
                }
            };
        }
    }
}

fn run_listener<T, E>(id: u64, listener: Listener<T, E>, outcome: &Outcome<T, E>) {
    if std::panic::catch_unwind(AssertUnwindSafe(|| listener(outcome))).is_err() {
        warn!(id, "completion listener panicked");
    }
}

/// Type-erased cancellation, used by the dispatcher's registry of unstarted jobs.
pub(crate) trait Cancel: Send + Sync {
    fn cancel(&self) -> bool;
}

impl<T: Send, E: Send> Cancel for Shared<T, E> {
    fn cancel(&self) -> bool {
        Shared::cancel(self)
    }
}

/// A submitted operation.
///
/// Handles are not `Clone`: exactly one owner reads the outcome. Listeners
/// attached with [`on_complete`](Handle::on_complete) run on the thread that
/// completes the job, or on the caller's thread if the job already finished.
/// `wait` and `outcome` return only after every listener has run. A listener
/// may inspect its handle or attach further listeners, but must not block on
/// its own handle's outcome.
pub struct Handle<T, E> {
    shared: std::sync::Arc<Shared<T, E>>,
}

impl<T, E> std::fmt::Debug for Handle<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle").field("id", &self.id()).field("state", &self.state()).finish()
    }
}

impl<T, E> Handle<T, E> {
    pub(crate) fn new(shared: std::sync::Arc<Shared<T, E>>) -> Self {
        Self { shared }
    }

    /// Unique within the dispatcher that issued it.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn state(&self) -> State {
        self.shared.state()
    }

    pub fn is_done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Attaches a listener that receives the outcome exactly once.
    pub fn on_complete<F>(&self, listener: F)
    where
        F: FnOnce(&Outcome<T, E>) + Send + 'static,
    {
        self.shared.add_listener(Box::new(listener));
    }

    /// Cancels the operation if no worker has claimed it yet.
    ///
    /// Returns `true` if this call cancelled it. Running operations are never
    /// interrupted.
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    /// Blocks until the operation ends.
    pub fn wait(self) -> Outcome<T, E> {
        loop {
            if let Some(outcome) = self.shared.wait_until(None) {
                return outcome;
            }
        }
    }

    /// Blocks up to `timeout`. Gives the handle back if the operation is still going.
    pub fn wait_timeout(self, timeout: Duration) -> Result<Outcome<T, E>, Self> {
        // an unrepresentable deadline waits forever
        let deadline = Instant::now().checked_add(timeout);
        match self.shared.wait_until(deadline) {
            Some(outcome) => Ok(outcome),
            None => Err(self),
        }
    }

    /// Resolves when the operation ends.
    pub async fn outcome(self) -> Outcome<T, E> {
        loop {
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(outcome) = self.shared.take_outcome() {
                return outcome;
            }
            notified.await;
        }
    }
}
