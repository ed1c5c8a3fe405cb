//! # Dispatch
//!
//! Runs blocking operations on an owned worker pool and hands back a [`Handle`]
//! per submission.
//!
//! ## Philosophy
//!
//! The pool is an explicit resource: the caller builds a [`Dispatcher`], shares
//! it (usually behind an `Arc`), and shuts it down or drains it. Nothing here is
//! global.
//!
//! ## Invariants
//!
//! - **One terminal state**: every handle ends in exactly one of `Succeeded`,
//!   `Failed` or `Cancelled`, and never changes afterwards.
//! - **Listeners once**: every completion listener runs exactly once, after the
//!   terminal state is recorded and before any waiter sees the outcome.
//! - **Cooperative cancellation**: only unstarted work can be cancelled. A
//!   worker claiming a job and a cancel race on one compare-and-swap.
//! - **No lost handles**: shutdown cancels every unstarted job, and a panicking
//!   operation completes its handle as `Outcome::Panicked`.

mod config;
mod dispatcher;
mod error;
mod handle;

#[cfg(test)]
mod tests;

pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use error::InvocationError;
pub use error::SubmitError;
pub use handle::Handle;
pub use handle::Outcome;
pub use handle::State;
