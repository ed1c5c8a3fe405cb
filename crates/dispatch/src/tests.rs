use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::handle::Shared;
use crate::*;

// ============================================================================
//  CONFIGURATION
// ============================================================================

#[test]
fn invalid_configs_rejected() {
    assert!(matches!(
        Dispatcher::new(DispatcherConfig::new().workers(0)),
        Err(DispatchError::InvalidConfig(_))
    ));
    assert!(matches!(
        Dispatcher::new(DispatcherConfig::new().max_queued(0)),
        Err(DispatchError::InvalidConfig(_))
    ));
    assert!(matches!(
        Dispatcher::new(DispatcherConfig::new().thread_name("")),
        Err(DispatchError::InvalidConfig(_))
    ));
}

#[test]
fn default_config_has_workers() {
    let config = DispatcherConfig::default();
    assert!(config.worker_count() >= 1);
    assert_eq!(config.queue_limit(), None);
    assert_eq!(config.name(), "dispatch-worker");
}

// ============================================================================
//  OUTCOMES
// ============================================================================

#[test]
fn outcome_states() {
    assert_eq!(Outcome::<u8, ()>::Succeeded(1).state(), State::Succeeded);
    assert_eq!(Outcome::<u8, ()>::Failed(()).state(), State::Failed);
    assert_eq!(Outcome::<u8, ()>::Panicked("p".into()).state(), State::Failed);
    assert_eq!(Outcome::<u8, ()>::Cancelled.state(), State::Cancelled);

    assert_eq!(Outcome::<u8, &str>::Failed("x").into_result(), Err(InvocationError::Failed("x")));
    assert_eq!(Outcome::<u8, &str>::Succeeded(3).into_result(), Ok(3));
    assert!(!State::Running.is_terminal());
}

// ============================================================================
//  HANDLE STATE MACHINE
// ============================================================================

#[test]
fn completion_happens_once() {
    let shared: Arc<Shared<u32, ()>> = Arc::new(Shared::new(7));
    let calls = Arc::new(AtomicUsize::new(0));

    let seen = calls.clone();
    shared.add_listener(Box::new(move |outcome: &Outcome<u32, ()>| {
        assert_eq!(outcome, &Outcome::Succeeded(1));
        seen.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(shared.start());
    shared.complete(Outcome::Succeeded(1));
    shared.complete(Outcome::Succeeded(2));
    assert!(!shared.cancel());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(Handle::new(shared).wait(), Outcome::Succeeded(1));
}

#[test]
fn cancel_beats_start() {
    let shared: Arc<Shared<u32, ()>> = Arc::new(Shared::new(1));
    assert!(shared.cancel());
    assert!(!shared.start());
    assert_eq!(shared.state(), State::Cancelled);

    let handle = Handle::new(shared);
    assert!(handle.is_done());
    assert_eq!(handle.wait(), Outcome::Cancelled);
}

#[test]
fn late_listener_runs_on_caller() {
    let shared: Arc<Shared<u32, ()>> = Arc::new(Shared::new(1));
    shared.complete(Outcome::Failed(()));
    let handle = Handle::new(shared);

    let caller = std::thread::current().id();
    let ran_on = Arc::new(std::sync::Mutex::new(None));
    let slot = ran_on.clone();
    handle.on_complete(move |outcome| {
        assert_eq!(outcome.state(), State::Failed);
        if let Ok(mut slot) = slot.lock() {
            *slot = Some(std::thread::current().id());
        }
    });
    assert_eq!(*ran_on.lock().unwrap(), Some(caller));
}

#[test]
fn panicking_listener_does_not_block_completion() {
    let shared: Arc<Shared<u32, ()>> = Arc::new(Shared::new(1));
    shared.add_listener(Box::new(|_: &Outcome<u32, ()>| panic!("listener failure")));
    shared.complete(Outcome::Succeeded(5));
    assert_eq!(Handle::new(shared).wait(), Outcome::Succeeded(5));
}

#[test]
fn listener_can_reenter_its_own_handle() {
    let shared: Arc<Shared<u32, ()>> = Arc::new(Shared::new(1));
    let inner_calls = Arc::new(AtomicUsize::new(0));

    let (reentry, seen) = (shared.clone(), inner_calls.clone());
    shared.add_listener(Box::new(move |outcome: &Outcome<u32, ()>| {
        assert_eq!(outcome, &Outcome::Succeeded(9));
        assert_eq!(reentry.state(), State::Succeeded);
        reentry.add_listener(Box::new(move |outcome: &Outcome<u32, ()>| {
            assert_eq!(outcome, &Outcome::Succeeded(9));
            seen.fetch_add(1, Ordering::SeqCst);
        }));
    }));

    shared.complete(Outcome::Succeeded(9));
    assert_eq!(inner_calls.load(Ordering::SeqCst), 1);
    assert_eq!(Handle::new(shared).wait(), Outcome::Succeeded(9));
}

#[test]
fn late_listener_can_attach_another() {
    let shared: Arc<Shared<u32, ()>> = Arc::new(Shared::new(1));
    shared.complete(Outcome::Succeeded(3));
    let calls = Arc::new(AtomicUsize::new(0));

    let (reentry, seen) = (shared.clone(), calls.clone());
    shared.add_listener(Box::new(move |_: &Outcome<u32, ()>| {
        seen.fetch_add(1, Ordering::SeqCst);
        let seen = seen.clone();
        reentry.add_listener(Box::new(move |_: &Outcome<u32, ()>| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
    }));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(Handle::new(shared).wait(), Outcome::Succeeded(3));
}
