//! Cooperative cancellation for long recursion sweeps.
//!
//! The sweep polls an [`Interrupt`] every few hundred observations. When it
//! answers `true` the sweep stops and reports an aborted outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Query polled by the recursion sweep.
pub trait Interrupt {
    fn should_cancel(&self) -> bool;
}

/// Never requests cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Interrupt for NeverCancel {
    fn should_cancel(&self) -> bool {
        false
    }
}

/// Flag set from another thread (e.g. a signal handler or UI).
impl Interrupt for AtomicBool {
    fn should_cancel(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Cancels once a wall-clock instant has passed.
///
/// A deadline beyond what `Instant` can represent never fires.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn at(at: Instant) -> Self {
        Self { at: Some(at) }
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(timeout),
        }
    }
}

impl Interrupt for Deadline {
    fn should_cancel(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}

impl<T: Interrupt> Interrupt for Option<T> {
    fn should_cancel(&self) -> bool {
        self.as_ref().is_some_and(Interrupt::should_cancel)
    }
}

impl<T: Interrupt + ?Sized> Interrupt for &T {
    fn should_cancel(&self) -> bool {
        (**self).should_cancel()
    }
}

impl<T: Interrupt + ?Sized> Interrupt for Arc<T> {
    fn should_cancel(&self) -> bool {
        (**self).should_cancel()
    }
}
