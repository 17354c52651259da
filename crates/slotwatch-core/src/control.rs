//! Cooperative stop: a shared flag tripped by Ctrl+C that also wakes sleepers.
//!
//! The poll loop and the fetcher never sleep with `std::thread::sleep`; they
//! go through a [`Sleeper`] so that a stop request ends the wait at once and
//! tests can replace real time.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How a [`Sleeper::sleep`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Stopped,
}

/// Source of suspension points that a stop request can cut short.
pub trait Sleeper {
    /// Wait for `duration` or until stopped, whichever comes first.
    fn sleep(&self, duration: Duration) -> Wake;

    /// True once a stop has been requested.
    fn is_stopped(&self) -> bool;
}

#[derive(Default)]
struct Inner {
    stopped: Mutex<bool>,
    cond: Condvar,
}

/// Cloneable stop token. Every clone observes the same flag.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request stop and wake every thread blocked in [`Sleeper::sleep`].
    pub fn stop(&self) {
        *self.lock() = true;
        self.inner.cond.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner
            .stopped
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl Sleeper for StopSignal {
    fn sleep(&self, duration: Duration) -> Wake {
        // No representable deadline: wait for stop only.
        let deadline = Instant::now().checked_add(duration);
        let mut stopped = self.lock();
        loop {
            if *stopped {
                return Wake::Stopped;
            }
            stopped = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Wake::Elapsed;
                    }
                    match self.inner.cond.wait_timeout(stopped, deadline - now) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    }
                }
                None => self
                    .inner
                    .cond
                    .wait(stopped)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
            };
        }
    }

    fn is_stopped(&self) -> bool {
        *self.lock()
    }
}
