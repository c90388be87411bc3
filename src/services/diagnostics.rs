//! Explicit handle for the request-profiling toggle.
//!
//! Replaces a hidden global config mutation: the handler that needs the
//! profiler out of the way receives this handle through `AppState` and
//! suspends it through an RAII guard, so the effect is visible in its
//! contract and mockable in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide diagnostics switches. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Diagnostics {
    profiler_enabled: Arc<AtomicBool>,
}

impl Diagnostics {
    pub fn new(profiler_enabled: bool) -> Self {
        Self {
            profiler_enabled: Arc::new(AtomicBool::new(profiler_enabled)),
        }
    }

    pub fn profiler_enabled(&self) -> bool {
        self.profiler_enabled.load(Ordering::SeqCst)
    }

    /// Turn the profiler off until the returned guard is dropped.
    ///
    /// The guard restores the previous state, so suspending an already
    /// disabled profiler keeps it disabled.
    pub fn suspend_profiler(&self) -> ProfilerGuard {
        let was_enabled = self.profiler_enabled.swap(false, Ordering::SeqCst);

        ProfilerGuard {
            toggle: self.profiler_enabled.clone(),
            was_enabled,
        }
    }
}

pub struct ProfilerGuard {
    toggle: Arc<AtomicBool>,
    was_enabled: bool,
}

impl Drop for ProfilerGuard {
    fn drop(&mut self) {
        if self.was_enabled {
            self.toggle.store(true, Ordering::SeqCst);
        }
    }
}
