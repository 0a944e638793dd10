//! Step synchronization primitives.
//!
//! The clock is the sole writer of the step-ready edge. Publishing the edge
//! also snapshots the participant set: workers registered at publish time
//! are the ones the clock will wait for, so a registration that appears
//! mid-step is simply not required until the next publish.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A snapshot of the step-sync signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncSignal {
    /// The step the clock most recently published.
    pub current_step: u64,
    /// Whether the step edge is currently raised.
    pub step_ready: bool,
}

#[derive(Debug, Default)]
struct SyncState {
    signal: SyncSignal,
    participants: Vec<String>,
}

/// The step-ready edge plus the participant snapshot taken at publish time.
#[derive(Debug, Default)]
pub struct StepSync {
    state: Mutex<SyncState>,
}

impl StepSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the edge for `step` and record which workers must complete it.
    pub fn publish_step_ready(&self, step: u64, participants: Vec<String>) {
        let mut state = self.state.lock().expect("sync mutex poisoned");
        state.signal = SyncSignal {
            current_step: step,
            step_ready: true,
        };
        state.participants = participants;
    }

    /// Lower the edge. The current step number is retained.
    pub fn clear_step_ready(&self) {
        let mut state = self.state.lock().expect("sync mutex poisoned");
        state.signal.step_ready = false;
    }

    /// Read the current signal.
    #[must_use]
    pub fn signal(&self) -> SyncSignal {
        self.state.lock().expect("sync mutex poisoned").signal
    }

    /// The participant snapshot of the most recent publish.
    #[must_use]
    pub fn participants(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("sync mutex poisoned")
            .participants
            .clone()
    }
}

/// Process-wide run flags. `over` is the single cancellation signal every
/// polling loop in the system checks.
#[derive(Debug, Default)]
pub struct RunFlags {
    running: AtomicBool,
    over: AtomicBool,
}

impl RunFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Raise the shutdown cue. Idempotent.
    pub fn mark_over(&self) {
        self.over.store(true, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.over.load(Ordering::SeqCst)
    }
}
