//! Suspension of the emulation thread while a halt is inspected.

use std::fmt::Debug;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// What the debugger needs from the stepping mechanism. Entering is the caller's job.
pub trait Stepping: Debug + Send + Sync {
    fn is_stepping(&self) -> bool;

    fn resume(&self);
}

#[derive(Debug, Default)]
struct Slot {
    stepping: bool,
    /// Bumped by every resume, so a waiter can tell it was released.
    generation: u64,
}

/// One suspension, armed by `SteppingLock::arm` and waited out by `SteppingLock::wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suspension(u64);

/// Single-slot rendezvous between the emulation thread and a control thread.
#[derive(Debug, Default)]
pub struct SteppingLock {
    slot: Mutex<Slot>,
    cond: Condvar,
}

impl SteppingLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // A panicked holder cannot leave the slot inconsistent.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks the GE as halted without blocking yet. A `resume` from here on
    /// releases the matching `wait`, even one that starts later.
    pub fn arm(&self) -> Suspension {
        let mut slot = self.lock();
        slot.stepping = true;
        self.cond.notify_all();
        Suspension(slot.generation)
    }

    /// Blocks until the suspension `arm` returned has been resumed.
    pub fn wait(&self, suspension: Suspension) {
        let mut slot = self.lock();
        while slot.generation == suspension.0 {
            slot = self.cond.wait(slot).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Parks the calling thread until `resume` is called.
    pub fn enter(&self) {
        let suspension = self.arm();
        self.wait(suspension);
    }

    /// Waits up to `timeout` for the emulation thread to park. Returns whether it is parked.
    pub fn wait_until_stepping(&self, timeout: Duration) -> bool {
        let slot = self.lock();
        let (slot, _) = self
            .cond
            .wait_timeout_while(slot, timeout, |s| !s.stepping)
            .unwrap_or_else(|e| e.into_inner());
        slot.stepping
    }
}

impl Stepping for SteppingLock {
    fn is_stepping(&self) -> bool {
        self.lock().stepping
    }

    fn resume(&self) {
        let mut slot = self.lock();
        if slot.stepping {
            slot.stepping = false;
            slot.generation += 1;
            self.cond.notify_all();
        }
    }
}
