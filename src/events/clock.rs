//! Process-wide logical clock.
//!
//! Invocation records carry a logical tick rather than wall time. The host
//! advances the clock once per loop iteration (frame, turn, scheduler pass),
//! so everything dispatched within one iteration shares a tick.

use std::sync::atomic::{AtomicU64, Ordering};

static TICK: AtomicU64 = AtomicU64::new(0);

/// Monotonic logical tick counter, shared by the whole process.
pub struct LogicalClock;

impl LogicalClock {
    /// The current tick.
    pub fn current() -> u64 {
        TICK.load(Ordering::Relaxed)
    }

    /// Advances the clock and returns the new tick.
    pub fn advance() -> u64 {
        TICK.fetch_add(1, Ordering::Relaxed) + 1
    }
}
