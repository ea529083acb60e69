//! Cumulative session deadlines.
//!
//! A [`Deadline`] tracks one decode session's wall-clock budget. The decode
//! backend polls it from its interrupt callback before and during blocking
//! read and seek calls, and the engine's own decode loops poll it between
//! backend calls. The budget is cumulative across the whole session: elapsed
//! time accrues over open, probe, seek, and decode, not per call.
//!
//! Cancellation is cooperative. A backend call that never polls the deadline
//! cannot be preempted; the session simply surfaces the timeout at the next
//! poll site.

use std::{cell::Cell, time::Duration, time::Instant};

/// Budget a session falls back to when the caller passes zero.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// A session-scoped wall-clock budget.
///
/// Created once per [`DecodeSession`](crate::DecodeSession) and owned by it
/// behind a stable heap address, so the backend's interrupt callback can hold
/// a raw pointer to it for the lifetime of the container handle. There is no
/// process-wide callback table; each session polls only its own deadline.
///
/// The clock starts lazily on the first [`check`](Deadline::check), so time
/// spent before the first blocking call does not count against the budget.
#[derive(Debug)]
pub struct Deadline {
    budget: Duration,
    started: Cell<Option<Instant>>,
    expired: Cell<bool>,
}

impl Deadline {
    /// Create a deadline with the given budget.
    ///
    /// A zero budget is coerced to [`DEFAULT_TIMEOUT`].
    pub fn new(budget: Duration) -> Self {
        let budget = if budget.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            budget
        };
        Self {
            budget,
            started: Cell::new(None),
            expired: Cell::new(false),
        }
    }

    /// Poll the deadline.
    ///
    /// The first call records the session start time and returns `true`
    /// (continue). Later calls compare the elapsed time against the budget;
    /// once the budget is exceeded the deadline latches expired and every
    /// subsequent call returns `false` (abort).
    pub fn check(&self) -> bool {
        if self.expired.get() {
            return false;
        }
        match self.started.get() {
            None => {
                self.started.set(Some(Instant::now()));
                true
            }
            Some(started) => {
                if started.elapsed() > self.budget {
                    self.expired.set(true);
                    false
                } else {
                    true
                }
            }
        }
    }

    /// Whether a previous [`check`](Deadline::check) has signalled abort.
    ///
    /// Once the backend's interrupt callback aborts a blocking call, the
    /// backend reports a generic failure; callers use this latch to surface
    /// that failure as a timeout instead.
    pub fn is_expired(&self) -> bool {
        self.expired.get()
    }

    /// The budget this deadline enforces (after zero-coercion).
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time elapsed since the first poll, or zero if never polled.
    pub fn elapsed(&self) -> Duration {
        self.started
            .get()
            .map(|started| started.elapsed())
            .unwrap_or(Duration::ZERO)
    }
}
