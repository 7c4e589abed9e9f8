//! Cooperative task scheduling for a single-threaded main loop.
//!
//! Nothing in this crate ever blocks. Anything that has to happen "later" is
//! armed as a task in a [`Scheduler`] and the host's main loop asks the
//! scheduler which task is due. A task carries an *event* value chosen by its
//! owner; the scheduler never runs code itself, it only hands the event back.
//! This keeps all mutable state with the owner and lets tasks "capture" whatever
//! context they need through the event type.
//!
//! Three primitives are available:
//!
//! - [`after`](Scheduler::after): fire once when a deadline passes
//! - [`if_then`](Scheduler::if_then): fire once when a condition becomes true;
//!   the condition is re-evaluated on every poll until then
//! - [`only_one_of`](Scheduler::only_one_of): join two armed tasks so that the
//!   first one to fire cancels the other
//!
//! Due tasks are handed out strictly in the order they were armed.

use crate::network::error::Error;
use heapless::Vec;

/// A monotonic millisecond time source.
///
/// On bare metal this is typically backed by a hardware timer or an
/// `embassy_time::Instant`; tests use a manually advanced counter.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

impl<K: Clock + ?Sized> Clock for &K {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// [`Clock`] backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose origin is the current instant.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Handle to an armed task, used to cancel it or race it against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(u32);

/// What makes a task fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger<C> {
    /// Fire once the clock reaches this instant (milliseconds).
    At(u64),
    /// Fire once the owner reports the condition as satisfied.
    When(C),
}

#[derive(Debug)]
struct Entry<E, C> {
    id: TaskId,
    trigger: Trigger<C>,
    event: E,
    rival: Option<TaskId>,
}

/// A fixed-capacity table of armed tasks.
///
/// * `E` - event handed back when a task fires
/// * `C` - condition type evaluated by the owner for [`Trigger::When`] tasks
/// * `N` - maximum number of tasks armed at once
#[derive(Debug)]
pub struct Scheduler<E, C, const N: usize> {
    entries: Vec<Entry<E, C>, N>,
    next_id: u32,
}

impl<E, C, const N: usize> Scheduler<E, C, N> {
    /// Create an empty scheduler.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    fn arm(&mut self, trigger: Trigger<C>, event: E) -> Result<TaskId, Error> {
        let id = TaskId(self.next_id);
        self.entries
            .push(Entry {
                id,
                trigger,
                event,
                rival: None,
            })
            .map_err(|_| Error::CapacityExceeded)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    /// Arm a one-shot task that fires `delay_ms` after `now`.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if `N` tasks are already armed.
    pub fn after(&mut self, now: u64, delay_ms: u64, event: E) -> Result<TaskId, Error> {
        self.arm(Trigger::At(now.saturating_add(delay_ms)), event)
    }

    /// Arm a task that fires the first time `condition` is reported as true.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if `N` tasks are already armed.
    pub fn if_then(&mut self, condition: C, event: E) -> Result<TaskId, Error> {
        self.arm(Trigger::When(condition), event)
    }

    /// Race two armed tasks: whichever fires first cancels the other.
    pub fn only_one_of(&mut self, a: TaskId, b: TaskId) {
        for entry in self.entries.iter_mut() {
            if entry.id == a {
                entry.rival = Some(b);
            } else if entry.id == b {
                entry.rival = Some(a);
            }
        }
    }

    /// Cancel an armed task. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Whether the task is still armed.
    pub fn is_armed(&self, id: TaskId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Cancel every armed task.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of armed tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no task is armed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the oldest armed task that is due at `now`.
    ///
    /// `is_ready` is asked about every pending condition until one is due. The
    /// returned task is disarmed, and if it was raced with another task that
    /// task is cancelled too.
    pub fn next_ready<F>(&mut self, now: u64, mut is_ready: F) -> Option<E>
    where
        F: FnMut(&C) -> bool,
    {
        let pos = self.entries.iter().position(|entry| match &entry.trigger {
            Trigger::At(deadline) => now >= *deadline,
            Trigger::When(condition) => is_ready(condition),
        })?;
        let entry = self.entries.remove(pos);
        if let Some(rival) = entry.rival {
            self.cancel(rival);
        }
        Some(entry.event)
    }
}

impl<E, C, const N: usize> Default for Scheduler<E, C, N> {
    fn default() -> Self {
        Self::new()
    }
}
