//! Wait/done bookkeeping shared by all actions.
//!
//! State machine:
//!
//! ```text
//! Blocked ── signal(last outstanding want) ──→ Runnable
//! ```
//!
//! There is no way back: satisfaction is monotonic for the lifetime of the
//! instance. Runnable only means preconditions hold, not that the action
//! has run.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::event::Event;

/// Tracks which wanted events have been observed.
///
/// Signals are matched by equality, so they may arrive in any order and
/// from any number of producers. Duplicate wants collapse to a single
/// requirement. The state sits behind a per-instance lock, so concurrent
/// producers may signal the same action; different actions share nothing.
#[derive(Debug, Default)]
pub struct ActionBase {
    state: Mutex<WaitState>,
}

#[derive(Debug, Default)]
struct WaitState {
    want: Vec<Event>,
    /// Parallel to `want`.
    satisfied: Vec<bool>,
}

impl ActionBase {
    pub fn new(want: impl IntoIterator<Item = Event>) -> Self {
        let want: Vec<Event> = want.into_iter().collect();
        let satisfied = vec![false; want.len()];
        Self {
            state: Mutex::new(WaitState { want, satisfied }),
        }
    }

    // The state is a monotonic set of flags; a panic mid-update cannot
    // leave it inconsistent, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, WaitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `event` as observed.
    ///
    /// Returns true if it matched a want that was still outstanding, false
    /// if it is not wanted or was already observed.
    pub fn signal(&self, event: &Event) -> bool {
        let mut state = self.lock();
        let WaitState { want, satisfied } = &mut *state;

        let mut consumed = false;
        for (wanted, done) in want.iter().zip(satisfied.iter_mut()) {
            if wanted == event {
                if *done {
                    return false;
                }
                *done = true;
                consumed = true;
            }
        }
        consumed
    }

    /// True iff every wanted event has been observed. Trivially true when
    /// nothing is wanted.
    pub fn can_run(&self) -> bool {
        self.lock().satisfied.iter().all(|done| *done)
    }

    /// Wanted events not yet observed, in declaration order.
    pub fn pending_events(&self) -> Vec<Event> {
        self.collect(false)
    }

    /// Observed events, in declaration order rather than arrival order.
    pub fn done(&self) -> Vec<Event> {
        self.collect(true)
    }

    /// Everything this action waits for, as declared.
    pub fn want(&self) -> Vec<Event> {
        self.lock().want.clone()
    }

    fn collect(&self, satisfied: bool) -> Vec<Event> {
        let state = self.lock();
        let mut seen = HashSet::new();
        state
            .want
            .iter()
            .zip(&state.satisfied)
            .filter(|(event, done)| **done == satisfied && seen.insert(*event))
            .map(|(event, _)| event.clone())
            .collect()
    }
}
