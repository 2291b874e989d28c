//! Cancellable keyed timers
//!
//! Every scheduled action in the game — the simulation tick, board expiry
//! of an uncollected power-up, and the revert of each timed effect — is a
//! keyed deadline in one queue. Re-arming a key overwrites its deadline
//! (last-write-wins), pause cancels just the tick, and reset clears the
//! whole queue so a stale deadline can never touch a superseded game.
//!
//! The driver asks for the earliest deadline, sleeps until it, and then
//! drains everything due. Single-threaded: a firing timer always observes
//! a consistent state because nothing preempts the handler.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Identity of a scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKey {
    /// The next simulation tick
    Tick,
    /// Board expiry of an uncollected power-up
    PowerUpExpiry,
    /// Revert of the shield effect
    ShieldExpiry,
    /// Revert of the speed-boost effect
    SpeedBoostExpiry,
    /// Revert of the double-points effect
    DoublePointsExpiry,
}

/// Keyed one-shot deadlines with last-write-wins re-arm
#[derive(Debug, Default)]
pub struct TimerQueue {
    deadlines: HashMap<TimerKey, Instant>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` to fire after `delay`, replacing any pending deadline
    pub fn arm(&mut self, key: TimerKey, delay: Duration) {
        self.deadlines.insert(key, Instant::now() + delay);
    }

    /// Drop a pending deadline; returns whether one was pending
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.deadlines.contains_key(&key)
    }

    /// Drop every pending deadline
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every key due at `now`, earliest deadline first
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerKey> {
        let mut due: Vec<(TimerKey, Instant)> = self
            .deadlines
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(&key, &deadline)| (key, deadline))
            .collect();
        due.sort_by_key(|&(key, deadline)| (deadline, key));

        for (key, _) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(key, _)| key).collect()
    }
}
