//! Delayed actions tied to a state epoch.
//!
//! Behaviors such as "wait here for three seconds, then walk on" are
//! scheduled as continuations stamped with the epoch of the state that
//! scheduled them. The owner bumps its epoch on every state change, so a
//! continuation left over from a previous state is discarded on the next
//! poll instead of firing.

use tracing::trace;

#[derive(Debug, Clone)]
struct Entry<A> {
    epoch: u64,
    due_at: f32,
    action: A,
}

#[derive(Debug, Clone)]
pub struct DeferredQueue<A> {
    entries: Vec<Entry<A>>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to run once the clock reaches `due_at`.
    pub fn schedule(&mut self, epoch: u64, due_at: f32, action: A) {
        self.entries.push(Entry {
            epoch,
            due_at,
            action,
        });
    }

    /// Remove and return the actions that are due for `epoch`, in the order
    /// they were scheduled. Entries from other epochs are dropped.
    pub fn poll(&mut self, now: f32, epoch: u64) -> Vec<A> {
        let before = self.entries.len();
        self.entries.retain(|e| e.epoch == epoch);
        let stale = before - self.entries.len();
        if stale > 0 {
            trace!(stale, epoch, "discarded stale continuations");
        }

        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.due_at <= now {
                due.push(entry.action);
            } else {
                waiting.push(entry);
            }
        }
        self.entries = waiting;
        due
    }

    /// Number of continuations still waiting for `epoch`.
    pub fn pending(&self, epoch: u64) -> usize {
        self.entries.iter().filter(|e| e.epoch == epoch).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
