//! Cooperative timer queue for effects that fire after a real-time delay.
//!
//! Nothing runs on its own: the host advances the queue from its frame loop
//! and receives every task whose deadline passed, in deadline order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

pub struct Scheduler<T> {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Reverse<Entry<T>>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue `task` to fire `delay` from now. Returns the absolute deadline.
    pub fn schedule(&mut self, delay: Duration, task: T) -> Duration {
        let due = self.now.saturating_add(delay);
        self.seq += 1;
        self.queue.push(Reverse(Entry {
            due,
            seq: self.seq,
            task,
        }));
        due
    }

    /// Move time forward and collect every task that became due.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let mut fired = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|Reverse(e)| e.due <= self.now)
        {
            if let Some(Reverse(entry)) = self.queue.pop() {
                fired.push(entry.task);
            }
        }
        fired
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
