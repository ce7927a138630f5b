//! Cooperative group scheduler.
//!
//! Walks are suspendable tasks. After emitting a level a walk asks the
//! scheduler whether it may emit the next one:
//!
//! ```text
//! collector succeeded at a group <= next key   -> Abandon
//! earliest queued task waits on a key <= next  -> Suspend (queue at next key)
//! otherwise                                    -> Continue
//! ```
//!
//! The queue is ordered by awaited key, first-in first-out among equal keys,
//! so a run over the same input always resumes tasks in the same order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// What a task should do before emitting its next level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Continue,
    Suspend,
    Abandon,
}

struct Pending<T> {
    target: u32,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.seq == other.seq
    }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pending<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.target, self.seq).cmp(&(other.target, other.seq))
    }
}

/// Priority queue of suspended tasks keyed by the group they wait on.
pub struct GroupScheduler<T> {
    queue: BinaryHeap<Reverse<Pending<T>>>,
    next_seq: u64,
}

impl<T> Default for GroupScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GroupScheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `task` until resolution reaches `target`.
    pub fn push(&mut self, target: u32, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Pending { target, seq, task }));
    }

    /// Remove the task waiting on the smallest key.
    pub fn pop(&mut self) -> Option<(u32, T)> {
        self.queue
            .pop()
            .map(|Reverse(pending)| (pending.target, pending.task))
    }

    /// Key awaited by the next task to resume.
    pub fn peek_target(&self) -> Option<u32> {
        self.queue.peek().map(|Reverse(pending)| pending.target)
    }

    /// Decide whether a task may emit the level at `key`, given the group
    /// the collector has succeeded at, if any.
    pub fn poll_wait(&self, key: u32, success_group: Option<u32>) -> WaitOutcome {
        if success_group.is_some_and(|group| group <= key) {
            return WaitOutcome::Abandon;
        }
        match self.peek_target() {
            Some(target) if target <= key => WaitOutcome::Suspend,
            _ => WaitOutcome::Continue,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
