//! Discrete-event turn queue keyed by absolute tick.
//! This module exists to decide who acts next and to keep FIFO order inside a tick.
//! It does not own what a turn does; callers supply that as a closure.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

/// What a turn closure asks the scheduler to do with the actor it just ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnResult {
    /// Run again after this many ticks.
    Reschedule(u64),
    /// Terminal; the actor is dropped from the schedule.
    Done,
    /// Stop dispatching. The actor and the rest of its bucket go back to the front of `now`.
    Yield,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketReport {
    pub tick: u64,
    pub processed: u32,
    pub yielded: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule<K> {
    now: u64,
    buckets: BTreeMap<u64, VecDeque<K>>,
}

impl<K> Default for Schedule<K> {
    fn default() -> Self {
        Self { now: 0, buckets: BTreeMap::new() }
    }
}

impl<K: Copy + PartialEq> Schedule<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(VecDeque::is_empty)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(VecDeque::len).sum()
    }

    pub fn schedule(&mut self, interval: u64, actor: K) {
        let tick = self.now.saturating_add(interval);
        self.buckets.entry(tick).or_default().push_back(actor);
    }

    pub fn contains(&self, actor: K) -> bool {
        self.buckets.values().any(|bucket| bucket.contains(&actor))
    }

    /// Tick at which `actor` is next due, if it is pending.
    pub fn due_tick(&self, actor: K) -> Option<u64> {
        self.buckets
            .iter()
            .find(|(_, bucket)| bucket.contains(&actor))
            .map(|(tick, _)| *tick)
    }

    /// Earliest pending actor without dispatching it.
    pub fn peek(&self) -> Option<(u64, K)> {
        self.buckets
            .iter()
            .find_map(|(tick, bucket)| bucket.front().map(|actor| (*tick, *actor)))
    }

    /// Every pending `(tick, actor)` pair in dispatch order.
    pub fn pending(&self) -> impl Iterator<Item = (u64, K)> + '_ {
        self.buckets.iter().flat_map(|(tick, bucket)| bucket.iter().map(|actor| (*tick, *actor)))
    }

    /// Drops the first pending entry for `actor`. Returns whether one was found.
    pub fn remove(&mut self, actor: K) -> bool {
        let Some(tick) = self.due_tick(actor) else {
            return false;
        };
        let Some(bucket) = self.buckets.get_mut(&tick) else {
            return false;
        };
        if let Some(index) = bucket.iter().position(|queued| *queued == actor) {
            bucket.remove(index);
        }
        if bucket.is_empty() {
            self.buckets.remove(&tick);
        }
        true
    }

    /// Moves `now` to the earliest non-empty bucket and runs its actors in insertion order.
    /// Returns `None` without touching `now` when nothing is scheduled.
    pub fn advance<F>(&mut self, mut turn: F) -> Option<BucketReport>
    where
        F: FnMut(K) -> TurnResult,
    {
        self.buckets.retain(|_, bucket| !bucket.is_empty());
        let tick = *self.buckets.keys().next()?;
        self.now = self.now.max(tick);
        let mut bucket = self.buckets.remove(&tick).unwrap_or_default();
        let mut processed = 0;

        while let Some(actor) = bucket.pop_front() {
            match turn(actor) {
                TurnResult::Reschedule(cost) => {
                    processed += 1;
                    self.schedule(cost, actor);
                }
                TurnResult::Done => processed += 1,
                TurnResult::Yield => {
                    bucket.push_front(actor);
                    let front = self.buckets.entry(self.now).or_default();
                    while let Some(pending) = bucket.pop_back() {
                        front.push_front(pending);
                    }
                    tracing::trace!(tick = self.now, processed, "schedule yielded");
                    return Some(BucketReport { tick: self.now, processed, yielded: true });
                }
            }
        }

        Some(BucketReport { tick: self.now, processed, yielded: false })
    }
}
