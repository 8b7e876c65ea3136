//! Virtual-time timer queue.
//!
//! Every delayed transition in the core (phase two of a mode switch, the
//! health degrade/recover chain) is a scheduled event here. Time only moves
//! when the owner calls [`TimerQueue::pop_due`] with a later horizon or
//! [`TimerQueue::set_now`], so tests are deterministic and a host can map
//! virtual time onto a real clock.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

struct Scheduled<E> {
    due: Duration,
    seq: u64,
    event: E,
}

// Min-heap by (due, seq): earliest first, FIFO among equal deadlines.
impl<E> Ord for Scheduled<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Scheduled<E> {}

/// Scheduled events over a monotonically advancing virtual clock.
pub struct TimerQueue<E> {
    now: Duration,
    next_seq: u64,
    heap: BinaryHeap<Scheduled<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for TimerQueue<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now)
            .field("pending", &self.heap.len())
            .finish()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Current virtual time since the queue was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Schedule `event` to fire `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            due: self.now + delay,
            seq,
            event,
        });
    }

    /// Deadline of the earliest pending event.
    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|s| s.due)
    }

    /// Pop the earliest event due at or before `horizon`, moving the clock
    /// to its deadline.
    ///
    /// Call in a loop: an event handled between pops may schedule further
    /// events that are themselves due before `horizon`.
    pub fn pop_due(&mut self, horizon: Duration) -> Option<E> {
        if self.heap.peek()?.due > horizon {
            return None;
        }
        let scheduled = self.heap.pop()?;
        self.now = self.now.max(scheduled.due);
        Some(scheduled.event)
    }

    /// Move the clock forward to `at`. Never moves backwards.
    pub fn set_now(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(300), "c");
        queue.schedule(ms(100), "a");
        queue.schedule(ms(200), "b");

        let mut fired = Vec::new();
        while let Some(event) = queue.pop_due(ms(1_000)) {
            fired.push((event, queue.now()));
        }
        assert_eq!(fired, vec![("a", ms(100)), ("b", ms(200)), ("c", ms(300))]);
    }

    #[test]
    fn test_equal_deadlines_are_fifo() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(50), 1);
        queue.schedule(ms(50), 2);
        queue.schedule(ms(50), 3);
        assert_eq!(queue.pop_due(ms(50)), Some(1));
        assert_eq!(queue.pop_due(ms(50)), Some(2));
        assert_eq!(queue.pop_due(ms(50)), Some(3));
    }

    #[test]
    fn test_horizon_holds_back_future_events() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(500), ());
        assert!(queue.pop_due(ms(499)).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(ms(500)));
        assert!(queue.pop_due(ms(500)).is_some());
    }

    #[test]
    fn test_chained_scheduling_is_relative_to_fire_time() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(1_500), "first");
        assert_eq!(queue.pop_due(ms(10_000)), Some("first"));
        queue.schedule(ms(4_000), "second");
        assert_eq!(queue.next_due(), Some(ms(5_500)));
    }

    #[test]
    fn test_set_now_is_monotonic() {
        let mut queue: TimerQueue<()> = TimerQueue::new();
        queue.set_now(ms(100));
        queue.set_now(ms(50));
        assert_eq!(queue.now(), ms(100));
    }
}
