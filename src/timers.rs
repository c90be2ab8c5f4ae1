//! Fire-and-forget timers for transient effects
//!
//! Sparks, toasts, delayed modals and the pedal cadence all run on this queue
//! instead of raw `setTimeout`, so tearing a game down is a single `clear()`
//! and a stale timer can never mutate state afterwards.

/// Handle returned by [`TimerQueue::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Pending<E> {
    handle: TimerHandle,
    deadline: f64,
    event: E,
}

/// Deadline-ordered queue of pending events (time in ms)
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    pending: Vec<Pending<E>>,
    next_id: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedule `event` to fire `delay_ms` after `now`
    pub fn schedule(&mut self, now: f64, delay_ms: f64, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let deadline = now + delay_ms.max(0.0);
        // Stable for equal deadlines: insert after existing ones
        let idx = self.pending.partition_point(|p| p.deadline <= deadline);
        self.pending.insert(
            idx,
            Pending {
                handle,
                deadline,
                event,
            },
        );
        handle
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.iter().position(|p| p.handle == handle) {
            Some(i) => {
                self.pending.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Remove and return every event due at `now`, in deadline order
    pub fn poll(&mut self, now: f64) -> Vec<E> {
        let due = self.pending.partition_point(|p| p.deadline <= now);
        self.pending.drain(..due).map(|p| p.event).collect()
    }

    /// Drop everything (component teardown / game reset)
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 300.0, "c");
        q.schedule(0.0, 100.0, "a");
        q.schedule(0.0, 200.0, "b");
        assert!(q.poll(50.0).is_empty());
        assert_eq!(q.poll(250.0), vec!["a", "b"]);
        assert_eq!(q.poll(1000.0), vec!["c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_equal_deadlines_keep_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 80.0, 1);
        q.schedule(0.0, 80.0, 2);
        q.schedule(0.0, 80.0, 3);
        assert_eq!(q.poll(80.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel() {
        let mut q = TimerQueue::new();
        let h = q.schedule(0.0, 100.0, ());
        assert!(q.is_pending(h));
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(q.poll(200.0).is_empty());
    }

    #[test]
    fn test_no_stale_callback_after_teardown() {
        let mut q = TimerQueue::new();
        for i in 0..8 {
            q.schedule(0.0, 80.0 * i as f64, i);
        }
        assert_eq!(q.poll(0.0), vec![0]);
        q.clear();
        assert!(q.poll(f64::MAX).is_empty());
    }
}
