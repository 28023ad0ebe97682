//! Cooperative cancellable timers driven by the host event loop
//!
//! The queue owns its own clock. The host moves the clock forward with
//! [`TimerQueue::advance_to`] (typically `Instant::now()` once per loop
//! iteration) and due callbacks run synchronously inside that call. Tests use
//! [`TimerQueue::advance_by`] for deterministic time.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::time::{Duration, Instant};

/// Handle to a scheduled callback, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct ScheduledTimer {
    handle: TimerHandle,
    deadline: Instant,
    callback: Box<dyn FnOnce()>,
}

/// Single-threaded timer queue
pub struct TimerQueue {
    now: Cell<Instant>,
    next_id: Cell<u64>,
    timers: RefCell<Vec<ScheduledTimer>>,
}

impl TimerQueue {
    /// Create a queue whose clock starts at `Instant::now()`
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a queue whose clock starts at `start`
    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
            next_id: Cell::new(0),
            timers: RefCell::new(Vec::new()),
        }
    }

    /// Current time of the queue's clock
    pub fn now(&self) -> Instant {
        self.now.get()
    }

    /// Schedule `callback` to run once `delay` has elapsed on the queue's clock
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerHandle {
        let handle = TimerHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);
        self.timers.borrow_mut().push(ScheduledTimer {
            handle,
            deadline: self.now.get() + delay,
            callback: Box::new(callback),
        });
        handle
    }

    /// Cancel a scheduled callback. Returns false if it already ran or was
    /// already cancelled.
    pub fn clear_timeout(&self, handle: TimerHandle) -> bool {
        let mut timers = self.timers.borrow_mut();
        match timers.iter().position(|timer| timer.handle == handle) {
            Some(index) => {
                timers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers
            .borrow()
            .iter()
            .any(|timer| timer.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Earliest deadline among pending callbacks
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.borrow().iter().map(|timer| timer.deadline).min()
    }

    /// Move the clock forward by `delta` and run everything that became due
    pub fn advance_by(&self, delta: Duration) -> usize {
        self.advance_to(self.now.get() + delta)
    }

    /// Move the clock to `now` and run everything that became due
    ///
    /// Callbacks run in deadline order (ties in scheduling order), with the
    /// clock set to each callback's deadline while it runs. The clock never
    /// moves backwards. Returns the number of callbacks run.
    pub fn advance_to(&self, now: Instant) -> usize {
        let target = now.max(self.now.get());
        let mut fired = 0;

        while let Some(timer) = self.take_next_due(target) {
            self.now.set(timer.deadline.max(self.now.get()));
            (timer.callback)();
            fired += 1;
        }

        self.now.set(target);
        fired
    }

    fn take_next_due(&self, target: Instant) -> Option<ScheduledTimer> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= target)
            .min_by_key(|(_, timer)| (timer.deadline, timer.handle.0))
            .map(|(index, _)| index)?;
        Some(timers.remove(index))
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now.get())
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_fires_only_after_delay() {
        let queue = TimerQueue::new();
        let fired = Rc::new(Cell::new(false));

        let flag = fired.clone();
        let handle = queue.set_timeout(Duration::from_millis(500), move || flag.set(true));

        assert_eq!(queue.advance_by(Duration::from_millis(499)), 0);
        assert!(!fired.get());
        assert!(queue.is_pending(handle));

        assert_eq!(queue.advance_by(Duration::from_millis(1)), 1);
        assert!(fired.get());
        assert!(!queue.is_pending(handle));
    }

    #[test]
    fn test_clear_timeout() {
        let queue = TimerQueue::new();
        let fired = Rc::new(Cell::new(false));

        let flag = fired.clone();
        let handle = queue.set_timeout(Duration::from_millis(10), move || flag.set(true));

        assert!(queue.clear_timeout(handle));
        assert!(!queue.clear_timeout(handle));
        queue.advance_by(Duration::from_secs(1));
        assert!(!fired.get());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_deadline_order() {
        let queue = TimerQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (label, delay) in [("c", 30), ("a", 10), ("b", 20), ("a2", 10)] {
            let order = order.clone();
            queue.set_timeout(Duration::from_millis(delay), move || {
                order.borrow_mut().push(label)
            });
        }

        assert_eq!(queue.advance_by(Duration::from_millis(100)), 4);
        assert_eq!(*order.borrow(), vec!["a", "a2", "b", "c"]);
    }

    #[test]
    fn test_callback_can_reschedule() {
        let queue = Rc::new(TimerQueue::new());
        let count = Rc::new(Cell::new(0));

        let inner_queue = Rc::downgrade(&queue);
        let counter = count.clone();
        queue.set_timeout(Duration::from_millis(10), move || {
            counter.set(counter.get() + 1);
            if let Some(queue) = inner_queue.upgrade() {
                let counter = counter.clone();
                queue.set_timeout(Duration::from_millis(10), move || {
                    counter.set(counter.get() + 1)
                });
            }
        });

        // Second timer is scheduled relative to the first one's deadline
        assert_eq!(queue.advance_by(Duration::from_millis(15)), 1);
        assert_eq!(queue.advance_by(Duration::from_millis(5)), 1);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let start = Instant::now();
        let queue = TimerQueue::starting_at(start);
        queue.advance_by(Duration::from_millis(100));
        queue.advance_to(start);
        assert_eq!(queue.now(), start + Duration::from_millis(100));
    }

    #[test]
    fn test_next_deadline() {
        let start = Instant::now();
        let queue = TimerQueue::starting_at(start);
        assert!(queue.next_deadline().is_none());

        queue.set_timeout(Duration::from_millis(300), || {});
        queue.set_timeout(Duration::from_millis(100), || {});
        assert_eq!(
            queue.next_deadline(),
            Some(start + Duration::from_millis(100))
        );
    }
}
