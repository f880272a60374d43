//! A bounded multi-producer multi-consumer blocking queue.
//!
//! [`Queue`] is the handoff point between threads that produce data (an
//! interrupt or polling thread, a driver) and threads that consume it. Any
//! number of threads may `put` and `get` concurrently through a shared
//! reference, typically an `Arc<Queue<T>>`.
//!
//! # Design
//!
//! A single mutex guards the element sequence, with two condition variables
//! associated with it:
//!
//! ```text
//!  put() ──► [ lock ]──full?──► wait(not_full) ◄─────────── get()/clear() notify
//!                │
//!                └─ push_back ─► notify(not_empty) ───────► wakes a get()/peek()
//!
//!  get() ──► [ lock ]──empty?─► wait(not_empty) ◄────────── put() notify
//!                │
//!                └─ pop_front ─► notify(not_full) ────────► wakes a put()
//! ```
//!
//! Every wait releases the mutex while suspended and re-acquires it before
//! the condition is checked again, so producers never deadlock against each
//! other or against consumers.
//!
//! ## Backoff Before Parking
//!
//! Parking on a condition variable costs a syscall on both ends. Blocking
//! calls first try cheaper options:
//!
//! ```text
//! Phase 1: Fast path
//! ├── Check the condition under the lock
//! └── Succeeds when there is room / data already
//!
//! Phase 2: Backoff (lock released between rounds)
//! ├── crossbeam's Backoff::snooze(), then re-check under the lock
//! ├── Configurable iterations (default: 4)
//! └── Never runs past the caller's deadline
//!
//! Phase 3: Park
//! ├── Condvar wait, bounded by the deadline if there is one
//! └── Condition re-checked after every wake-up
//! ```
//!
//! Non-blocking calls (`try_*`, zero timeout, `block = false`) only run
//! phase 1.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use handoff_queue::Queue;
//!
//! let queue = Arc::new(Queue::bounded(4));
//!
//! let producer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         for i in 0..100u32 {
//!             queue.put(i); // blocks while 4 values are waiting
//!         }
//!     })
//! };
//!
//! let sum: u32 = (0..100).map(|_| queue.get()).sum();
//! producer.join().unwrap();
//! assert_eq!(sum, 4950);
//! ```
//!
//! # Timeouts
//!
//! ```
//! use std::time::Duration;
//! use handoff_queue::{Queue, QueueEmpty, QueueFull, Timeout};
//!
//! let queue = Queue::bounded(1);
//! queue.try_put('a').unwrap();
//!
//! // Non-blocking put fails immediately, handing the value back
//! assert_eq!(queue.try_put('b'), Err(QueueFull('b')));
//! assert_eq!(queue.put_timeout('b', Duration::from_millis(10)), Err(QueueFull('b')));
//!
//! // Integer millisecond convention: negative waits forever, 0 polls
//! assert_eq!(queue.get_with(Timeout::from_millis(-1)), Ok('a'));
//! assert_eq!(queue.get_with(Timeout::from_millis(0)), Err(QueueEmpty));
//! ```
//!
//! # Ordering
//!
//! Values are delivered in exactly the order their puts succeeded. Which of
//! several waiting threads wakes first is up to the condition variable; no
//! fairness between waiters is promised.
//!
//! # Lifetime
//!
//! There is no close operation. A thread blocked in `put`, `get` or `peek`
//! holds a reference to the queue, so the queue cannot be dropped while
//! anyone is waiting on it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod timeout;

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use crossbeam_utils::Backoff;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::trace;

pub use config::{DEFAULT_SNOOZE_ITERS, QueueConfig};
pub use error::{QueueEmpty, QueueFull};
pub use timeout::Timeout;

use timeout::Deadline;

/// A thread-safe FIFO queue with optional capacity bound.
///
/// Shared by reference between any number of producer and consumer
/// threads. With a max size of 0 the queue is unbounded and `put` never
/// blocks.
///
/// # Signalling
///
/// Each append signals one waiter on `not_empty`, each removal one waiter on
/// `not_full`, and [`clear`](Self::clear) / [`drain`](Self::drain) wake every
/// waiting producer. There is one extra `not_empty` signal: a peek that had
/// to wait leaves the value in place, so it signals `not_empty` once more
/// before returning. Without it the wake-up meant for a consumer could be
/// absorbed by the peek while the consumer sleeps next to a non-empty queue.
pub struct Queue<T> {
    items: Mutex<VecDeque<T>>,
    /// Signalled when a value is appended.
    not_empty: Condvar,
    /// Signalled when a value is removed or the queue is cleared.
    not_full: Condvar,
    max_size: usize,
    snooze_iters: usize,
}

impl<T> Queue<T> {
    /// Creates a queue holding at most `max_size` values; `0` means unbounded.
    ///
    /// # Example
    ///
    /// ```
    /// use handoff_queue::Queue;
    ///
    /// let bounded = Queue::<u8>::new(16);
    /// assert!(bounded.is_bounded());
    ///
    /// let unbounded = Queue::<u8>::new(0);
    /// assert!(!unbounded.is_bounded());
    /// ```
    pub fn new(max_size: usize) -> Self {
        Self::with_config(QueueConfig::default().with_max_size(max_size))
    }

    /// Creates a queue with no capacity bound.
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Creates a queue holding at most `max_size` values.
    ///
    /// # Panics
    ///
    /// Panics if `max_size` is 0. Use [`unbounded`](Self::unbounded) for a
    /// queue without a bound.
    pub fn bounded(max_size: usize) -> Self {
        assert!(max_size > 0, "max size must be non-zero");
        Self::new(max_size)
    }

    /// Creates a queue from explicit configuration.
    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            max_size: config.max_size,
            snooze_iters: config.snooze_iters,
        }
    }

    /// Maximum number of held values, `0` if unbounded.
    #[inline]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns `true` if the queue has a capacity bound.
    #[inline]
    pub const fn is_bounded(&self) -> bool {
        self.max_size > 0
    }

    #[inline]
    const fn at_capacity(&self, len: usize) -> bool {
        self.max_size > 0 && len >= self.max_size
    }

    // ========================================================================
    // Advisory queries
    // ========================================================================

    /// Number of values currently held.
    ///
    /// The value may be stale as soon as the lock is released: `qsize() > 0`
    /// does not guarantee a following `get` will not block.
    pub fn qsize(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` if a put would currently block. Always `false` for
    /// unbounded queues. Advisory, like [`qsize`](Self::qsize).
    pub fn full(&self) -> bool {
        self.at_capacity(self.items.lock().len())
    }

    /// Returns `true` if a get would currently block. Advisory, like
    /// [`qsize`](Self::qsize).
    pub fn empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    // ========================================================================
    // Put
    // ========================================================================

    /// Appends `value`, waiting for as long as the queue is full.
    pub fn put(&self, value: T) {
        let mut items = self.items.lock();
        while self.at_capacity(items.len()) {
            self.wait(&mut items, &self.not_full, Deadline::Never, "put", |q| {
                self.at_capacity(q.len())
            });
        }
        self.push(&mut items, value);
    }

    /// Appends `value` only if there is room right now.
    ///
    /// # Errors
    ///
    /// Returns `Err(QueueFull(value))` if the queue is full.
    pub fn try_put(&self, value: T) -> Result<(), QueueFull<T>> {
        self.put_until(value, Deadline::Poll)
    }

    /// Appends `value`, waiting at most `timeout` for room.
    ///
    /// # Errors
    ///
    /// Returns `Err(QueueFull(value))` if the queue is still full when the
    /// timeout elapses.
    pub fn put_timeout(&self, value: T, timeout: Duration) -> Result<(), QueueFull<T>> {
        self.put_until(value, Deadline::after(Timeout::After(timeout)))
    }

    /// Appends `value` with explicit blocking behaviour.
    ///
    /// With `block == false` this is [`try_put`](Self::try_put) and `timeout`
    /// is ignored. Otherwise the call waits for room according to `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `Err(QueueFull(value))` if there was no room in time.
    ///
    /// # Example
    ///
    /// ```
    /// use handoff_queue::{Queue, QueueFull, Timeout};
    ///
    /// let queue = Queue::bounded(1);
    /// queue.put_with(1, true, Timeout::Forever).unwrap();
    /// assert_eq!(queue.put_with(2, false, Timeout::Forever), Err(QueueFull(2)));
    /// assert_eq!(queue.put_with(2, true, Timeout::from_millis(5)), Err(QueueFull(2)));
    /// ```
    pub fn put_with(&self, value: T, block: bool, timeout: Timeout) -> Result<(), QueueFull<T>> {
        let deadline = if block {
            Deadline::after(timeout)
        } else {
            Deadline::Poll
        };
        self.put_until(value, deadline)
    }

    fn put_until(&self, value: T, deadline: Deadline) -> Result<(), QueueFull<T>> {
        let mut items = self.items.lock();
        let ready = self.wait(&mut items, &self.not_full, deadline, "put", |q| {
            self.at_capacity(q.len())
        });
        if !ready {
            return Err(QueueFull(value));
        }
        self.push(&mut items, value);
        Ok(())
    }

    #[inline]
    fn push(&self, items: &mut VecDeque<T>, value: T) {
        items.push_back(value);
        self.not_empty.notify_one();
    }

    // ========================================================================
    // Get
    // ========================================================================

    /// Removes and returns the oldest value, waiting for as long as the queue
    /// is empty.
    pub fn get(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(value) = self.pop(&mut items) {
                return value;
            }
            self.wait(&mut items, &self.not_empty, Deadline::Never, "get", VecDeque::is_empty);
        }
    }

    /// Removes and returns the oldest value if there is one right now.
    ///
    /// # Errors
    ///
    /// Returns [`QueueEmpty`] if the queue is empty.
    pub fn try_get(&self) -> Result<T, QueueEmpty> {
        self.get_until(Deadline::Poll)
    }

    /// Removes and returns the oldest value, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueEmpty`] if nothing arrived before the timeout.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, QueueEmpty> {
        self.get_until(Deadline::after(Timeout::After(timeout)))
    }

    /// Removes and returns the oldest value, waiting according to `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueEmpty`] if nothing arrived in time.
    pub fn get_with(&self, timeout: Timeout) -> Result<T, QueueEmpty> {
        self.get_until(Deadline::after(timeout))
    }

    fn get_until(&self, deadline: Deadline) -> Result<T, QueueEmpty> {
        let mut items = self.items.lock();
        self.wait(&mut items, &self.not_empty, deadline, "get", VecDeque::is_empty);
        self.pop(&mut items).ok_or(QueueEmpty)
    }

    #[inline]
    fn pop(&self, items: &mut VecDeque<T>) -> Option<T> {
        let value = items.pop_front()?;
        self.not_full.notify_one();
        Some(value)
    }

    // ========================================================================
    // Clear / Drain
    // ========================================================================

    /// Drops every held value and wakes producers waiting for room.
    ///
    /// Consumers blocked in `get` or `peek` stay blocked: the queue is empty.
    pub fn clear(&self) {
        let dropped = self.take_all();
        trace!(dropped = dropped.len(), "queue cleared");
    }

    /// Removes and returns every held value in FIFO order.
    ///
    /// Wakes producers waiting for room, like [`clear`](Self::clear).
    pub fn drain(&self) -> Vec<T> {
        self.take_all().into()
    }

    fn take_all(&self) -> VecDeque<T> {
        let mut items = self.items.lock();
        let taken = std::mem::take(&mut *items);
        // Up to max_size slots opened at once
        self.not_full.notify_all();
        drop(items);
        taken
    }

    // ========================================================================
    // Waiting
    // ========================================================================

    /// Waits on `condvar` while `blocked` holds, until `deadline`.
    ///
    /// Returns `true` once `blocked` is false. Returns `false` if the deadline
    /// passed first; the condition is always re-checked before giving up.
    fn wait<F>(
        &self,
        items: &mut MutexGuard<'_, VecDeque<T>>,
        condvar: &Condvar,
        deadline: Deadline,
        op: &'static str,
        blocked: F,
    ) -> bool
    where
        F: Fn(&VecDeque<T>) -> bool,
    {
        if !blocked(&**items) {
            return true;
        }
        if deadline == Deadline::Poll {
            return false;
        }

        // Backoff phase
        let backoff = Backoff::new();
        for _ in 0..self.snooze_iters {
            MutexGuard::unlocked(items, || backoff.snooze());
            if !blocked(&**items) {
                return true;
            }
            if deadline.expired() {
                return false;
            }
        }

        // Park phase
        trace!(op, len = items.len(), max_size = self.max_size, "parking");
        loop {
            match deadline {
                Deadline::At(at) => {
                    let _ = condvar.wait_until(items, at);
                }
                Deadline::Never | Deadline::Poll => condvar.wait(items),
            }
            if !blocked(&**items) {
                return true;
            }
            if deadline.expired() {
                trace!(op, len = items.len(), "deadline passed");
                return false;
            }
        }
    }
}

impl<T: Clone> Queue<T> {
    /// Returns a clone of the oldest value without removing it, waiting for
    /// as long as the queue is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use handoff_queue::Queue;
    ///
    /// let queue = Queue::unbounded();
    /// queue.put("first".to_string());
    /// assert_eq!(queue.peek(), "first");
    /// assert_eq!(queue.qsize(), 1);
    /// ```
    pub fn peek(&self) -> T {
        let mut items = self.items.lock();
        let waited = items.is_empty();
        loop {
            if let Some(value) = items.front().cloned() {
                self.pass_on_peek(waited);
                return value;
            }
            self.wait(&mut items, &self.not_empty, Deadline::Never, "peek", VecDeque::is_empty);
        }
    }

    /// Returns a clone of the oldest value if there is one right now.
    ///
    /// # Errors
    ///
    /// Returns [`QueueEmpty`] if the queue is empty.
    pub fn try_peek(&self) -> Result<T, QueueEmpty> {
        self.peek_until(Deadline::Poll)
    }

    /// Returns a clone of the oldest value, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueEmpty`] if nothing arrived before the timeout.
    pub fn peek_timeout(&self, timeout: Duration) -> Result<T, QueueEmpty> {
        self.peek_until(Deadline::after(Timeout::After(timeout)))
    }

    /// Returns a clone of the oldest value, waiting according to `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueEmpty`] if nothing arrived in time.
    pub fn peek_with(&self, timeout: Timeout) -> Result<T, QueueEmpty> {
        self.peek_until(Deadline::after(timeout))
    }

    fn peek_until(&self, deadline: Deadline) -> Result<T, QueueEmpty> {
        let mut items = self.items.lock();
        let waited = items.is_empty();
        self.wait(&mut items, &self.not_empty, deadline, "peek", VecDeque::is_empty);
        let value = items.front().cloned().ok_or(QueueEmpty)?;
        self.pass_on_peek(waited);
        Ok(value)
    }

    /// A peek that waited may have absorbed the `not_empty` signal meant for
    /// a consumer; the value is still there, so hand the signal on.
    #[inline]
    fn pass_on_peek(&self, waited: bool) {
        if waited {
            self.not_empty.notify_one();
        }
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("max_size", &self.max_size)
            .field("qsize", &self.qsize())
            .finish_non_exhaustive()
    }
}
