//! # handoff-fifo
//!
//! Fixed-capacity, single-owner FIFO ring buffer.
//!
//! The fifo never grows and never overwrites: a `put` on a full buffer hands
//! the value back in [`FifoFull`], a `get` or `peek` on an empty buffer returns
//! [`FifoEmpty`]. There is no internal locking. Every mutation takes
//! `&mut self`, so exclusive access is checked by the compiler; sharing one
//! across threads requires an external lock.
//!
//! ## Layout
//!
//! ```text
//!            head             head + count
//!             │                    │
//!   ┌────┬────┼────┬────┬────┬────┼────┬────┐
//!   │    │    │ x0 │ x1 │ x2 │ x3 │    │    │   capacity = 8, count = 4
//!   └────┴────┴────┴────┴────┴────┴────┴────┘
//!             get() reads here     put() writes here (mod capacity)
//! ```
//!
//! ## Storage
//!
//! Element storage is pluggable through [`Slots`]:
//!
//! - [`Fifo<T>`] uses [`BoxedSlots`], an array of `Option<T>`; clearing drops
//!   every held value.
//! - [`ByteFifo`] uses [`ByteSlots`], a flat `[u8]`; clearing only resets the
//!   bookkeeping and leaves the bytes in place.
//!
//! ## Example
//!
//! ```
//! use handoff_fifo::{Fifo, FifoFull};
//!
//! let mut fifo = Fifo::with_capacity(2);
//!
//! fifo.put("a").unwrap();
//! fifo.put("b").unwrap();
//! assert_eq!(fifo.put("c"), Err(FifoFull("c")));
//!
//! assert_eq!(fifo.peek(), Ok(&"a"));
//! assert_eq!(fifo.get(), Ok("a"));
//! assert_eq!(fifo.get(), Ok("b"));
//! assert!(fifo.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod slots;

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

pub use error::{FifoEmpty, FifoFull, ZeroCapacity};
pub use slots::{BoxedSlots, ByteSlots, Slots};

/// Capacity used by [`Fifo::new`] and the [`ByteFifo`] default.
pub const DEFAULT_CAPACITY: usize = 16;

/// A fifo of raw bytes.
pub type ByteFifo = Fifo<u8, ByteSlots>;

/// Fixed-capacity FIFO ring buffer.
///
/// Elements occupy the physical slots `[head, head + count)` modulo
/// capacity. `head` always stays below capacity.
pub struct Fifo<T, S: Slots<T> = BoxedSlots<T>> {
    slots: S,
    capacity: usize,
    head: usize,
    count: usize,
    _marker: PhantomData<T>,
}

impl<T> Fifo<T> {
    /// Creates a fifo holding up to [`DEFAULT_CAPACITY`] values.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a fifo holding up to `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    ///
    /// # Example
    ///
    /// ```
    /// use handoff_fifo::Fifo;
    ///
    /// let fifo = Fifo::<String>::with_capacity(100);
    /// assert_eq!(fifo.capacity(), 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be non-zero");
        Self::allocate(capacity)
    }

    /// Creates a fifo holding up to `capacity` values.
    ///
    /// # Errors
    ///
    /// Returns [`ZeroCapacity`] if `capacity` is 0.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, ZeroCapacity> {
        if capacity == 0 {
            return Err(ZeroCapacity);
        }
        Ok(Self::allocate(capacity))
    }
}

impl<T> Default for Fifo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteFifo {
    /// Creates a byte fifo holding up to `capacity` bytes.
    ///
    /// Bytes are stored in a flat buffer instead of per-slot boxes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    ///
    /// # Example
    ///
    /// ```
    /// use handoff_fifo::Fifo;
    ///
    /// let mut fifo = Fifo::bytes(8);
    /// fifo.put(0x7e).unwrap();
    /// assert_eq!(fifo.get(), Ok(0x7e));
    /// ```
    pub fn bytes(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be non-zero");
        Self::allocate(capacity)
    }

    /// Creates a byte fifo holding up to `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ZeroCapacity`] if `capacity` is 0.
    pub fn try_bytes(capacity: usize) -> Result<Self, ZeroCapacity> {
        if capacity == 0 {
            return Err(ZeroCapacity);
        }
        Ok(Self::allocate(capacity))
    }

    /// Puts every byte of `bytes`, stopping at the first one that does not fit.
    ///
    /// Same partial semantics as [`put_all`](Fifo::put_all).
    ///
    /// # Errors
    ///
    /// Returns [`FifoFull`] with the first rejected byte.
    ///
    /// # Example
    ///
    /// ```
    /// use handoff_fifo::{Fifo, FifoFull};
    ///
    /// let mut fifo = Fifo::bytes(4);
    /// assert_eq!(fifo.put_slice(b"hello"), Err(FifoFull(b'o')));
    /// assert_eq!(fifo.drain().collect::<Vec<_>>(), b"hell");
    /// ```
    pub fn put_slice(&mut self, bytes: &[u8]) -> Result<(), FifoFull<u8>> {
        self.put_all(bytes.iter().copied())
    }

    /// Raw view of the whole backing buffer.
    ///
    /// Includes bytes outside the live range, e.g. those left behind by
    /// [`clear`](Fifo::clear).
    pub fn raw_bytes(&self) -> &[u8] {
        self.slots.as_bytes()
    }
}

impl Default for ByteFifo {
    fn default() -> Self {
        Self::bytes(DEFAULT_CAPACITY)
    }
}

impl<T, S: Slots<T>> Fifo<T, S> {
    fn allocate(capacity: usize) -> Self {
        Self {
            slots: S::with_len(capacity),
            capacity,
            head: 0,
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Physical slot of the `offset`-th element from the head.
    #[inline]
    fn slot(&self, offset: usize) -> usize {
        let index = self.head + offset;
        if index >= self.capacity {
            index - self.capacity
        } else {
            index
        }
    }

    /// Returns `true` if no more values fit.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// Returns `true` if the fifo holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of values currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Number of values currently held. Same as [`len`](Self::len).
    #[inline]
    pub fn elements(&self) -> usize {
        self.count
    }

    /// Maximum number of values the fifo can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `value` at the tail.
    ///
    /// # Errors
    ///
    /// Returns `Err(FifoFull(value))` if the fifo is full. Nothing is
    /// overwritten and the fifo is left unchanged.
    #[inline]
    pub fn put(&mut self, value: T) -> Result<(), FifoFull<T>> {
        if self.is_full() {
            return Err(FifoFull(value));
        }
        let tail = self.slot(self.count);
        self.slots.write(tail, value);
        self.count += 1;
        Ok(())
    }

    /// Removes and returns the value at the head.
    ///
    /// # Errors
    ///
    /// Returns [`FifoEmpty`] if there is nothing to read.
    ///
    /// # Panics
    ///
    /// Panics if the storage has no value in a slot the fifo counts as live.
    #[inline]
    pub fn get(&mut self) -> Result<T, FifoEmpty> {
        if self.is_empty() {
            return Err(FifoEmpty);
        }
        let Some(value) = self.slots.take(self.head) else {
            unreachable!("live slot {} holds no value", self.head);
        };
        self.head = self.slot(1);
        self.count -= 1;
        Ok(value)
    }

    /// Borrows the value at the head without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`FifoEmpty`] if there is nothing to read.
    ///
    /// # Panics
    ///
    /// Panics if the storage has no value in a slot the fifo counts as live.
    #[inline]
    pub fn peek(&self) -> Result<&T, FifoEmpty> {
        if self.is_empty() {
            return Err(FifoEmpty);
        }
        match self.slots.get(self.head) {
            Some(value) => Ok(value),
            None => unreachable!("live slot {} holds no value", self.head),
        }
    }

    /// Puts every value from `values` in order.
    ///
    /// Stops at the first value that does not fit. Values put before that
    /// point stay in the fifo; values after it are never pulled from the
    /// iterator.
    ///
    /// # Errors
    ///
    /// Returns [`FifoFull`] carrying the first rejected value.
    ///
    /// # Example
    ///
    /// ```
    /// use handoff_fifo::{Fifo, FifoFull};
    ///
    /// let mut fifo = Fifo::with_capacity(2);
    /// assert_eq!(fifo.put_all(['a', 'b', 'c']), Err(FifoFull('c')));
    ///
    /// // Partial insert is kept
    /// assert_eq!(fifo.get(), Ok('a'));
    /// assert_eq!(fifo.get(), Ok('b'));
    /// ```
    pub fn put_all<I>(&mut self, values: I) -> Result<(), FifoFull<T>>
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.put(value)?;
        }
        Ok(())
    }

    /// Empties the fifo.
    ///
    /// Resets `head` and `count` to zero and lets the storage release what it
    /// holds: boxed slots drop their values, byte slots keep their contents.
    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
        self.slots.reset();
    }

    /// Iterates over held values from head to tail without removing them.
    pub fn iter(&self) -> Iter<'_, T, S> {
        Iter {
            fifo: self,
            offset: 0,
        }
    }

    /// Removes values from head to tail as the iterator advances.
    ///
    /// Whatever is left when the iterator is dropped is cleared as well.
    pub fn drain(&mut self) -> Drain<'_, T, S> {
        Drain { fifo: self }
    }
}

impl<T, S: Slots<T>> fmt::Debug for Fifo<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fifo")
            .field("capacity", &self.capacity)
            .field("len", &self.count)
            .finish_non_exhaustive()
    }
}

impl<'a, T, S: Slots<T>> IntoIterator for &'a Fifo<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Iterators
// ============================================================================

/// Borrowing iterator returned by [`Fifo::iter`].
pub struct Iter<'a, T, S: Slots<T>> {
    fifo: &'a Fifo<T, S>,
    offset: usize,
}

impl<'a, T, S: Slots<T>> Iterator for Iter<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset == self.fifo.count {
            return None;
        }
        let index = self.fifo.slot(self.offset);
        self.offset += 1;
        self.fifo.slots.get(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.fifo.count - self.offset;
        (remaining, Some(remaining))
    }
}

impl<T, S: Slots<T>> ExactSizeIterator for Iter<'_, T, S> {}

impl<T, S: Slots<T>> FusedIterator for Iter<'_, T, S> {}

/// Draining iterator returned by [`Fifo::drain`].
pub struct Drain<'a, T, S: Slots<T>> {
    fifo: &'a mut Fifo<T, S>,
}

impl<T, S: Slots<T>> Iterator for Drain<'_, T, S> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.fifo.get().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.fifo.count, Some(self.fifo.count))
    }
}

impl<T, S: Slots<T>> ExactSizeIterator for Drain<'_, T, S> {}

impl<T, S: Slots<T>> FusedIterator for Drain<'_, T, S> {}

impl<T, S: Slots<T>> Drop for Drain<'_, T, S> {
    fn drop(&mut self) {
        self.fifo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Basic Operations
    // ============================================================================

    #[test]
    fn default_capacity() {
        let fifo = Fifo::<u32>::new();
        assert_eq!(fifo.capacity(), DEFAULT_CAPACITY);
        assert!(fifo.is_empty());
        assert!(!fifo.is_full());

        let bytes = ByteFifo::default();
        assert_eq!(bytes.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn put_get_peek() {
        let mut fifo = Fifo::with_capacity(4);

        fifo.put(1).unwrap();
        fifo.put(2).unwrap();
        assert_eq!(fifo.elements(), 2);

        assert_eq!(fifo.peek(), Ok(&1));
        assert_eq!(fifo.elements(), 2);

        assert_eq!(fifo.get(), Ok(1));
        assert_eq!(fifo.get(), Ok(2));
        assert_eq!(fifo.elements(), 0);
    }

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(Fifo::<u8>::try_with_capacity(0).err(), Some(ZeroCapacity));
        assert_eq!(Fifo::try_bytes(0).err(), Some(ZeroCapacity));
        assert!(Fifo::try_bytes(1).is_ok());
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn zero_capacity_panics() {
        let _ = Fifo::<u8>::with_capacity(0);
    }

    // ============================================================================
    // Boundaries
    // ============================================================================

    #[test]
    fn full_put_leaves_state_unchanged() {
        let mut fifo = Fifo::with_capacity(2);
        fifo.put(10).unwrap();
        fifo.put(20).unwrap();
        assert!(fifo.is_full());

        assert_eq!(fifo.put(30), Err(FifoFull(30)));
        assert_eq!(fifo.elements(), 2);
        assert_eq!(fifo.get(), Ok(10));
        assert_eq!(fifo.get(), Ok(20));
    }

    #[test]
    fn empty_get_and_peek_fail() {
        let mut fifo = Fifo::<u32>::with_capacity(2);

        assert_eq!(fifo.get(), Err(FifoEmpty));
        assert_eq!(fifo.peek(), Err(FifoEmpty));
        assert_eq!(fifo.elements(), 0);

        fifo.put(1).unwrap();
        fifo.get().unwrap();
        assert_eq!(fifo.get(), Err(FifoEmpty));
    }

    #[test]
    fn capacity_one() {
        let mut fifo = Fifo::with_capacity(1);

        for i in 0..100 {
            fifo.put(i).unwrap();
            assert!(fifo.is_full());
            assert_eq!(fifo.put(i + 1), Err(FifoFull(i + 1)));
            assert_eq!(fifo.get(), Ok(i));
        }
    }

    // ============================================================================
    // Wraparound
    // ============================================================================

    #[test]
    fn wraps_around_odd_capacity() {
        let mut fifo = Fifo::with_capacity(3);

        // 100 values through 3 slots, never more than 2 resident
        fifo.put(0u32).unwrap();
        for i in 1..100 {
            fifo.put(i).unwrap();
            assert_eq!(fifo.get(), Ok(i - 1));
            assert!(fifo.head < fifo.capacity);
        }
        assert_eq!(fifo.get(), Ok(99));
    }

    #[test]
    fn iter_follows_logical_order_across_wrap() {
        let mut fifo = Fifo::with_capacity(4);
        fifo.put_all([1, 2, 3]).unwrap();
        fifo.get().unwrap();
        fifo.get().unwrap();
        fifo.put_all([4, 5, 6]).unwrap();

        let seen: Vec<_> = fifo.iter().copied().collect();
        assert_eq!(seen, vec![3, 4, 5, 6]);
        assert_eq!(fifo.iter().len(), 4);
    }

    // ============================================================================
    // put_all
    // ============================================================================

    #[test]
    fn put_all_is_partial() {
        let mut fifo = Fifo::with_capacity(2);

        assert_eq!(fifo.put_all(["a", "b", "c"]), Err(FifoFull("c")));
        assert_eq!(fifo.get(), Ok("a"));
        assert_eq!(fifo.get(), Ok("b"));
        assert_eq!(fifo.get(), Err(FifoEmpty));
    }

    #[test]
    fn put_all_stops_pulling_after_failure() {
        let mut fifo = Fifo::with_capacity(1);
        let mut source = 0..10;

        assert_eq!(fifo.put_all(source.by_ref()), Err(FifoFull(1)));
        assert_eq!(source.next(), Some(2));
    }

    // ============================================================================
    // Clear / Drain
    // ============================================================================

    #[test]
    fn clear_drops_boxed_values() {
        use std::rc::Rc;

        let tracked = Rc::new(());
        let mut fifo = Fifo::with_capacity(4);
        fifo.put(Rc::clone(&tracked)).unwrap();
        fifo.put(Rc::clone(&tracked)).unwrap();
        assert_eq!(Rc::strong_count(&tracked), 3);

        fifo.clear();
        assert_eq!(Rc::strong_count(&tracked), 1);
        assert!(fifo.is_empty());
        assert_eq!(fifo.head, 0);
    }

    #[test]
    fn clear_keeps_raw_bytes() {
        let mut fifo = Fifo::bytes(4);
        fifo.put_slice(&[1, 2, 3]).unwrap();
        fifo.get().unwrap();

        fifo.clear();
        assert!(fifo.is_empty());
        assert_eq!(fifo.raw_bytes(), &[1, 2, 3, 0]);

        fifo.put(9).unwrap();
        assert_eq!(fifo.peek(), Ok(&9));
        assert_eq!(fifo.raw_bytes(), &[9, 2, 3, 0]);
    }

    #[test]
    fn drain_removes_everything_even_if_dropped_early() {
        let mut fifo = Fifo::with_capacity(4);
        fifo.put_all([1, 2, 3, 4]).unwrap();

        let mut drain = fifo.drain();
        assert_eq!(drain.len(), 4);
        assert_eq!(drain.next(), Some(1));
        drop(drain);

        assert!(fifo.is_empty());
        fifo.put_all([5, 6, 7, 8]).unwrap();
        assert_eq!(fifo.drain().collect::<Vec<_>>(), vec![5, 6, 7, 8]);
    }

    #[test]
    fn values_dropped_with_fifo() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        #[derive(Debug)]
        struct DropCounter;
        impl Drop for DropCounter {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        let mut fifo = Fifo::with_capacity(4);
        fifo.put(DropCounter).unwrap();
        fifo.put(DropCounter).unwrap();
        drop(fifo.get());
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 1);

        drop(fifo);
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 2);
    }

    // ============================================================================
    // Storage Invariants
    // ============================================================================

    /// Accepts writes but never hands anything back.
    struct LosingSlots;

    impl Slots<u32> for LosingSlots {
        fn with_len(_len: usize) -> Self {
            Self
        }

        fn write(&mut self, _index: usize, _value: u32) {}

        fn take(&mut self, _index: usize) -> Option<u32> {
            None
        }

        fn get(&self, _index: usize) -> Option<&u32> {
            None
        }

        fn reset(&mut self) {}
    }

    #[test]
    #[should_panic(expected = "live slot 0 holds no value")]
    fn lost_value_on_get_panics() {
        let mut fifo = Fifo::<u32, LosingSlots>::allocate(2);
        fifo.put(1).unwrap();
        let _ = fifo.get();
    }

    #[test]
    #[should_panic(expected = "live slot 0 holds no value")]
    fn lost_value_on_peek_panics() {
        let mut fifo = Fifo::<u32, LosingSlots>::allocate(2);
        fifo.put(1).unwrap();
        let _ = fifo.peek();
    }

    #[test]
    fn empty_get_with_losing_storage_is_still_empty() {
        let mut fifo = Fifo::<u32, LosingSlots>::allocate(2);
        assert_eq!(fifo.get(), Err(FifoEmpty));
        assert_eq!(fifo.peek(), Err(FifoEmpty));
    }

    #[test]
    fn debug_reports_occupancy() {
        let mut fifo = Fifo::with_capacity(3);
        fifo.put(1u8).unwrap();

        let text = format!("{fifo:?}");
        assert!(text.contains("capacity: 3"));
        assert!(text.contains("len: 1"));
    }
}
