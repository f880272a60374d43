//! Backing storage for [`Fifo`](crate::Fifo).
//!
//! The fifo only does index bookkeeping (`head`, `count`); the slots trait
//! decides how elements are physically held. Two layouts are provided:
//!
//! ```text
//! BoxedSlots<T>:  [Option<T>; capacity]   values owned per slot, dropped on clear
//! ByteSlots:      [u8; capacity]          raw bytes, left in place on clear
//! ```

/// Fixed-length slot array addressed by physical index.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Fixed length**: exactly `len` slots from `with_len` on
/// - **O(1)** write, take and get
///
/// Indices passed in are always below that length. The fifo only calls `take`
/// and `get` on slots it has written and not yet taken, and treats a `None`
/// from such a slot as a broken implementation.
pub trait Slots<T> {
    /// Allocates `len` empty slots.
    fn with_len(len: usize) -> Self;

    /// Stores `value` at `index`.
    fn write(&mut self, index: usize, value: T);

    /// Moves the value out of `index`.
    fn take(&mut self, index: usize) -> Option<T>;

    /// Borrows the value at `index`.
    fn get(&self, index: usize) -> Option<&T>;

    /// Called when the fifo is cleared.
    ///
    /// Implementations holding owned values should release them here.
    fn reset(&mut self);
}

// =============================================================================
// BoxedSlots - one optional value per slot
// =============================================================================

/// Slot array holding arbitrary values.
///
/// Every slot is an `Option<T>`, so taking a value leaves `None` behind and
/// [`reset`](Slots::reset) drops everything still held.
pub struct BoxedSlots<T> {
    slots: Box<[Option<T>]>,
}

impl<T> Slots<T> for BoxedSlots<T> {
    fn with_len(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }

    #[inline]
    fn write(&mut self, index: usize, value: T) {
        self.slots[index] = Some(value);
    }

    #[inline]
    fn take(&mut self, index: usize) -> Option<T> {
        self.slots[index].take()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        self.slots[index].as_ref()
    }

    fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }
}

// =============================================================================
// ByteSlots - flat byte buffer
// =============================================================================

/// Slot array of raw bytes.
///
/// Bytes are copied in and out; a cleared buffer keeps its old contents and
/// only the fifo's bookkeeping resets.
pub struct ByteSlots {
    bytes: Box<[u8]>,
}

impl ByteSlots {
    /// Raw view of the backing buffer, including stale bytes outside the
    /// fifo's live range.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Slots<u8> for ByteSlots {
    fn with_len(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len].into_boxed_slice(),
        }
    }

    #[inline]
    fn write(&mut self, index: usize, value: u8) {
        self.bytes[index] = value;
    }

    #[inline]
    fn take(&mut self, index: usize) -> Option<u8> {
        Some(self.bytes[index])
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&u8> {
        Some(&self.bytes[index])
    }

    fn reset(&mut self) {}
}
