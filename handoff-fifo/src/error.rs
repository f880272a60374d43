//! Error types for fifo operations.

use core::fmt;

/// Error returned when a value is put into a full fifo.
///
/// Carries the rejected value so the caller can retry or drop it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoFull<T>(pub T);

impl<T> FifoFull<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for FifoFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fifo is full")
    }
}

impl<T: fmt::Debug> std::error::Error for FifoFull<T> {}

/// Error returned when reading from an empty fifo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoEmpty;

impl fmt::Display for FifoEmpty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fifo is empty")
    }
}

impl std::error::Error for FifoEmpty {}

/// Error returned when a fifo is created with zero capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroCapacity;

impl fmt::Display for ZeroCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "capacity must be non-zero")
    }
}

impl std::error::Error for ZeroCapacity {}
