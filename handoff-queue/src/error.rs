//! Error types for queue operations.

use core::fmt;

/// Error returned when a value cannot be put because the queue stayed full.
///
/// Returned immediately by non-blocking puts, or once a timed put's deadline
/// passes. Contains the value so it is never silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull<T>(pub T);

impl<T> QueueFull<T> {
    /// Returns the value that could not be put.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is full")
    }
}

impl<T: fmt::Debug> std::error::Error for QueueFull<T> {}

/// Error returned when nothing arrived before the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEmpty;

impl fmt::Display for QueueEmpty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is empty")
    }
}

impl std::error::Error for QueueEmpty {}
