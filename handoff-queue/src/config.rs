//! Queue construction parameters.

/// Default number of backoff snooze iterations before parking.
///
/// Each snooze uses `crossbeam_utils::Backoff::snooze()` with the queue lock
/// released, which starts with spinning and eventually yields to the OS
/// scheduler.
pub const DEFAULT_SNOOZE_ITERS: usize = 4;

/// Configuration for [`Queue::with_config`](crate::Queue::with_config).
///
/// # Example
///
/// ```
/// use handoff_queue::{Queue, QueueConfig};
///
/// // Bounded at 64, spin longer before parking
/// let config = QueueConfig::default().with_max_size(64).with_snooze_iters(16);
/// let queue = Queue::<u32>::with_config(config);
/// assert_eq!(queue.max_size(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of held elements; `0` means unbounded.
    pub max_size: usize,
    /// Backoff iterations a blocking call spends re-checking before it parks.
    ///
    /// `0` parks straight away.
    pub snooze_iters: usize,
}

impl QueueConfig {
    /// Sets the maximum size (`0` = unbounded).
    #[must_use]
    pub const fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the number of backoff iterations before parking.
    #[must_use]
    pub const fn with_snooze_iters(mut self, snooze_iters: usize) -> Self {
        self.snooze_iters = snooze_iters;
        self
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_size: 0,
            snooze_iters: DEFAULT_SNOOZE_ITERS,
        }
    }
}
