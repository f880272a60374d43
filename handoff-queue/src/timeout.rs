//! Timeouts for blocking queue operations.

use std::time::{Duration, Instant};

/// How long a blocking operation may wait.
///
/// Mirrors the integer millisecond convention used by callers that pass
/// timeouts around as plain numbers: negative means forever, zero means a
/// non-blocking poll, anything else bounds the wait.
///
/// ```
/// use std::time::Duration;
/// use handoff_queue::Timeout;
///
/// assert_eq!(Timeout::from_millis(-1), Timeout::Forever);
/// assert_eq!(Timeout::from_millis(0), Timeout::NON_BLOCKING);
/// assert_eq!(Timeout::from_millis(250), Timeout::After(Duration::from_millis(250)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Wait until the operation can complete.
    #[default]
    Forever,
    /// Give up once this much time has passed.
    ///
    /// `Duration::ZERO` never waits.
    After(Duration),
}

impl Timeout {
    /// A timeout that never waits.
    pub const NON_BLOCKING: Self = Self::After(Duration::ZERO);

    /// Converts a millisecond count; negative values wait forever.
    pub fn from_millis(millis: i64) -> Self {
        u64::try_from(millis).map_or(Self::Forever, |ms| Self::After(Duration::from_millis(ms)))
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Self::After(duration)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(duration: Option<Duration>) -> Self {
        duration.map_or(Self::Forever, Self::After)
    }
}

/// A [`Timeout`] anchored to the moment the operation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Deadline {
    /// Check once, never wait.
    Poll,
    /// Wait indefinitely.
    Never,
    /// Wait until this instant.
    At(Instant),
}

impl Deadline {
    pub(crate) fn after(timeout: Timeout) -> Self {
        match timeout {
            Timeout::Forever => Self::Never,
            Timeout::After(d) if d.is_zero() => Self::Poll,
            // Unrepresentable instants are far enough away to mean forever
            Timeout::After(d) => Instant::now().checked_add(d).map_or(Self::Never, Self::At),
        }
    }

    pub(crate) fn expired(&self) -> bool {
        match self {
            Self::Poll => true,
            Self::Never => false,
            Self::At(at) => Instant::now() >= *at,
        }
    }
}
