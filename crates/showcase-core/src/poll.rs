use std::fmt::Display;
use std::thread;
use std::time::Duration;

pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Bounded fixed-interval polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Call `attempt` until it yields a value or the policy's attempts run out.
///
/// The closure receives the zero-based attempt number. A failed attempt is
/// logged and counts against the budget. The interval is waited between
/// attempts, never after the last one. Returns `None` when exhausted.
pub fn poll_until<T, E, F>(policy: &PollPolicy, mut attempt: F) -> Option<T>
where
    E: Display,
    F: FnMut(u32) -> std::result::Result<Option<T>, E>,
{
    for n in 0..policy.attempts {
        match attempt(n) {
            Ok(Some(value)) => return Some(value),
            Ok(None) => tracing::debug!(attempt = n + 1, "poll: not ready"),
            Err(e) => tracing::warn!(attempt = n + 1, error = %e, "poll attempt failed"),
        }

        if n + 1 < policy.attempts && !policy.interval.is_zero() {
            thread::sleep(policy.interval);
        }
    }

    None
}
