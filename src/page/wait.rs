//! Bounded polling, for content that shows up some time after load.

use std::time::Duration;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    Exhausted { attempts: u32 },
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Checks `check` up to `max_attempts` times, sleeping `interval` in between.
///
/// Never fails: running out of attempts is reported, not raised.
pub async fn poll_until<F>(policy: PollPolicy, mut check: F) -> PollOutcome
where
    F: FnMut() -> bool + Send,
{
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        if check() {
            return PollOutcome::Ready { attempts: attempt };
        }
        if attempt < max_attempts {
            debug!("Poll attempt {}/{} not ready", attempt, max_attempts);
            tokio::time::sleep(policy.interval).await;
        }
    }
    PollOutcome::Exhausted {
        attempts: max_attempts,
    }
}
