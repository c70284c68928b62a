use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff used while waiting for the embedded editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        ReadinessPolicy {
            max_attempts: 15,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2000),
        }
    }
}

impl ReadinessPolicy {
    /// Delay to wait after failed attempt `attempt` (0-based):
    /// `min(initial_delay * 2^attempt, max_delay)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        1u32.checked_shl(attempt)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// The sleeps taken between attempts, in order. There is no sleep after
    /// the final attempt.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts.saturating_sub(1)).map(|attempt| self.delay_after(attempt))
    }

    /// Upper bound on the time spent sleeping before giving up.
    pub fn max_total_wait(&self) -> Duration {
        self.delays().sum()
    }
}

/// Result of a readiness poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub ready: bool,
    /// Number of times the check ran.
    pub attempts: u32,
}

/// What one readiness check observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Ready,
    Pending,
    /// Stop polling now; the outcome is not ready.
    Abandon,
}

impl From<bool> for Probe {
    fn from(ready: bool) -> Self {
        if ready {
            Probe::Ready
        } else {
            Probe::Pending
        }
    }
}

/// Call `check` until it reports ready, asks to abandon, or the attempt
/// budget is spent.
///
/// `check` receives the 0-based attempt index and must be a side-effect-free
/// query. Between pending attempts the poller sleeps according to `policy`.
pub async fn poll_until_ready<F, Fut>(policy: &ReadinessPolicy, mut check: F) -> PollOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future,
    Fut::Output: Into<Probe>,
{
    for attempt in 0..policy.max_attempts {
        match check(attempt).await.into() {
            Probe::Ready => {
                return PollOutcome {
                    ready: true,
                    attempts: attempt + 1,
                }
            }
            Probe::Abandon => {
                log::debug!("readiness polling abandoned after {} attempts", attempt + 1);
                return PollOutcome {
                    ready: false,
                    attempts: attempt + 1,
                };
            }
            Probe::Pending => {}
        }
        if attempt + 1 < policy.max_attempts {
            let delay = policy.delay_after(attempt);
            log::debug!(
                "readiness check {}/{} failed, retrying in {:?}",
                attempt + 1,
                policy.max_attempts,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    log::warn!(
        "readiness not reached after {} attempts",
        policy.max_attempts
    );
    PollOutcome {
        ready: false,
        attempts: policy.max_attempts,
    }
}
