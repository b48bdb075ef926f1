//! Exponential reconnect backoff.

use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Doubling delay between `base` and `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let max = max.max(base);
        Self {
            base,
            max,
            current: base,
        }
    }

    /// Returns the delay to wait now and doubles the next one, up to `max`.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = next_backoff(self.current, self.max);
        delay
    }

    /// The delay [`next_delay`](Self::next_delay) would return.
    pub fn peek(&self) -> Duration {
        self.current
    }

    /// Back to `base`, after a success.
    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

fn next_backoff(current: Duration, max_backoff: Duration) -> Duration {
    if current.is_zero() {
        return max_backoff.min(Duration::from_millis(1));
    }

    let next = current.saturating_mul(2);
    if next > max_backoff {
        max_backoff
    } else {
        next
    }
}

/// Sleeps for `delay` unless `token` is cancelled first.
///
/// Returns `false` when cancelled.
pub async fn sleep_with_cancellation(delay: Duration, token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return false;
    }
    tokio::select! {
        _ = token.cancelled() => false,
        _ = sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_up_to_max() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(60));
        let delays: Vec<u64> = (0..8).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32, 60, 60]);
    }

    #[test]
    fn test_reset() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(60));
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.peek(), Duration::from_secs(4));

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_base_still_grows() {
        let mut backoff = Backoff::new(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::ZERO);
        assert_eq!(backoff.next_delay(), Duration::from_millis(1));
        assert_eq!(backoff.next_delay(), Duration::from_millis(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_interrupted_by_cancellation() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            child.cancel();
        });

        let start = tokio::time::Instant::now();
        assert!(!sleep_with_cancellation(Duration::from_secs(60), &token).await);
        assert!(start.elapsed() < Duration::from_secs(60));

        assert!(!sleep_with_cancellation(Duration::from_secs(1), &token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes() {
        let token = CancellationToken::new();
        assert!(sleep_with_cancellation(Duration::from_secs(5), &token).await);
    }
}
