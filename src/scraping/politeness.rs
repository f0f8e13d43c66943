//! Randomized request pacing
//!
//! The crawl is serialized, so these delays are the only throttle between
//! requests to a job board.

use rand::Rng;
use std::time::Duration;

/// Uniformly random pause between `min` and `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDelay {
    min: Duration,
    max: Duration,
}

impl RequestDelay {
    /// Build a delay range; bounds are swapped if given in the wrong order
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    /// A fixed pause
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    /// No pause at all
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    /// Draw one delay from the range
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let ms = rand::thread_rng().gen_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(ms as u64)
    }

    /// Sleep for a sampled delay
    pub async fn wait(&self) {
        if self.is_zero() {
            return;
        }
        let delay = self.sample();
        tracing::trace!(delay_ms = delay.as_millis() as u64, "Politeness delay");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range() {
        let delay = RequestDelay::from_millis(1000, 3000);
        for _ in 0..200 {
            let d = delay.sample();
            assert!(d >= Duration::from_millis(1000) && d <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let delay = RequestDelay::from_millis(3500, 1500);
        let d = delay.sample();
        assert!(d >= Duration::from_millis(1500) && d <= Duration::from_millis(3500));
    }

    #[test]
    fn fixed_delay_is_constant() {
        let delay = RequestDelay::fixed(Duration::from_secs(2));
        assert_eq!(delay.sample(), Duration::from_secs(2));
        assert!(RequestDelay::none().is_zero());
    }

    #[tokio::test]
    async fn zero_delay_returns_immediately() {
        let start = std::time::Instant::now();
        RequestDelay::none().wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
