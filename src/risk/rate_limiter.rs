//! Fixed-window hourly trade counter

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RateLimiter {
    trades: u32,
    max_trades: u32,
    window: Duration,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(max_trades: u32, window: Duration) -> Self {
        Self {
            trades: 0,
            max_trades,
            window,
            window_start: Instant::now(),
        }
    }

    /// Starts a fresh window once the current one has fully elapsed.
    fn roll(&mut self) {
        if self.window_start.elapsed() >= self.window {
            self.trades = 0;
            self.window_start = Instant::now();
        }
    }

    pub fn has_capacity(&mut self) -> bool {
        self.roll();
        self.trades < self.max_trades
    }

    pub fn record(&mut self) {
        self.roll();
        self.trades += 1;
    }

    pub fn trades(&self) -> u32 {
        self.trades
    }

    pub fn max_trades(&self) -> u32 {
        self.max_trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn window_rolls_after_full_period() {
        let mut limiter = RateLimiter::new(2, Duration::from_millis(3_600_000));
        limiter.record();
        limiter.record();
        assert!(!limiter.has_capacity());

        tokio::time::advance(Duration::from_millis(3_599_999)).await;
        assert!(!limiter.has_capacity());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(limiter.has_capacity());
        assert_eq!(limiter.trades(), 0);
    }
}
