//! Circuit breaker implementation

use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};
use crate::types::BreakerStatus;

#[derive(Debug, Clone)]
struct Trip {
    at: Instant,
    reason: String,
    /// Latched trips ignore the cooldown and only clear on a manual reset.
    latched: bool,
}

#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    consecutive_failures: u32,
    max_failures: u32,
    cooldown: Duration,
    trip: Option<Trip>,
}

impl CircuitBreaker {
    pub fn new(max_failures: u32, cooldown: Duration) -> Self {
        Self {
            consecutive_failures: 0,
            max_failures,
            cooldown,
            trip: None,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Returns true when this failure opened the breaker.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;

        if self.consecutive_failures >= self.max_failures {
            let reason = format!("{} consecutive failures", self.consecutive_failures);
            self.trip(reason, false);
            return true;
        }
        false
    }

    pub fn trip(&mut self, reason: impl Into<String>, latched: bool) {
        let reason = reason.into();
        if latched {
            error!(%reason, "🚨 CIRCUIT BREAKER TRIPPED - manual reset required");
        } else {
            error!(
                %reason,
                cooldown_secs = self.cooldown.as_secs(),
                "🚨 CIRCUIT BREAKER TRIPPED - trading halted"
            );
        }
        let latched = latched || self.trip.as_ref().is_some_and(|t| t.latched);
        self.trip = Some(Trip {
            at: Instant::now(),
            reason,
            latched,
        });
    }

    /// Closes an expired, unlatched breaker and reports whether trading may proceed.
    pub fn can_proceed(&mut self) -> bool {
        let Some(trip) = &self.trip else {
            return true;
        };

        if !trip.latched && trip.at.elapsed() >= self.cooldown {
            info!("Circuit breaker cooldown complete, resetting");
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.trip = None;
        self.consecutive_failures = 0;
    }

    pub fn status(&self) -> BreakerStatus {
        if self.trip.is_some() {
            BreakerStatus::Open
        } else {
            BreakerStatus::Closed
        }
    }

    pub fn trip_reason(&self) -> Option<&str> {
        self.trip.as_ref().map(|t| t.reason.as_str())
    }

    pub fn is_latched(&self) -> bool {
        self.trip.as_ref().is_some_and(|t| t.latched)
    }

    /// `None` when closed or latched.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let trip = self.trip.as_ref()?;
        if trip.latched {
            return None;
        }
        Some(self.cooldown.saturating_sub(trip.at.elapsed()))
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
