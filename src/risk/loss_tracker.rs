//! Realized loss and open exposure bookkeeping

use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct LossTracker {
    consecutive_losses: u32,
    max_consecutive_losses: u32,
    daily_loss: Decimal,
    max_daily_loss: Decimal,
}

impl LossTracker {
    pub fn new(max_consecutive_losses: u32, max_daily_loss: Decimal) -> Self {
        Self {
            consecutive_losses: 0,
            max_consecutive_losses,
            daily_loss: Decimal::ZERO,
            max_daily_loss,
        }
    }

    /// Returns true when the loss streak has reached its limit.
    pub fn record_loss(&mut self, loss: Decimal) -> bool {
        self.consecutive_losses += 1;
        self.daily_loss += loss.abs();
        self.consecutive_losses >= self.max_consecutive_losses
    }

    pub fn clear_streak(&mut self) {
        self.consecutive_losses = 0;
    }

    pub fn reset(&mut self) {
        self.consecutive_losses = 0;
        self.daily_loss = Decimal::ZERO;
    }

    pub fn daily_limit_reached(&self) -> bool {
        self.daily_loss >= self.max_daily_loss
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn daily_loss(&self) -> Decimal {
        self.daily_loss
    }

    pub fn max_daily_loss(&self) -> Decimal {
        self.max_daily_loss
    }
}

/// Principal committed to trades that have been dispatched but not yet resolved.
#[derive(Debug, Clone)]
pub struct ExposureTracker {
    current: Decimal,
    cap: Decimal,
}

impl ExposureTracker {
    pub fn new(cap: Decimal) -> Self {
        Self {
            current: Decimal::ZERO,
            cap,
        }
    }

    pub fn would_exceed(&self, amount: Decimal) -> bool {
        self.current + amount > self.cap
    }

    pub fn open(&mut self, amount: Decimal) {
        self.current += amount;
    }

    pub fn close(&mut self, amount: Decimal) {
        self.current = (self.current - amount).max(Decimal::ZERO);
    }

    pub fn current(&self) -> Decimal {
        self.current
    }

    pub fn cap(&self) -> Decimal {
        self.cap
    }
}
