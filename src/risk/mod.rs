//! Risk controls: circuit breaker, rate limiting, loss and exposure tracking

pub mod circuit_breaker;
pub mod rate_limiter;
pub mod loss_tracker;
pub mod gate;

pub use circuit_breaker::*;
pub use rate_limiter::*;
pub use loss_tracker::*;
pub use gate::*;
