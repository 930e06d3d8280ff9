//! Decaying call-cost counter
//!
//! Kraken keeps one counter per API key. Every call adds its cost, and the
//! counter drains at one unit per second. The governor mirrors that counter
//! on the client side so calls are refused before Kraken starts rejecting
//! them.
//!
//! Decay, the admission check and the charge happen under one lock, so two
//! calls sharing a client can never both squeeze under the ceiling.

use parking_lot::Mutex;
use tokio::time::Instant;

/// Drain rate of the counter, in cost units per second
pub const DECAY_PER_SECOND: f64 = 1.0;

/// Counter value and the instant it was last decayed
#[derive(Debug, Clone, Copy)]
struct RateState {
    consumed: f64,
    last_decay: Instant,
}

impl RateState {
    fn decay(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_decay).as_secs_f64();
        self.consumed = (self.consumed - elapsed * DECAY_PER_SECOND).max(0.0);
        self.last_decay = now;
    }
}

/// Outcome of [`RateGovernor::admit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// The attempt was charged
    Admitted {
        /// Counter value after decay, before the charge
        before: f64,
    },
    /// The counter is too close to the ceiling; nothing was charged
    Saturated {
        /// Counter value after decay
        consumed: f64,
    },
}

impl Admission {
    /// Whether the attempt may proceed
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }
}

/// Client-side mirror of Kraken's per-key call counter
#[derive(Debug)]
pub struct RateGovernor {
    ceiling: u32,
    state: Mutex<RateState>,
}

impl RateGovernor {
    /// Create a governor with an empty counter
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            state: Mutex::new(RateState {
                consumed: 0.0,
                last_decay: Instant::now(),
            }),
        }
    }

    /// Configured ceiling
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Counter value after decaying to now
    pub fn consumed(&self) -> f64 {
        let mut state = self.state.lock();
        state.decay(Instant::now());
        state.consumed
    }

    /// Decay the counter to now
    pub fn decay(&self) {
        self.state.lock().decay(Instant::now());
    }

    /// Decay, then charge `cost` if the counter is below `ceiling - 1`
    pub fn admit(&self, cost: u32) -> Admission {
        let mut state = self.state.lock();
        state.decay(Instant::now());

        let before = state.consumed;
        if before < f64::from(self.ceiling) - 1.0 {
            state.consumed += f64::from(cost);
            Admission::Admitted { before }
        } else {
            Admission::Saturated { consumed: before }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_cost_is_charged_once() {
        let governor = RateGovernor::new(20);
        assert_eq!(governor.admit(2), Admission::Admitted { before: 0.0 });
        assert_eq!(governor.consumed(), 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decay_is_exact() {
        let governor = RateGovernor::new(20);
        governor.admit(5);

        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(governor.consumed(), 3.5);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(governor.consumed(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decay_twice_changes_nothing() {
        let governor = RateGovernor::new(20);
        governor.admit(3);
        tokio::time::advance(Duration::from_secs(1)).await;

        governor.decay();
        let first = governor.consumed();
        governor.decay();
        assert_eq!(governor.consumed(), first);
        assert_eq!(first, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_saturates_one_below_ceiling() {
        let governor = RateGovernor::new(20);
        for _ in 0..19 {
            assert!(governor.admit(1).is_admitted());
        }

        assert_eq!(governor.admit(1), Admission::Saturated { consumed: 19.0 });
        // A refused attempt is not charged
        assert_eq!(governor.consumed(), 19.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_decay() {
        let governor = RateGovernor::new(5);
        for _ in 0..4 {
            governor.admit(1);
        }
        assert!(!governor.admit(1).is_admitted());

        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(governor.admit(1), Admission::Admitted { before: 3.5 });
    }
}
