//! Escrow conservation invariant checker.
//!
//! Invariant checked at every quiescent point:
//! ```text
//! Σ(pledges held) == Σ(pledged in) - Σ(released out)
//! ```
//!
//! If this ever breaks, a pledge was lost or paid twice.

use lotmarket_types::{MarketError, Result};

/// Running totals of funds entering and leaving escrow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscrowConservation {
    pledged_in: u128,
    released_out: u128,
}

impl EscrowConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pledge(&mut self, amount: u128) {
        self.pledged_in = self.pledged_in.saturating_add(amount);
    }

    pub fn record_release(&mut self, amount: u128) {
        self.released_out = self.released_out.saturating_add(amount);
    }

    /// Amount the ledger should currently hold.
    #[must_use]
    pub fn expected_held(&self) -> u128 {
        self.pledged_in.saturating_sub(self.released_out)
    }

    #[must_use]
    pub fn total_pledged(&self) -> u128 {
        self.pledged_in
    }

    #[must_use]
    pub fn total_released(&self) -> u128 {
        self.released_out
    }

    /// # Errors
    /// Returns [`MarketError::LedgerInvariantViolation`] if `actual_held`
    /// differs from the expected balance.
    pub fn verify(&self, actual_held: u128) -> Result<()> {
        if self.released_out > self.pledged_in {
            return Err(MarketError::LedgerInvariantViolation {
                reason: format!(
                    "released {} exceeds pledged {}",
                    self.released_out, self.pledged_in
                ),
            });
        }
        let expected = self.expected_held();
        if actual_held != expected {
            return Err(MarketError::LedgerInvariantViolation {
                reason: format!(
                    "escrow holds {actual_held} != expected {expected} \
                     (pledged={}, released={})",
                    self.pledged_in, self.released_out
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_balanced() {
        let ec = EscrowConservation::new();
        assert_eq!(ec.expected_held(), 0);
        assert!(ec.verify(0).is_ok());
    }

    #[test]
    fn pledges_and_releases() {
        let mut ec = EscrowConservation::new();
        ec.record_pledge(5);
        ec.record_pledge(8);
        ec.record_release(5);
        assert_eq!(ec.expected_held(), 8);
        assert!(ec.verify(8).is_ok());
        assert_eq!(ec.total_pledged(), 13);
        assert_eq!(ec.total_released(), 5);
    }

    #[test]
    fn imbalance_detected() {
        let mut ec = EscrowConservation::new();
        ec.record_pledge(10);
        let err = ec.verify(11).unwrap_err();
        assert!(matches!(err, MarketError::LedgerInvariantViolation { .. }));
    }

    #[test]
    fn over_release_detected() {
        let mut ec = EscrowConservation::new();
        ec.record_pledge(3);
        ec.record_release(4);
        assert!(ec.verify(0).is_err());
    }
}
