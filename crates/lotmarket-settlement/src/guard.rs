//! Per-offer reentrancy guard.
//!
//! An offer is marked busy while its external effects run. Any operation
//! that reaches the same offer before the mark is cleared is refused with
//! [`MarketError::Reentrancy`], so a host callback can never observe or
//! act on a half-applied operation.

use std::collections::HashSet;

use lotmarket_types::{MarketError, OfferId, Result};

/// Tracks offers whose effects are in flight.
#[derive(Debug, Default)]
pub struct OfferGuard {
    busy: HashSet<OfferId>,
}

impl OfferGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns `Reentrancy` if `offer_id` is busy.
    pub fn ensure_idle(&self, offer_id: OfferId) -> Result<()> {
        if self.busy.contains(&offer_id) {
            return Err(MarketError::Reentrancy(offer_id));
        }
        Ok(())
    }

    /// Mark `offer_id` busy.
    ///
    /// # Errors
    /// Returns `Reentrancy` if it already is.
    pub fn enter(&mut self, offer_id: OfferId) -> Result<()> {
        if !self.busy.insert(offer_id) {
            return Err(MarketError::Reentrancy(offer_id));
        }
        Ok(())
    }

    pub fn exit(&mut self, offer_id: OfferId) {
        self.busy.remove(&offer_id);
    }

    #[must_use]
    pub fn is_busy(&self, offer_id: OfferId) -> bool {
        self.busy.contains(&offer_id)
    }
}
