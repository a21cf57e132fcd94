//! Escrow ledger: one pledge per offer.
//!
//! A new pledge must strictly exceed the current one. Accepting it displaces
//! the previous pledge, which is handed back to the caller for refunding.
//! Releasing clears the pledge on acceptance or cancellation.

use std::collections::BTreeMap;

use lotmarket_types::{AccountId, MarketError, OfferId, Pledge, Result};

use crate::conservation::EscrowConservation;

/// Saved ledger state for one offer, used to undo an aborted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowSnapshot {
    offer_id: OfferId,
    pledge: Option<Pledge>,
    conservation: EscrowConservation,
}

/// Pledges held against open offers.
#[derive(Debug, Default)]
pub struct EscrowLedger {
    /// Current pledge per offer. Absent key = no pledge.
    pledges: BTreeMap<OfferId, Pledge>,
    conservation: EscrowConservation,
}

impl EscrowLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `amount` from `bidder` as the pledge for `offer_id`.
    ///
    /// Returns the displaced pledge, if any. The ledger is unchanged on
    /// error.
    ///
    /// # Errors
    /// Returns `InsufficientBid` if `amount` does not exceed the current
    /// pledge (0 when there is none).
    pub fn pledge(
        &mut self,
        offer_id: OfferId,
        bidder: AccountId,
        amount: u128,
    ) -> Result<Option<Pledge>> {
        let highest = self.highest(offer_id);
        if amount <= highest {
            return Err(MarketError::InsufficientBid {
                offered: amount,
                highest,
            });
        }

        let displaced = self.pledges.insert(offer_id, Pledge::new(bidder, amount));
        self.conservation.record_pledge(amount);
        if let Some(prev) = displaced {
            self.conservation.record_release(prev.amount);
        }
        tracing::debug!(
            offer = %offer_id,
            bidder = %bidder.short(),
            amount = %amount,
            displaced = ?displaced.map(|p| p.amount),
            "Pledge recorded"
        );
        Ok(displaced)
    }

    /// Clear and return the pledge for `offer_id`.
    pub fn release(&mut self, offer_id: OfferId) -> Option<Pledge> {
        let released = self.pledges.remove(&offer_id);
        if let Some(p) = released {
            self.conservation.record_release(p.amount);
            tracing::debug!(offer = %offer_id, amount = %p.amount, "Pledge released");
        }
        released
    }

    /// Release whatever is pledged, if anything. Safe to call repeatedly.
    pub fn refund_if_any(&mut self, offer_id: OfferId) -> Option<Pledge> {
        self.release(offer_id)
    }

    #[must_use]
    pub fn current(&self, offer_id: OfferId) -> Option<Pledge> {
        self.pledges.get(&offer_id).copied()
    }

    /// Current highest pledge amount, 0 when none.
    #[must_use]
    pub fn highest(&self, offer_id: OfferId) -> u128 {
        self.current(offer_id).map_or(0, |p| p.amount)
    }

    /// Sum of all pledges held.
    #[must_use]
    pub fn total_held(&self) -> u128 {
        self.pledges.values().map(|p| p.amount).sum()
    }

    /// Pledges in offer id order.
    pub fn iter(&self) -> impl Iterator<Item = (OfferId, Pledge)> + '_ {
        self.pledges.iter().map(|(id, p)| (*id, *p))
    }

    /// Number of offers with a pledge.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pledges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pledges.is_empty()
    }

    #[must_use]
    pub fn conservation(&self) -> &EscrowConservation {
        &self.conservation
    }

    /// # Errors
    /// Returns `LedgerInvariantViolation` if held funds disagree with the
    /// running totals.
    pub fn verify(&self) -> Result<()> {
        self.conservation.verify(self.total_held())
    }

    #[must_use]
    pub fn snapshot(&self, offer_id: OfferId) -> EscrowSnapshot {
        EscrowSnapshot {
            offer_id,
            pledge: self.current(offer_id),
            conservation: self.conservation,
        }
    }

    /// Put one offer's pledge and the running totals back as they were.
    pub fn restore(&mut self, snapshot: EscrowSnapshot) {
        match snapshot.pledge {
            Some(p) => {
                self.pledges.insert(snapshot.offer_id, p);
            }
            None => {
                self.pledges.remove(&snapshot.offer_id);
            }
        }
        self.conservation = snapshot.conservation;
    }
}
