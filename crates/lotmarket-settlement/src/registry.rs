//! Offer registry: the authoritative store of offers.
//!
//! Offers live in an arena indexed by [`OfferId`]. Ids are handed out in
//! order and records are never removed; closed offers keep their terminal
//! state for audit.

use lotmarket_types::{AccountId, Asset, MarketError, Offer, OfferId, Result};

/// Arena of all offers ever listed.
#[derive(Debug, Default)]
pub struct OfferRegistry {
    offers: Vec<Offer>,
}

impl OfferRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next `create` will assign.
    #[must_use]
    pub fn next_id(&self) -> OfferId {
        OfferId(self.offers.len() as u64)
    }

    /// List a new Active offer.
    pub fn create(&mut self, seller: AccountId, asset: Asset, unit_price: u128) -> OfferId {
        let id = self.next_id();
        self.offers.push(Offer::new(id, seller, asset, unit_price));
        id
    }

    /// # Errors
    /// Returns `InvalidOfferId` if `id` was never assigned.
    pub fn get(&self, id: OfferId) -> Result<&Offer> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.offers.get(idx))
            .ok_or(MarketError::InvalidOfferId(id))
    }

    /// Apply `f` to an Active offer. The offer is only changed if `f`
    /// succeeds.
    ///
    /// # Errors
    /// `InvalidOfferId`, `InvalidState` for terminal offers, or whatever
    /// `f` returns.
    pub fn mutate<T, F>(&mut self, id: OfferId, f: F) -> Result<T>
    where
        F: FnOnce(&mut Offer) -> Result<T>,
    {
        let slot = self.slot_mut(id)?;
        if !slot.is_active() {
            return Err(MarketError::invalid_state(format!(
                "Offer is {}",
                slot.state
            )));
        }
        let mut draft = slot.clone();
        let out = f(&mut draft)?;
        *slot = draft;
        Ok(out)
    }

    /// Active offers listed by `seller`, in listing order.
    pub fn active_by_owner(&self, seller: AccountId) -> impl Iterator<Item = &Offer> + '_ {
        self.offers
            .iter()
            .filter(move |o| o.seller == seller && o.is_active())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Offer> + '_ {
        self.offers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Put a saved copy of an offer back in place.
    ///
    /// # Errors
    /// Returns `InvalidOfferId` if the offer does not exist.
    pub fn restore(&mut self, snapshot: Offer) -> Result<()> {
        let slot = self.slot_mut(snapshot.id)?;
        *slot = snapshot;
        Ok(())
    }

    /// Drop the most recently created offer if it is `id`. Used when the
    /// listing that created it is aborted.
    pub fn discard_last(&mut self, id: OfferId) {
        if self.offers.last().is_some_and(|o| o.id == id) {
            self.offers.pop();
        }
    }

    fn slot_mut(&mut self, id: OfferId) -> Result<&mut Offer> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.offers.get_mut(idx))
            .ok_or(MarketError::InvalidOfferId(id))
    }
}
