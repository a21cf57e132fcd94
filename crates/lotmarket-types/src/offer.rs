//! # Offer: the central listing record
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  accept / buy / depleted  ┌─────────┐
//!   │ ACTIVE ├──────────────────────────▶│ SETTLED │
//!   └───┬────┘                           └─────────┘
//!       │ seller cancel
//!       ▼
//!   ┌──────────┐
//!   │ CANCELED │
//!   └──────────┘
//! ```
//!
//! Offers are never removed from the registry. A terminal record stays
//! readable so external references and audit history remain valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, MarketError, OfferId};

/// Lifecycle state of an offer.
///
/// Transitions are **monotonic**:
/// - `Active → Settled` (fully sold or accepted)
/// - `Active → Canceled` (seller withdrew the listing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferState {
    Active,
    Settled,
    Canceled,
}

impl OfferState {
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Active, Self::Settled | Self::Canceled))
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl std::fmt::Display for OfferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// Funds escrowed by a bidder against an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pledge {
    pub bidder: AccountId,
    pub amount: u128,
}

impl Pledge {
    #[must_use]
    pub fn new(bidder: AccountId, amount: u128) -> Self {
        Self { bidder, amount }
    }
}

/// A listing of an asset for fixed-price sale or bidding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub seller: AccountId,
    pub asset: Asset,
    /// Price per unit. `0` means bidding only.
    pub unit_price: u128,
    pub bidding_open: bool,
    /// Mirrors the escrow ledger's pledge for this offer.
    pub highest_bid: Option<Pledge>,
    pub state: OfferState,
    /// Set when the whole lot changed hands.
    pub buyer: Option<AccountId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// A freshly listed offer. Bidding starts open when no price is set.
    #[must_use]
    pub fn new(id: OfferId, seller: AccountId, asset: Asset, unit_price: u128) -> Self {
        let now = Utc::now();
        Self {
            id,
            seller,
            asset,
            unit_price,
            bidding_open: unit_price == 0,
            highest_bid: None,
            state: OfferState::Active,
            buyer: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == OfferState::Active
    }

    /// Units still listed (1 for a non-fungible item).
    #[must_use]
    pub fn remaining(&self) -> u128 {
        self.asset.quantity()
    }

    /// Whether `account` currently holds the highest pledge.
    #[must_use]
    pub fn is_highest_bidder(&self, account: AccountId) -> bool {
        self.highest_bid.is_some_and(|p| p.bidder == account)
    }

    /// Price of `units` at the listed unit price.
    ///
    /// # Errors
    /// Returns `AmountOverflow` if the product does not fit in `u128`.
    pub fn price_of(&self, units: u128) -> crate::Result<u128> {
        self.unit_price
            .checked_mul(units)
            .ok_or(MarketError::AmountOverflow)
    }

    /// Remove `units` from a fungible lot.
    ///
    /// # Errors
    /// `InvalidState` for non-fungible assets or when `units` exceeds the
    /// remaining amount.
    pub fn take_units(&mut self, units: u128) -> crate::Result<()> {
        match &mut self.asset {
            Asset::Fungible {
                amount_remaining, ..
            } => {
                let left = *amount_remaining;
                *amount_remaining =
                    left.checked_sub(units)
                        .ok_or_else(|| MarketError::InvalidState {
                            reason: format!("Only {left} units remaining"),
                        })?;
                self.updated_at = Utc::now();
                Ok(())
            }
            Asset::NonFungible { .. } => Err(MarketError::InvalidState {
                reason: "Offer is not a fungible lot".into(),
            }),
        }
    }

    /// Transition to SETTLED, recording the buyer.
    ///
    /// # Errors
    /// Returns `InvalidState` if the offer is already terminal.
    pub fn mark_settled(&mut self, buyer: AccountId) -> crate::Result<()> {
        self.transition(OfferState::Settled)?;
        self.buyer = Some(buyer);
        self.highest_bid = None;
        Ok(())
    }

    /// Transition to CANCELED.
    ///
    /// # Errors
    /// Returns `InvalidState` if the offer is already terminal.
    pub fn mark_canceled(&mut self) -> crate::Result<()> {
        self.transition(OfferState::Canceled)?;
        self.highest_bid = None;
        Ok(())
    }

    fn transition(&mut self, target: OfferState) -> crate::Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(MarketError::InvalidState {
                reason: format!(
                    "Cannot transition {} from {} to {target}",
                    self.id, self.state
                ),
            });
        }
        self.state = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    pub fn dummy_fixed_price(unit_price: u128) -> Self {
        Self::new(
            OfferId(0),
            AccountId::new(),
            Asset::non_fungible("dummy", 1),
            unit_price,
        )
    }

    pub fn dummy_lot(seller: AccountId, unit_price: u128, amount: u128) -> Self {
        Self::new(
            OfferId(0),
            seller,
            Asset::fungible("dummy", 1, amount),
            unit_price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_price_opens_bidding() {
        assert!(Offer::dummy_fixed_price(0).bidding_open);
        assert!(!Offer::dummy_fixed_price(10).bidding_open);
    }

    #[test]
    fn state_transitions_valid() {
        assert!(OfferState::Active.can_transition_to(OfferState::Settled));
        assert!(OfferState::Active.can_transition_to(OfferState::Canceled));
    }

    #[test]
    fn state_transitions_invalid() {
        assert!(!OfferState::Settled.can_transition_to(OfferState::Active));
        assert!(!OfferState::Settled.can_transition_to(OfferState::Canceled));
        assert!(!OfferState::Canceled.can_transition_to(OfferState::Settled));
        assert!(OfferState::Canceled.is_terminal());
    }

    #[test]
    fn double_settle_blocked() {
        let mut offer = Offer::dummy_fixed_price(10);
        let buyer = AccountId::new();
        offer.mark_settled(buyer).unwrap();
        assert_eq!(offer.buyer, Some(buyer));
        let err = offer.mark_settled(buyer).unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));
    }

    #[test]
    fn take_units_from_lot() {
        let mut offer = Offer::dummy_lot(AccountId::new(), 1, 40);
        offer.take_units(20).unwrap();
        assert_eq!(offer.remaining(), 20);
        let err = offer.take_units(21).unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));
        assert_eq!(offer.remaining(), 20);
    }

    #[test]
    fn take_units_rejects_non_fungible() {
        let mut offer = Offer::dummy_fixed_price(10);
        assert!(offer.take_units(1).is_err());
    }

    #[test]
    fn price_of_overflow() {
        let offer = Offer::dummy_lot(AccountId::new(), u128::MAX, 2);
        assert!(matches!(
            offer.price_of(2).unwrap_err(),
            MarketError::AmountOverflow
        ));
        assert_eq!(offer.price_of(1).unwrap(), u128::MAX);
    }

    #[test]
    fn highest_bidder_lookup() {
        let mut offer = Offer::dummy_fixed_price(0);
        let bidder = AccountId::new();
        assert!(!offer.is_highest_bidder(bidder));
        offer.highest_bid = Some(Pledge::new(bidder, 5));
        assert!(offer.is_highest_bidder(bidder));
    }

    #[test]
    fn serde_roundtrip() {
        let offer = Offer::dummy_lot(AccountId::new(), 3, 9);
        let json = serde_json::to_string(&offer).unwrap();
        let back: Offer = serde_json::from_str(&json).unwrap();
        assert_eq!(offer, back);
    }
}
