//! Marketplace events for off-chain indexers.
//!
//! One event is emitted per successful operation, after every effect of the
//! operation has been applied. Failed operations emit nothing.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, FeeSplit, OfferId, Pledge};

/// An event emitted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    /// A listing was created and its asset taken into custody.
    OfferAdded {
        offer_id: OfferId,
        seller: AccountId,
        asset: Asset,
        unit_price: u128,
        bidding_open: bool,
    },
    /// The seller switched bidding on or off.
    BiddingToggled {
        offer_id: OfferId,
        bidding_open: bool,
    },
    /// A pledge became the highest bid; `refunded` is the displaced one.
    OfferMade {
        offer_id: OfferId,
        bidder: AccountId,
        amount: u128,
        refunded: Option<Pledge>,
    },
    /// A pledge was withdrawn or the listing was canceled by the seller.
    OfferCanceled {
        offer_id: OfferId,
        canceled_by: AccountId,
        refunded: Option<Pledge>,
        asset_returned: bool,
    },
    /// The seller accepted the highest pledge.
    OfferAccepted {
        offer_id: OfferId,
        buyer: AccountId,
        units: u128,
        split: FeeSplit,
    },
    /// A fixed-price listing was bought in full.
    OfferSold {
        offer_id: OfferId,
        buyer: AccountId,
        units: u128,
        split: FeeSplit,
    },
    /// Part of a fungible lot was bought.
    IndividualSold {
        offer_id: OfferId,
        buyer: AccountId,
        units: u128,
        remaining: u128,
        split: FeeSplit,
    },
}

impl MarketEvent {
    #[must_use]
    pub fn offer_id(&self) -> OfferId {
        match self {
            Self::OfferAdded { offer_id, .. }
            | Self::BiddingToggled { offer_id, .. }
            | Self::OfferMade { offer_id, .. }
            | Self::OfferCanceled { offer_id, .. }
            | Self::OfferAccepted { offer_id, .. }
            | Self::OfferSold { offer_id, .. }
            | Self::IndividualSold { offer_id, .. } => *offer_id,
        }
    }

    /// Stable event name used in logs and by indexers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OfferAdded { .. } => "OfferAdded",
            Self::BiddingToggled { .. } => "BiddingToggled",
            Self::OfferMade { .. } => "OfferMade",
            Self::OfferCanceled { .. } => "OfferCanceled",
            Self::OfferAccepted { .. } => "OfferAccepted",
            Self::OfferSold { .. } => "OfferSold",
            Self::IndividualSold { .. } => "IndividualSold",
        }
    }
}

impl std::fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.name(), self.offer_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_offer_id() {
        let ev = MarketEvent::BiddingToggled {
            offer_id: OfferId(4),
            bidding_open: true,
        };
        assert_eq!(ev.name(), "BiddingToggled");
        assert_eq!(ev.offer_id(), OfferId(4));
        assert_eq!(format!("{ev}"), "BiddingToggled[offer:4]");
    }

    #[test]
    fn serde_keyed_by_event_name() {
        let ev = MarketEvent::OfferMade {
            offer_id: OfferId(0),
            bidder: AccountId::new(),
            amount: 8,
            refunded: None,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["OfferMade"]["amount"], 8);
        let back: MarketEvent = serde_json::from_value(json).unwrap();
        assert_eq!(ev, back);
    }
}
