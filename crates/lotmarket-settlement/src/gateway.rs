//! Transaction gateway: the public operation surface.
//!
//! # Commit-before-effect
//!
//! Every operation runs in the same order:
//!
//! ```text
//! lookup ─▶ checks ─▶ snapshot ─▶ commit registry/escrow ─▶ effects ─▶ journal
//!                         ▲                                    │
//!                         └──────── restore + host rollback ◀──┘ (on failure)
//! ```
//!
//! Internal state is committed before the host sees a single custody or
//! funds call, and the offer is marked busy in the [`OfferGuard`] while
//! those calls run. A failed call rolls the host back to its checkpoint and
//! restores the offer and its escrow entry, so a failed operation leaves no
//! trace and emits no event.

use chrono::Utc;
use lotmarket_escrow::{EscrowLedger, EscrowSnapshot};
use lotmarket_types::{
    constants, AccountId, Asset, AssetCustody, AssetKind, Environment, FeeSplit, FundsTransfer,
    MarketError, MarketEvent, MarketplaceConfig, Offer, OfferId, Pledge, Result, RoyaltyShare,
};

use crate::fee_engine::FeeEngine;
use crate::guard::OfferGuard;
use crate::journal::EventJournal;
use crate::registry::OfferRegistry;

/// A custody or funds call against the host.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Effect {
    Receive { from: AccountId, amount: u128 },
    Pay { to: AccountId, amount: u128 },
    Hold { asset: Asset, from: AccountId },
    Release { asset: Asset, to: AccountId },
}

impl Effect {
    fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::Receive { amount: 0, .. } | Self::Pay { amount: 0, .. }
        )
    }

    fn apply<H: AssetCustody + FundsTransfer>(&self, host: &mut H) -> Result<()> {
        match self {
            Self::Receive { from, amount } => host.receive(*from, *amount),
            Self::Pay { to, amount } => host.pay(*to, *amount),
            Self::Hold { asset, from } => match asset {
                Asset::NonFungible {
                    collection,
                    token_id,
                } => host.hold_non_fungible(collection, *token_id, *from),
                Asset::Fungible {
                    collection,
                    token_id,
                    amount_remaining,
                } => host.hold_fungible(collection, *token_id, *from, *amount_remaining),
            },
            Self::Release { asset, to } => match asset {
                Asset::NonFungible {
                    collection,
                    token_id,
                } => host.release_non_fungible(collection, *token_id, *to),
                Asset::Fungible {
                    collection,
                    token_id,
                    amount_remaining,
                } => host.release_fungible(collection, *token_id, *to, *amount_remaining),
            },
        }
    }
}

/// What to put back if an operation aborts.
enum Undo {
    /// A listing that created this offer.
    Listing(OfferId),
    Offer {
        offer: Box<Offer>,
        escrow: EscrowSnapshot,
    },
}

/// Committed internal changes waiting for their effects.
struct Staged {
    effects: Vec<Effect>,
    event: MarketEvent,
}

/// The marketplace settlement engine.
///
/// Owns the registry, escrow ledger, busy flags and journal, plus the host
/// environment `E` that performs custody and funds movements. Calls are
/// strictly sequential; wrap the gateway in a mutex to share it.
pub struct TransactionGateway<E: Environment> {
    config: MarketplaceConfig,
    fees: FeeEngine,
    registry: OfferRegistry,
    escrow: EscrowLedger,
    guard: OfferGuard,
    journal: EventJournal,
    env: E,
}

impl<E: Environment> TransactionGateway<E> {
    /// # Errors
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn new(config: MarketplaceConfig, env: E) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            fee_bps = config.fee_basis_points,
            fee_receiver = %config.fee_receiver,
            "Marketplace gateway started"
        );
        Ok(Self {
            fees: FeeEngine::from_config(&config),
            config,
            registry: OfferRegistry::new(),
            escrow: EscrowLedger::new(),
            guard: OfferGuard::new(),
            journal: EventJournal::default(),
            env,
        })
    }

    /// Replace the journal with an empty one of the given capacity.
    #[must_use]
    pub fn with_journal_capacity(mut self, capacity: usize) -> Self {
        self.journal = EventJournal::new(capacity);
        self
    }

    // =================================================================
    // Operations
    // =================================================================

    /// List `asset` for sale. A zero `unit_price` means bidding only.
    ///
    /// # Errors
    /// `InvalidState` for an empty fungible lot, `TransferFailure` if the
    /// seller cannot hand the asset over.
    pub fn put_on_sale(
        &mut self,
        seller: AccountId,
        asset: Asset,
        unit_price: u128,
    ) -> Result<OfferId> {
        if asset.quantity() == 0 {
            return Err(MarketError::invalid_state("Amount must be positive"));
        }
        let offer_id = self.registry.next_id();
        self.guard.ensure_idle(offer_id)?;

        let event = self.transact(offer_id, Undo::Listing(offer_id), move |gw| {
            let created = gw.registry.create(seller, asset.clone(), unit_price);
            let bidding_open = gw.registry.get(created)?.bidding_open;
            Ok(Staged {
                effects: vec![Effect::Hold {
                    asset: asset.clone(),
                    from: seller,
                }],
                event: MarketEvent::OfferAdded {
                    offer_id: created,
                    seller,
                    asset,
                    unit_price,
                    bidding_open,
                },
            })
        })?;
        Ok(event.offer_id())
    }

    /// Open or close bidding on the caller's own offer.
    ///
    /// # Errors
    /// `InvalidOfferId`, `NotAuthorized` for anyone but the seller, and
    /// `InvalidState` for a terminal offer or when closing bidding while a
    /// pledge is held or no fixed price is set.
    pub fn change_state(
        &mut self,
        caller: AccountId,
        offer_id: OfferId,
        bidding_open: bool,
    ) -> Result<MarketEvent> {
        let offer = self.load(offer_id)?;
        if caller != offer.seller {
            return Err(MarketError::not_authorized(
                "Only the seller can change the offer state",
            ));
        }
        ensure_active(&offer)?;
        if !bidding_open {
            if offer.highest_bid.is_some() {
                return Err(MarketError::invalid_state("Offer has an active bid"));
            }
            if offer.unit_price == 0 {
                return Err(MarketError::invalid_state("Offer has no fixed price"));
            }
        }

        let undo = self.snapshot(&offer);
        self.transact(offer_id, undo, move |gw| {
            gw.registry.mutate(offer_id, |o| {
                o.bidding_open = bidding_open;
                o.updated_at = Utc::now();
                Ok(())
            })?;
            Ok(Staged {
                effects: Vec::new(),
                event: MarketEvent::BiddingToggled {
                    offer_id,
                    bidding_open,
                },
            })
        })
    }

    /// Pledge `payment` against an offer in bidding. The displaced pledge,
    /// if any, is refunded to its bidder.
    ///
    /// # Errors
    /// `InvalidOfferId`, `InvalidState` unless Active and in bidding,
    /// `InsufficientBid` unless `payment` beats the current pledge,
    /// `TransferFailure` if collecting or refunding fails.
    pub fn make_offer(
        &mut self,
        caller: AccountId,
        offer_id: OfferId,
        payment: u128,
    ) -> Result<MarketEvent> {
        let offer = self.load(offer_id)?;
        ensure_active(&offer)?;
        if !offer.bidding_open {
            return Err(MarketError::invalid_state("Offer isn't in bidding"));
        }

        let undo = self.snapshot(&offer);
        self.transact(offer_id, undo, move |gw| {
            let displaced = gw.escrow.pledge(offer_id, caller, payment)?;
            gw.registry.mutate(offer_id, |o| {
                o.highest_bid = Some(Pledge::new(caller, payment));
                o.updated_at = Utc::now();
                Ok(())
            })?;

            let mut effects = vec![Effect::Receive {
                from: caller,
                amount: payment,
            }];
            effects.extend(displaced.map(|p| Effect::Pay {
                to: p.bidder,
                amount: p.amount,
            }));
            Ok(Staged {
                effects,
                event: MarketEvent::OfferMade {
                    offer_id,
                    bidder: caller,
                    amount: payment,
                    refunded: displaced,
                },
            })
        })
    }

    /// Withdraw a pledge or the whole listing.
    ///
    /// The seller cancels the listing: any pledge is refunded, the
    /// remaining asset goes back to the seller and the offer is Canceled.
    /// The current highest bidder withdraws only their pledge; the offer
    /// stays Active.
    ///
    /// # Errors
    /// `InvalidOfferId`, `InvalidState` for terminal offers or when a
    /// non-seller targets an offer not in bidding, `NotAuthorized` for
    /// anyone else.
    pub fn cancel_offer(&mut self, caller: AccountId, offer_id: OfferId) -> Result<MarketEvent> {
        let offer = self.load(offer_id)?;
        ensure_active(&offer)?;

        if caller == offer.seller {
            let undo = self.snapshot(&offer);
            return self.transact(offer_id, undo, move |gw| {
                let refunded = gw.escrow.refund_if_any(offer_id);
                gw.registry.mutate(offer_id, Offer::mark_canceled)?;

                let mut effects: Vec<Effect> = refunded
                    .iter()
                    .map(|p| Effect::Pay {
                        to: p.bidder,
                        amount: p.amount,
                    })
                    .collect();
                effects.push(Effect::Release {
                    asset: offer.asset.clone(),
                    to: offer.seller,
                });
                Ok(Staged {
                    effects,
                    event: MarketEvent::OfferCanceled {
                        offer_id,
                        canceled_by: caller,
                        refunded,
                        asset_returned: true,
                    },
                })
            });
        }

        if !offer.bidding_open {
            return Err(MarketError::invalid_state("Offer isn't in bidding"));
        }
        if !offer.is_highest_bidder(caller) {
            return Err(MarketError::not_authorized("Neither seller nor bidder"));
        }

        let undo = self.snapshot(&offer);
        self.transact(offer_id, undo, move |gw| {
            let refunded = gw.escrow.release(offer_id);
            gw.registry.mutate(offer_id, |o| {
                o.highest_bid = None;
                o.updated_at = Utc::now();
                Ok(())
            })?;
            Ok(Staged {
                effects: refunded
                    .iter()
                    .map(|p| Effect::Pay {
                        to: p.bidder,
                        amount: p.amount,
                    })
                    .collect(),
                event: MarketEvent::OfferCanceled {
                    offer_id,
                    canceled_by: caller,
                    refunded,
                    asset_returned: false,
                },
            })
        })
    }

    /// Sell the whole remaining lot to the highest bidder at their pledge.
    ///
    /// # Errors
    /// `InvalidOfferId`, `NotAuthorized` unless the caller is the seller,
    /// `InvalidState` unless Active, in bidding and holding a pledge.
    pub fn accept_offer(&mut self, caller: AccountId, offer_id: OfferId) -> Result<MarketEvent> {
        let offer = self.load(offer_id)?;
        ensure_active(&offer)?;
        if caller != offer.seller {
            return Err(MarketError::not_authorized("Only the seller can accept an offer"));
        }
        if !offer.bidding_open {
            return Err(MarketError::invalid_state("Offer isn't in bidding"));
        }
        let pledge = offer
            .highest_bid
            .ok_or_else(|| MarketError::invalid_state("Offer has no bid to accept"))?;

        let units = offer.remaining();
        let split = self.fees.split(pledge.amount, self.royalty_for(&offer.asset)?)?;

        let undo = self.snapshot(&offer);
        self.transact(offer_id, undo, move |gw| {
            // Pledged funds are already in the treasury.
            let released = gw.escrow.release(offer_id);
            if released != Some(pledge) {
                return Err(MarketError::LedgerInvariantViolation {
                    reason: format!("escrow for {offer_id} does not match the offer's bid"),
                });
            }
            gw.registry
                .mutate(offer_id, |o| settle_lot(o, pledge.bidder))?;

            let mut effects = vec![Effect::Release {
                asset: offer.asset.portion(units),
                to: pledge.bidder,
            }];
            effects.extend(gw.payouts(offer.seller, &split));
            Ok(Staged {
                effects,
                event: MarketEvent::OfferAccepted {
                    offer_id,
                    buyer: pledge.bidder,
                    units,
                    split,
                },
            })
        })
    }

    /// Buy the whole remaining lot at the fixed price.
    ///
    /// # Errors
    /// `InvalidOfferId`, `InvalidState` unless Active with bidding closed,
    /// `InsufficientPayment` unless `payment == unit_price * remaining`.
    pub fn buy_offer(
        &mut self,
        caller: AccountId,
        offer_id: OfferId,
        payment: u128,
    ) -> Result<MarketEvent> {
        let offer = self.load(offer_id)?;
        ensure_active(&offer)?;
        if offer.bidding_open {
            return Err(MarketError::invalid_state("Offer is in bidding"));
        }
        let units = offer.remaining();
        let expected = offer.price_of(units)?;
        if payment != expected {
            return Err(MarketError::InsufficientPayment {
                expected,
                paid: payment,
            });
        }
        let split = self.fees.split(expected, self.royalty_for(&offer.asset)?)?;

        let undo = self.snapshot(&offer);
        self.transact(offer_id, undo, move |gw| {
            gw.registry.mutate(offer_id, |o| settle_lot(o, caller))?;

            let mut effects = vec![
                Effect::Receive {
                    from: caller,
                    amount: payment,
                },
                Effect::Release {
                    asset: offer.asset.portion(units),
                    to: caller,
                },
            ];
            effects.extend(gw.payouts(offer.seller, &split));
            Ok(Staged {
                effects,
                event: MarketEvent::OfferSold {
                    offer_id,
                    buyer: caller,
                    units,
                    split,
                },
            })
        })
    }

    /// Buy part of a fungible lot. The offer stays Active with the rest.
    ///
    /// # Errors
    /// `InvalidOfferId`; `InvalidState` unless Active, not in bidding,
    /// fungible and `0 < amount < remaining`; `InsufficientPayment` unless
    /// `payment == unit_price * amount`.
    pub fn buy_by_amount(
        &mut self,
        caller: AccountId,
        offer_id: OfferId,
        amount: u128,
        payment: u128,
    ) -> Result<MarketEvent> {
        let offer = self.load(offer_id)?;
        ensure_active(&offer)?;
        if offer.bidding_open {
            return Err(MarketError::invalid_state("Offer is in bidding"));
        }
        if offer.asset.kind() != AssetKind::Fungible {
            return Err(MarketError::invalid_state("Offer is not a fungible lot"));
        }
        if amount == 0 {
            return Err(MarketError::invalid_state("Amount must be positive"));
        }
        // The last units must go through buy_offer so the offer settles.
        if amount >= offer.remaining() {
            return Err(MarketError::invalid_state(format!(
                "Amount must be less than the {} units remaining",
                offer.remaining()
            )));
        }
        let expected = offer.price_of(amount)?;
        if payment != expected {
            return Err(MarketError::InsufficientPayment {
                expected,
                paid: payment,
            });
        }
        let split = self.fees.split(expected, self.royalty_for(&offer.asset)?)?;

        let undo = self.snapshot(&offer);
        self.transact(offer_id, undo, move |gw| {
            let remaining = gw.registry.mutate(offer_id, |o| {
                o.take_units(amount)?;
                Ok(o.remaining())
            })?;

            let mut effects = vec![
                Effect::Receive {
                    from: caller,
                    amount: payment,
                },
                Effect::Release {
                    asset: offer.asset.portion(amount),
                    to: caller,
                },
            ];
            effects.extend(gw.payouts(offer.seller, &split));
            Ok(Staged {
                effects,
                event: MarketEvent::IndividualSold {
                    offer_id,
                    buyer: caller,
                    units: amount,
                    remaining,
                    split,
                },
            })
        })
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Copy of the offer record, terminal or not.
    ///
    /// # Errors
    /// Returns `InvalidOfferId` for an unknown id.
    pub fn get_offer(&self, offer_id: OfferId) -> Result<Offer> {
        self.registry.get(offer_id).cloned()
    }

    /// Active offers of `seller` currently in bidding, in listing order.
    pub fn offers_in_bidding_by_owner(
        &self,
        seller: AccountId,
    ) -> impl Iterator<Item = &Offer> + '_ {
        self.registry
            .active_by_owner(seller)
            .filter(|o| o.bidding_open)
    }

    /// All Active offers of `seller`, in listing order.
    pub fn active_offers_by_owner(&self, seller: AccountId) -> impl Iterator<Item = &Offer> + '_ {
        self.registry.active_by_owner(seller)
    }

    #[must_use]
    pub fn events(&self) -> &EventJournal {
        &self.journal
    }

    /// Sum of all pledges held in escrow.
    #[must_use]
    pub fn escrow_total(&self) -> u128 {
        self.escrow.total_held()
    }

    #[must_use]
    pub fn escrow(&self) -> &EscrowLedger {
        &self.escrow
    }

    #[must_use]
    pub fn registry(&self) -> &OfferRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    #[must_use]
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Host access for setup. Changes made here bypass the gateway.
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Cross-check registry, escrow ledger and conservation totals.
    ///
    /// # Errors
    /// Returns `LedgerInvariantViolation` describing the first mismatch.
    pub fn verify_escrow(&self) -> Result<()> {
        self.escrow.verify()?;
        for offer in self.registry.iter() {
            let held = self.escrow.current(offer.id);
            if offer.highest_bid != held {
                return Err(MarketError::LedgerInvariantViolation {
                    reason: format!(
                        "{} records bid {:?} but escrow holds {:?}",
                        offer.id, offer.highest_bid, held
                    ),
                });
            }
            if held.is_some() && !(offer.is_active() && offer.bidding_open) {
                return Err(MarketError::LedgerInvariantViolation {
                    reason: format!("{} holds a pledge outside bidding", offer.id),
                });
            }
        }
        if let Some((orphan, _)) = self
            .escrow
            .iter()
            .find(|(id, _)| self.registry.get(*id).is_err())
        {
            return Err(MarketError::LedgerInvariantViolation {
                reason: format!("escrow holds a pledge for unknown {orphan}"),
            });
        }
        Ok(())
    }

    // =================================================================
    // Internals
    // =================================================================

    fn load(&self, offer_id: OfferId) -> Result<Offer> {
        let offer = self.registry.get(offer_id)?.clone();
        self.guard.ensure_idle(offer_id)?;
        Ok(offer)
    }

    fn snapshot(&self, offer: &Offer) -> Undo {
        Undo::Offer {
            offer: Box::new(offer.clone()),
            escrow: self.escrow.snapshot(offer.id),
        }
    }

    fn restore(&mut self, undo: Undo) {
        match undo {
            Undo::Listing(offer_id) => self.registry.discard_last(offer_id),
            Undo::Offer { offer, escrow } => {
                let offer_id = offer.id;
                if let Err(err) = self.registry.restore(*offer) {
                    tracing::error!(offer = %offer_id, error = %err, "Offer restore failed");
                }
                self.escrow.restore(escrow);
            }
        }
    }

    fn royalty_for(&self, asset: &Asset) -> Result<Option<RoyaltyShare>> {
        let share = self.env.royalty_info(asset.collection(), asset.token_id());
        if let Some(share) = &share {
            share.validate()?;
        }
        Ok(share)
    }

    /// Seller proceeds, platform fee and royalty, in that order.
    fn payouts(&self, seller: AccountId, split: &FeeSplit) -> Vec<Effect> {
        let mut effects = vec![
            Effect::Pay {
                to: seller,
                amount: split.seller_amount,
            },
            Effect::Pay {
                to: self.config.fee_receiver,
                amount: split.fee_amount,
            },
        ];
        if let Some(receiver) = split.royalty_receiver {
            effects.push(Effect::Pay {
                to: receiver,
                amount: split.royalty_amount,
            });
        }
        effects
    }

    /// Commit `stage`, run its effects, and journal its event. Any failure
    /// puts the registry, escrow and host back as they were.
    fn transact<F>(&mut self, offer_id: OfferId, undo: Undo, stage: F) -> Result<MarketEvent>
    where
        F: FnOnce(&mut Self) -> Result<Staged>,
    {
        let staged = stage(self).and_then(|s| Ok((s.effects, EventJournal::encode(s.event)?)));
        let (effects, encoded) = match staged {
            Ok(staged) => staged,
            Err(err) => {
                self.restore(undo);
                return Err(err);
            }
        };

        let checkpoint = self.env.checkpoint();
        if let Err(err) = self.execute(offer_id, &effects) {
            self.env.rollback(checkpoint);
            self.restore(undo);
            tracing::warn!(
                offer = %offer_id,
                event = encoded.event().name(),
                error = %err,
                "Operation rolled back"
            );
            return Err(err);
        }

        let event = encoded.event().clone();
        let sequence = self.journal.append(encoded);
        tracing::info!(
            offer = %offer_id,
            event = event.name(),
            sequence,
            effects = effects.len(),
            "Operation committed"
        );
        Ok(event)
    }

    fn execute(&mut self, offer_id: OfferId, effects: &[Effect]) -> Result<()> {
        self.guard.enter(offer_id)?;
        let env = &mut self.env;
        let result = effects
            .iter()
            .filter(|effect| !effect.is_noop())
            .try_for_each(|effect| {
                tracing::debug!(offer = %offer_id, ?effect, "Applying effect");
                effect.apply(&mut *env)
            });
        self.guard.exit(offer_id);
        result
    }
}

fn ensure_active(offer: &Offer) -> Result<()> {
    if !offer.is_active() {
        return Err(MarketError::invalid_state(format!(
            "Offer is {}",
            offer.state
        )));
    }
    Ok(())
}

/// Hand the whole remaining lot to `buyer`.
fn settle_lot(offer: &mut Offer, buyer: AccountId) -> Result<()> {
    if offer.asset.kind() == AssetKind::Fungible {
        offer.take_units(offer.remaining())?;
    }
    offer.mark_settled(buyer)
}

#[cfg(test)]
mod tests {
    use lotmarket_types::InMemoryVault;

    use super::*;

    struct Market {
        gw: TransactionGateway<InMemoryVault>,
        seller: AccountId,
        fee_receiver: AccountId,
    }

    fn market() -> Market {
        let seller = AccountId::new();
        let fee_receiver = AccountId::new();
        let mut vault = InMemoryVault::new();
        vault.mint_non_fungible("art", 2, seller);
        vault.mint_fungible("game", 1, seller, 40);
        let config = MarketplaceConfig::with_default_fee(fee_receiver);
        Market {
            gw: TransactionGateway::new(config, vault).unwrap(),
            seller,
            fee_receiver,
        }
    }

    fn funded(gw: &mut TransactionGateway<InMemoryVault>, amount: u128) -> AccountId {
        let acct = AccountId::new();
        gw.env_mut().deposit(acct, amount);
        acct
    }

    #[test]
    fn invalid_config_rejected() {
        let config = MarketplaceConfig {
            fee_basis_points: 20_000,
            fee_receiver: AccountId::new(),
        };
        assert!(matches!(
            TransactionGateway::new(config, InMemoryVault::new()),
            Err(MarketError::InvalidConfig(_))
        ));
    }

    #[test]
    fn unknown_offer_checked_first() {
        let Market { mut gw, seller, .. } = market();
        let id = OfferId(7);
        assert!(matches!(gw.change_state(AccountId::new(), id, true), Err(MarketError::InvalidOfferId(_))));
        assert!(matches!(gw.make_offer(seller, id, 0), Err(MarketError::InvalidOfferId(_))));
        assert!(matches!(gw.cancel_offer(seller, id), Err(MarketError::InvalidOfferId(_))));
        assert!(matches!(gw.accept_offer(seller, id), Err(MarketError::InvalidOfferId(_))));
        assert!(matches!(gw.buy_offer(seller, id, 0), Err(MarketError::InvalidOfferId(_))));
        assert!(matches!(gw.buy_by_amount(seller, id, 0, 0), Err(MarketError::InvalidOfferId(_))));
        assert!(gw.events().is_empty());
    }

    #[test]
    fn zero_price_listing_starts_in_bidding() {
        let Market { mut gw, seller, .. } = market();
        let id = gw.put_on_sale(seller, Asset::non_fungible("art", 2), 0).unwrap();
        let offer = gw.get_offer(id).unwrap();
        assert!(offer.bidding_open);
        assert_eq!(gw.env().owner_of("art", 2), Some(gw.env().market_account()));

        let err = gw.change_state(seller, id, false).unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));
    }

    #[test]
    fn empty_fungible_lot_rejected() {
        let Market { mut gw, seller, .. } = market();
        let err = gw.put_on_sale(seller, Asset::fungible("game", 1, 0), 1).unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));
        assert!(gw.registry().is_empty());
    }

    #[test]
    fn only_seller_changes_state() {
        let Market { mut gw, seller, .. } = market();
        let id = gw.put_on_sale(seller, Asset::non_fungible("art", 2), 10).unwrap();
        let err = gw.change_state(AccountId::new(), id, true).unwrap_err();
        assert!(matches!(err, MarketError::NotAuthorized { .. }));

        let ev = gw.change_state(seller, id, true).unwrap();
        assert_eq!(
            ev,
            MarketEvent::BiddingToggled {
                offer_id: id,
                bidding_open: true
            }
        );
        assert_eq!(gw.offers_in_bidding_by_owner(seller).count(), 1);
    }

    #[test]
    fn closing_bidding_with_pledge_rejected() {
        let Market { mut gw, seller, .. } = market();
        let id = gw.put_on_sale(seller, Asset::non_fungible("art", 2), 10).unwrap();
        gw.change_state(seller, id, true).unwrap();
        let bidder = funded(&mut gw, 50);
        gw.make_offer(bidder, id, 5).unwrap();

        let err = gw.change_state(seller, id, false).unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));
        assert!(gw.get_offer(id).unwrap().bidding_open);
    }

    #[test]
    fn make_offer_needs_bidding() {
        let Market { mut gw, seller, .. } = market();
        let id = gw.put_on_sale(seller, Asset::non_fungible("art", 2), 10).unwrap();
        let bidder = funded(&mut gw, 50);
        let err = gw.make_offer(bidder, id, 20).unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));
        assert_eq!(gw.env().cash_balance(bidder), 50);
    }

    #[test]
    fn bystander_cannot_cancel() {
        let Market { mut gw, seller, .. } = market();
        let id = gw.put_on_sale(seller, Asset::non_fungible("art", 2), 0).unwrap();
        let err = gw.cancel_offer(AccountId::new(), id).unwrap_err();
        assert!(matches!(err, MarketError::NotAuthorized { .. }));

        let fixed = gw.put_on_sale(seller, Asset::fungible("game", 1, 4), 3).unwrap();
        let err = gw.cancel_offer(AccountId::new(), fixed).unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));
    }

    #[test]
    fn accept_requires_seller_and_pledge() {
        let Market { mut gw, seller, .. } = market();
        let id = gw.put_on_sale(seller, Asset::non_fungible("art", 2), 0).unwrap();
        let err = gw.accept_offer(seller, id).unwrap_err();
        assert!(matches!(err, MarketError::InvalidState { .. }));

        let bidder = funded(&mut gw, 50);
        gw.make_offer(bidder, id, 5).unwrap();
        let err = gw.accept_offer(bidder, id).unwrap_err();
        assert!(matches!(err, MarketError::NotAuthorized { .. }));
    }

    #[test]
    fn buy_offer_exact_payment() {
        let Market {
            mut gw,
            seller,
            fee_receiver,
        } = market();
        let id = gw.put_on_sale(seller, Asset::fungible("game", 1, 4), 25).unwrap();
        let buyer = funded(&mut gw, 200);

        let err = gw.buy_offer(buyer, id, 99).unwrap_err();
        assert!(matches!(
            err,
            MarketError::InsufficientPayment {
                expected: 100,
                paid: 99
            }
        ));

        gw.buy_offer(buyer, id, 100).unwrap();
        let offer = gw.get_offer(id).unwrap();
        assert_eq!(offer.state, lotmarket_types::OfferState::Settled);
        assert_eq!(offer.remaining(), 0);
        assert_eq!(offer.buyer, Some(buyer));
        assert_eq!(gw.env().fungible_balance("game", 1, buyer), 4);
        assert_eq!(gw.env().cash_balance(seller), 95);
        assert_eq!(gw.env().cash_balance(fee_receiver), 5);
        assert_eq!(gw.env().treasury(), 0);
    }

    #[test]
    fn buy_by_amount_bounds() {
        let Market { mut gw, seller, .. } = market();
        let nft = gw.put_on_sale(seller, Asset::non_fungible("art", 2), 5).unwrap();
        let lot = gw.put_on_sale(seller, Asset::fungible("game", 1, 10), 2).unwrap();
        let buyer = funded(&mut gw, 100);

        for (id, amount) in [(nft, 1), (lot, 0), (lot, 10), (lot, 11)] {
            let err = gw.buy_by_amount(buyer, id, amount, 2 * amount).unwrap_err();
            assert!(matches!(err, MarketError::InvalidState { .. }), "{id} x{amount}");
        }
        let err = gw.buy_by_amount(buyer, lot, 3, 5).unwrap_err();
        assert!(matches!(err, MarketError::InsufficientPayment { expected: 6, .. }));

        let ev = gw.buy_by_amount(buyer, lot, 3, 6).unwrap();
        assert!(matches!(ev, MarketEvent::IndividualSold { remaining: 7, .. }));
        assert!(gw.get_offer(lot).unwrap().is_active());
    }

    #[test]
    fn busy_offer_is_reentrancy() {
        let Market { mut gw, seller, .. } = market();
        let id = gw.put_on_sale(seller, Asset::non_fungible("art", 2), 0).unwrap();
        let bidder = funded(&mut gw, 50);
        gw.guard.enter(id).unwrap();
        let err = gw.make_offer(bidder, id, 5).unwrap_err();
        assert!(matches!(err, MarketError::Reentrancy(_)));
        gw.guard.exit(id);
        gw.make_offer(bidder, id, 5).unwrap();
    }

    #[test]
    fn noop_payments_skipped() {
        assert!(Effect::Pay {
            to: AccountId::new(),
            amount: 0
        }
        .is_noop());
        assert!(!Effect::Release {
            asset: Asset::non_fungible("art", 1),
            to: AccountId::new()
        }
        .is_noop());
    }
}
