//! Interfaces to the systems the settlement core calls into but does not
//! implement: asset custody, funds transport, and royalty policies.
//!
//! The gateway only invokes these after its own state is committed. If any
//! call fails, the gateway rolls the host back to the checkpoint it took
//! before the first call, so a host must make [`Transactional::rollback`]
//! undo every custody and funds movement made since that checkpoint.

use crate::{AccountId, CollectionId, Result, RoyaltyShare, TokenId};

/// Moves listed assets into and out of marketplace custody.
pub trait AssetCustody {
    /// Take a unique item from `from` into marketplace custody.
    fn hold_non_fungible(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
    ) -> Result<()>;

    /// Take `amount` units of a fungible token from `from`.
    fn hold_fungible(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
        amount: u128,
    ) -> Result<()>;

    /// Hand a unique item held by the marketplace to `to`.
    fn release_non_fungible(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        to: AccountId,
    ) -> Result<()>;

    /// Hand `amount` held units to `to`.
    fn release_fungible(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        to: AccountId,
        amount: u128,
    ) -> Result<()>;
}

/// Moves currency between accounts and the marketplace treasury.
pub trait FundsTransfer {
    /// Collect the payment attached to a call.
    fn receive(&mut self, from: AccountId, amount: u128) -> Result<()>;

    /// Pay out of the treasury. Fails if the recipient rejects payment.
    fn pay(&mut self, to: AccountId, amount: u128) -> Result<()>;
}

/// Per-collection creator royalty lookup.
pub trait RoyaltyPolicy {
    /// `None` when the collection pays no royalty.
    fn royalty_info(&self, collection: &CollectionId, token_id: TokenId) -> Option<RoyaltyShare>;
}

/// All-or-nothing support for a batch of external effects.
pub trait Transactional {
    type Checkpoint;

    fn checkpoint(&self) -> Self::Checkpoint;

    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}

/// Everything the gateway needs from its host.
pub trait Environment: AssetCustody + FundsTransfer + RoyaltyPolicy + Transactional {}

impl<T> Environment for T where T: AssetCustody + FundsTransfer + RoyaltyPolicy + Transactional {}
