//! In-memory host for tests: token ownership, cash balances, the
//! marketplace treasury, and royalty policies in one cloneable struct.
//!
//! **Never use in production.** Failure injection hooks let tests make
//! custody or payouts fail at chosen points.

use std::collections::{HashMap, HashSet};

use crate::{
    AccountId, AssetCustody, CollectionId, FundsTransfer, MarketError, Result, RoyaltyPolicy,
    RoyaltyShare, TokenId, Transactional,
};

/// In-memory implementation of every collaborator trait.
#[derive(Debug, Clone)]
pub struct InMemoryVault {
    /// The account that represents marketplace custody.
    market: AccountId,
    nft_owners: HashMap<(CollectionId, TokenId), AccountId>,
    fungible: HashMap<(CollectionId, TokenId, AccountId), u128>,
    cash: HashMap<AccountId, u128>,
    treasury: u128,
    royalties: HashMap<CollectionId, RoyaltyShare>,
    rejecting: HashSet<AccountId>,
    custody_frozen: bool,
}

impl InMemoryVault {
    #[must_use]
    pub fn new() -> Self {
        Self {
            market: AccountId::new(),
            nft_owners: HashMap::new(),
            fungible: HashMap::new(),
            cash: HashMap::new(),
            treasury: 0,
            royalties: HashMap::new(),
            rejecting: HashSet::new(),
            custody_frozen: false,
        }
    }

    #[must_use]
    pub fn market_account(&self) -> AccountId {
        self.market
    }

    pub fn mint_non_fungible(&mut self, collection: &str, token_id: u64, owner: AccountId) {
        self.nft_owners
            .insert((CollectionId::new(collection), TokenId(token_id)), owner);
    }

    pub fn mint_fungible(&mut self, collection: &str, token_id: u64, owner: AccountId, amount: u128) {
        *self
            .fungible
            .entry((CollectionId::new(collection), TokenId(token_id), owner))
            .or_default() += amount;
    }

    pub fn deposit(&mut self, account: AccountId, amount: u128) {
        *self.cash.entry(account).or_default() += amount;
    }

    pub fn set_royalty(&mut self, collection: &str, share: RoyaltyShare) {
        self.royalties.insert(CollectionId::new(collection), share);
    }

    /// Make every payment to `account` fail.
    pub fn reject_payments_to(&mut self, account: AccountId) {
        self.rejecting.insert(account);
    }

    /// Make every custody call fail.
    pub fn freeze_custody(&mut self) {
        self.custody_frozen = true;
    }

    #[must_use]
    pub fn owner_of(&self, collection: &str, token_id: u64) -> Option<AccountId> {
        self.nft_owners
            .get(&(CollectionId::new(collection), TokenId(token_id)))
            .copied()
    }

    #[must_use]
    pub fn fungible_balance(&self, collection: &str, token_id: u64, account: AccountId) -> u128 {
        self.fungible
            .get(&(CollectionId::new(collection), TokenId(token_id), account))
            .copied()
            .unwrap_or(0)
    }

    /// Units of a fungible token in marketplace custody.
    #[must_use]
    pub fn custody_balance(&self, collection: &str, token_id: u64) -> u128 {
        self.fungible_balance(collection, token_id, self.market)
    }

    #[must_use]
    pub fn cash_balance(&self, account: AccountId) -> u128 {
        self.cash.get(&account).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn treasury(&self) -> u128 {
        self.treasury
    }

    fn check_custody(&self) -> Result<()> {
        if self.custody_frozen {
            return Err(MarketError::transfer_failure("custody is frozen"));
        }
        Ok(())
    }

    fn move_nft(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
        to: AccountId,
    ) -> Result<()> {
        self.check_custody()?;
        let owner = self
            .nft_owners
            .get_mut(&(collection.clone(), token_id))
            .ok_or_else(|| {
                MarketError::transfer_failure(format!("{collection}{token_id} does not exist"))
            })?;
        if *owner != from {
            return Err(MarketError::transfer_failure(format!(
                "{collection}{token_id} is not owned by {from}"
            )));
        }
        *owner = to;
        Ok(())
    }

    fn move_units(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<()> {
        self.check_custody()?;
        let from_key = (collection.clone(), token_id, from);
        let held = self.fungible.get(&from_key).copied().unwrap_or(0);
        if held < amount {
            return Err(MarketError::transfer_failure(format!(
                "{from} holds {held} of {collection}{token_id}, needs {amount}"
            )));
        }
        self.fungible.insert(from_key, held - amount);
        *self
            .fungible
            .entry((collection.clone(), token_id, to))
            .or_default() += amount;
        Ok(())
    }
}

impl Default for InMemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCustody for InMemoryVault {
    fn hold_non_fungible(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
    ) -> Result<()> {
        let market = self.market;
        self.move_nft(collection, token_id, from, market)
    }

    fn hold_fungible(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
        amount: u128,
    ) -> Result<()> {
        let market = self.market;
        self.move_units(collection, token_id, from, market, amount)
    }

    fn release_non_fungible(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        to: AccountId,
    ) -> Result<()> {
        let market = self.market;
        self.move_nft(collection, token_id, market, to)
    }

    fn release_fungible(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        to: AccountId,
        amount: u128,
    ) -> Result<()> {
        let market = self.market;
        self.move_units(collection, token_id, market, to, amount)
    }
}

impl FundsTransfer for InMemoryVault {
    fn receive(&mut self, from: AccountId, amount: u128) -> Result<()> {
        let balance = self.cash.entry(from).or_default();
        if *balance < amount {
            return Err(MarketError::transfer_failure(format!(
                "{from} has {balance}, needs {amount}"
            )));
        }
        *balance -= amount;
        self.treasury += amount;
        Ok(())
    }

    fn pay(&mut self, to: AccountId, amount: u128) -> Result<()> {
        if self.rejecting.contains(&to) {
            return Err(MarketError::transfer_failure(format!(
                "{to} rejected payment"
            )));
        }
        if self.treasury < amount {
            return Err(MarketError::transfer_failure(format!(
                "treasury has {}, needs {amount}",
                self.treasury
            )));
        }
        self.treasury -= amount;
        *self.cash.entry(to).or_default() += amount;
        Ok(())
    }
}

impl RoyaltyPolicy for InMemoryVault {
    fn royalty_info(&self, collection: &CollectionId, _token_id: TokenId) -> Option<RoyaltyShare> {
        self.royalties.get(collection).copied()
    }
}

impl Transactional for InMemoryVault {
    type Checkpoint = Box<InMemoryVault>;

    fn checkpoint(&self) -> Self::Checkpoint {
        Box::new(self.clone())
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        *self = *checkpoint;
    }
}
