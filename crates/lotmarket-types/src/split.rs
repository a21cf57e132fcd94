//! Proceeds split types.
//!
//! A [`FeeSplit`] is the result of dividing a sale total between the seller,
//! the platform fee receiver and an optional royalty recipient.

use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, MarketError};

/// A royalty entitlement reported by an asset's royalty policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltyShare {
    pub receiver: AccountId,
    /// Hundredths of a percent (500 = 5.00%).
    pub basis_points: u16,
}

impl RoyaltyShare {
    #[must_use]
    pub fn new(receiver: AccountId, basis_points: u16) -> Self {
        Self {
            receiver,
            basis_points,
        }
    }

    /// # Errors
    /// Returns `InvalidConfig` above [`constants::MAX_ROYALTY_BASIS_POINTS`].
    pub fn validate(&self) -> crate::Result<()> {
        if self.basis_points > constants::MAX_ROYALTY_BASIS_POINTS {
            return Err(MarketError::InvalidConfig(format!(
                "royalty of {} bps exceeds the {} bps cap",
                self.basis_points,
                constants::MAX_ROYALTY_BASIS_POINTS
            )));
        }
        Ok(())
    }
}

/// How a sale total is divided. `seller + fee + royalty == total` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub total: u128,
    pub seller_amount: u128,
    pub fee_amount: u128,
    pub royalty_amount: u128,
    pub royalty_receiver: Option<AccountId>,
}

impl FeeSplit {
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.seller_amount
            .checked_add(self.fee_amount)
            .and_then(|s| s.checked_add(self.royalty_amount))
            == Some(self.total)
    }
}
