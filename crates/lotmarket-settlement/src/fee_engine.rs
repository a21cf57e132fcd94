//! Fee and royalty splitting.
//!
//! ```text
//! fee     = total * fee_bps     / 10_000   (truncated)
//! royalty = total * royalty_bps / 10_000   (truncated, 0 without a policy)
//! seller  = total - fee - royalty
//! ```
//!
//! Fee and royalty are truncated independently, so any remainder from the
//! integer division accrues to the seller.

use lotmarket_types::{
    constants, FeeSplit, MarketError, MarketplaceConfig, Result, RoyaltyShare,
};

/// Splits sale totals at the configured platform fee rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEngine {
    fee_basis_points: u16,
}

impl FeeEngine {
    #[must_use]
    pub fn new(fee_basis_points: u16) -> Self {
        Self { fee_basis_points }
    }

    #[must_use]
    pub fn from_config(config: &MarketplaceConfig) -> Self {
        Self::new(config.fee_basis_points)
    }

    #[must_use]
    pub fn fee_basis_points(&self) -> u16 {
        self.fee_basis_points
    }

    /// Split `total` with this engine's fee rate.
    ///
    /// # Errors
    /// See [`split`].
    pub fn split(&self, total: u128, royalty: Option<RoyaltyShare>) -> Result<FeeSplit> {
        split(total, self.fee_basis_points, royalty)
    }
}

/// Divide `total` between seller, platform fee and royalty.
///
/// # Errors
/// - `AmountOverflow` if `total * bps` does not fit in `u128`
/// - `InvalidConfig` if fee and royalty together exceed the total
pub fn split(total: u128, fee_bps: u16, royalty: Option<RoyaltyShare>) -> Result<FeeSplit> {
    let fee_amount = basis_points_of(total, fee_bps)?;
    let royalty_amount = match royalty {
        Some(share) => basis_points_of(total, share.basis_points)?,
        None => 0,
    };
    let seller_amount = total
        .checked_sub(fee_amount)
        .and_then(|rest| rest.checked_sub(royalty_amount))
        .ok_or_else(|| {
            MarketError::InvalidConfig(format!(
                "fee {fee_amount} plus royalty {royalty_amount} exceeds total {total}"
            ))
        })?;

    Ok(FeeSplit {
        total,
        seller_amount,
        fee_amount,
        royalty_amount,
        royalty_receiver: royalty.map(|share| share.receiver),
    })
}

fn basis_points_of(total: u128, bps: u16) -> Result<u128> {
    total
        .checked_mul(u128::from(bps))
        .map(|scaled| scaled / constants::BASIS_POINTS_DENOMINATOR)
        .ok_or(MarketError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use lotmarket_types::AccountId;
    use rand::Rng;

    use super::*;

    #[test]
    fn five_percent_fee_and_royalty_on_twenty() {
        let receiver = AccountId::new();
        let s = split(20, 500, Some(RoyaltyShare::new(receiver, 500))).unwrap();
        assert_eq!(s.fee_amount, 1);
        assert_eq!(s.royalty_amount, 1);
        assert_eq!(s.seller_amount, 18);
        assert_eq!(s.royalty_receiver, Some(receiver));
        assert!(s.is_balanced());
    }

    #[test]
    fn truncation_remainder_goes_to_seller() {
        let s = split(8, 500, Some(RoyaltyShare::new(AccountId::new(), 500))).unwrap();
        assert_eq!(s.fee_amount, 0);
        assert_eq!(s.royalty_amount, 0);
        assert_eq!(s.seller_amount, 8);

        let s = split(199, 500, None).unwrap();
        assert_eq!(s.fee_amount, 9);
        assert_eq!(s.seller_amount, 190);
    }

    #[test]
    fn no_royalty_policy() {
        let s = split(1_000, 250, None).unwrap();
        assert_eq!(s.fee_amount, 25);
        assert_eq!(s.royalty_amount, 0);
        assert_eq!(s.royalty_receiver, None);
        assert_eq!(s.seller_amount, 975);
    }

    #[test]
    fn engine_uses_configured_rate() {
        let cfg = MarketplaceConfig::with_default_fee(AccountId::new());
        let engine = FeeEngine::from_config(&cfg);
        assert_eq!(engine.fee_basis_points(), 500);
        assert_eq!(engine.split(100, None).unwrap().fee_amount, 5);
    }

    #[test]
    fn overflow_is_reported() {
        let err = split(u128::MAX, 500, None).unwrap_err();
        assert!(matches!(err, MarketError::AmountOverflow));
    }

    #[test]
    fn over_hundred_percent_rejected() {
        let err = split(100, 6_000, Some(RoyaltyShare::new(AccountId::new(), 5_000))).unwrap_err();
        assert!(matches!(err, MarketError::InvalidConfig(_)));
    }

    #[test]
    fn random_splits_always_balance() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let total = rng.gen_range(0..10_000_000_000u128);
            let fee = rng.gen_range(0..=constants::MAX_FEE_BASIS_POINTS);
            let royalty = rng.gen_range(0..=constants::MAX_ROYALTY_BASIS_POINTS);
            let s = split(total, fee, Some(RoyaltyShare::new(AccountId::new(), royalty))).unwrap();
            assert!(s.is_balanced(), "unbalanced split: {s:?}");
            assert_eq!(s.fee_amount, total * u128::from(fee) / 10_000);
        }
    }
}
