//! Process-wide marketplace configuration.
//!
//! Built once at startup and handed to the gateway; never mutated after.

use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, MarketError};

/// Platform fee configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Platform fee in basis points (500 = 5.00%).
    pub fee_basis_points: u16,
    /// Account that receives the platform fee.
    pub fee_receiver: AccountId,
}

impl MarketplaceConfig {
    /// # Errors
    /// Returns `InvalidConfig` when the fee is above the cap.
    pub fn new(fee_basis_points: u16, fee_receiver: AccountId) -> crate::Result<Self> {
        let cfg = Self {
            fee_basis_points,
            fee_receiver,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Default 5% fee to the given receiver.
    #[must_use]
    pub fn with_default_fee(fee_receiver: AccountId) -> Self {
        Self {
            fee_basis_points: constants::DEFAULT_FEE_BASIS_POINTS,
            fee_receiver,
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    /// `Serialization` on malformed JSON, `InvalidConfig` on bad values.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `InvalidConfig` if `fee_basis_points` exceeds
    /// [`constants::MAX_FEE_BASIS_POINTS`].
    pub fn validate(&self) -> crate::Result<()> {
        if self.fee_basis_points > constants::MAX_FEE_BASIS_POINTS {
            return Err(MarketError::InvalidConfig(format!(
                "fee of {} bps exceeds the {} bps cap",
                self.fee_basis_points,
                constants::MAX_FEE_BASIS_POINTS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fee_is_five_percent() {
        let cfg = MarketplaceConfig::with_default_fee(AccountId::new());
        assert_eq!(cfg.fee_basis_points, 500);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn fee_above_cap_rejected() {
        let err = MarketplaceConfig::new(constants::MAX_FEE_BASIS_POINTS + 1, AccountId::new())
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidConfig(_)));
    }

    #[test]
    fn from_json_parses_and_validates() {
        let receiver = AccountId::new();
        let json = format!(
            r#"{{"fee_basis_points":250,"fee_receiver":"{}"}}"#,
            receiver.0
        );
        let cfg = MarketplaceConfig::from_json(&json).unwrap();
        assert_eq!(cfg.fee_basis_points, 250);
        assert_eq!(cfg.fee_receiver, receiver);

        let bad = format!(
            r#"{{"fee_basis_points":9000,"fee_receiver":"{}"}}"#,
            receiver.0
        );
        assert!(matches!(
            MarketplaceConfig::from_json(&bad).unwrap_err(),
            MarketError::InvalidConfig(_)
        ));
    }

    #[test]
    fn from_json_malformed() {
        let err = MarketplaceConfig::from_json("{").unwrap_err();
        assert!(matches!(err, MarketError::Serialization(_)));
    }
}
