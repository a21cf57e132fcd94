//! Error types for the LotMarket settlement engine.
//!
//! All errors use the `MK_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Offer lookup / lifecycle errors
//! - 2xx: Funds errors
//! - 3xx: Custody and transfer errors
//! - 4xx: Ledger invariant errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::OfferId;

/// Central error enum for all LotMarket operations.
#[derive(Debug, Error)]
pub enum MarketError {
    // =================================================================
    // Offer Errors (1xx)
    // =================================================================
    /// The offer id was never assigned.
    #[error("MK_ERR_100: Please, use a valid item ({0})")]
    InvalidOfferId(OfferId),

    /// The offer is in the wrong mode or state for the operation.
    #[error("MK_ERR_101: {reason}")]
    InvalidState { reason: String },

    /// The caller is not allowed to perform the operation.
    #[error("MK_ERR_102: {reason}")]
    NotAuthorized { reason: String },

    // =================================================================
    // Funds Errors (2xx)
    // =================================================================
    /// A bid did not exceed the current highest pledge.
    #[error("MK_ERR_200: Price must be greater: offered {offered}, highest {highest}")]
    InsufficientBid { offered: u128, highest: u128 },

    /// The attached payment does not equal the asking total.
    #[error("MK_ERR_201: Payment mismatch: expected {expected}, got {paid}")]
    InsufficientPayment { expected: u128, paid: u128 },

    /// An amount computation overflowed `u128`.
    #[error("MK_ERR_202: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // Custody / Transfer Errors (3xx)
    // =================================================================
    /// Custody or funds transfer was rejected by the collaborator.
    #[error("MK_ERR_300: Transfer failed: {reason}")]
    TransferFailure { reason: String },

    /// An operation re-entered an offer that is mid-settlement.
    #[error("MK_ERR_301: Offer {0} is busy")]
    Reentrancy(OfferId),

    // =================================================================
    // Ledger Invariant Errors (4xx)
    // =================================================================
    /// Escrow ledger and offer registry disagree. Critical safety alert.
    #[error("MK_ERR_400: Ledger invariant violation: {reason}")]
    LedgerInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration or policy value out of range.
    #[error("MK_ERR_900: Configuration error: {0}")]
    InvalidConfig(String),

    /// Serialization / deserialization error.
    #[error("MK_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Unrecoverable internal error.
    #[error("MK_ERR_902: Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn not_authorized(reason: impl Into<String>) -> Self {
        Self::NotAuthorized {
            reason: reason.into(),
        }
    }

    pub fn transfer_failure(reason: impl Into<String>) -> Self {
        Self::TransferFailure {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_offer_id_display() {
        let err = MarketError::InvalidOfferId(OfferId(3));
        let msg = format!("{err}");
        assert!(msg.starts_with("MK_ERR_100"), "Got: {msg}");
        assert!(msg.contains("Please, use a valid item"));
        assert!(msg.contains("offer:3"));
    }

    #[test]
    fn insufficient_bid_display() {
        let err = MarketError::InsufficientBid {
            offered: 1,
            highest: 5,
        };
        let msg = format!("{err}");
        assert!(msg.contains("MK_ERR_200"));
        assert!(msg.contains("Price must be greater"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn reason_is_surfaced() {
        let err = MarketError::invalid_state("Offer is in bidding");
        assert_eq!(format!("{err}"), "MK_ERR_101: Offer is in bidding");
    }

    #[test]
    fn serde_error_converts() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("nope");
        let err: MarketError = parse.unwrap_err().into();
        assert!(matches!(err, MarketError::Serialization(_)));
    }

    #[test]
    fn all_errors_have_mk_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(MarketError::AmountOverflow),
            Box::new(MarketError::Reentrancy(OfferId(1))),
            Box::new(MarketError::not_authorized("Neither seller nor bidder")),
            Box::new(MarketError::transfer_failure("rejected")),
            Box::new(MarketError::InsufficientPayment {
                expected: 2,
                paid: 1,
            }),
            Box::new(MarketError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("MK_ERR_"),
                "Error missing MK_ERR_ prefix: {msg}"
            );
        }
    }
}
