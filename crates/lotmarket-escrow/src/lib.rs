//! # lotmarket-escrow
//!
//! Holds the funds bidders pledge against open offers.
//!
//! ## Architecture
//!
//! 1. **EscrowLedger**: at most one pledge per offer; a higher pledge
//!    displaces the current one, which the caller must refund
//! 2. **EscrowConservation**: tracks everything pledged in and released out
//!    and checks that the ledger still holds exactly the difference
//!
//! ## Pledge Flow
//!
//! ```text
//! make_offer → EscrowLedger.pledge() → displaced pledge refunded
//! accept / cancel → EscrowLedger.release() → pledge paid out or refunded
//! ```
//!
//! The ledger never moves money itself. It records who is owed what; the
//! gateway performs the transfers after the ledger is updated.

pub mod conservation;
pub mod ledger;

pub use conservation::EscrowConservation;
pub use ledger::{EscrowLedger, EscrowSnapshot};
