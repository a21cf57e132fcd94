//! # lotmarket-settlement
//!
//! **Transaction Gateway**: the public operation surface of the marketplace.
//!
//! ## Architecture
//!
//! Every operation enters the [`TransactionGateway`], which:
//! 1. Looks the offer up (unknown ids fail before any other check)
//! 2. Validates caller, bidding mode and amounts
//! 3. Commits the [`OfferRegistry`] and escrow ledger changes
//! 4. Executes custody and funds effects against the host
//! 5. Appends the resulting event to the [`EventJournal`]
//!
//! If step 4 fails, the host is rolled back to its checkpoint and the
//! registry and ledger entries are restored, so nothing of the operation
//! survives.
//!
//! ## Proceeds
//!
//! The [`FeeEngine`] splits each sale total into seller, platform fee and
//! royalty shares using truncated basis-point arithmetic. The truncation
//! remainder stays with the seller.

pub mod fee_engine;
pub mod gateway;
pub mod guard;
pub mod journal;
pub mod registry;

pub use fee_engine::FeeEngine;
pub use gateway::TransactionGateway;
pub use guard::OfferGuard;
pub use journal::{EncodedEvent, EventJournal, JournalEntry};
pub use registry::OfferRegistry;
