//! System-wide constants for the LotMarket settlement engine.

/// Basis points in one whole (100.00%).
pub const BASIS_POINTS_DENOMINATOR: u128 = 10_000;

/// Default platform fee (500 = 5.00%).
pub const DEFAULT_FEE_BASIS_POINTS: u16 = 500;

/// Highest platform fee a configuration may set (50.00%).
pub const MAX_FEE_BASIS_POINTS: u16 = 5_000;

/// Highest royalty a policy may report (50.00%).
///
/// Together with [`MAX_FEE_BASIS_POINTS`] this keeps fee + royalty at or
/// below the sale total.
pub const MAX_ROYALTY_BASIS_POINTS: u16 = 5_000;

/// Number of journal entries kept in memory before the oldest are dropped.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 100_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "LotMarket";
