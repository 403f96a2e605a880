//! Takara Vaults Core Library
//!
//! Domain types shared by every engine crate: investments, vault tiers,
//! reward boosts, difficulty readings, tax ledger entries, engine
//! configuration and the engine-wide error type.

pub mod boost;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod investment;
pub mod tax;
pub mod tier;

pub use boost::RewardBoost;
pub use config::{DifficultyCurve, EngineConfig, PriceWeights, TierPolicy, TierSchedule};
pub use difficulty::{DifficultyProvider, DifficultyReading, FixedDifficulty};
pub use error::{EngineError, ErrorKind, Result};
pub use investment::{Investment, InvestmentStatus, Vault};
pub use tax::{TaxEntry, TaxEntryKind};
pub use tier::VaultTier;
