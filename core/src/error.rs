//! Engine error types
//!
//! Every operation across the engine returns `Result<T, EngineError>`.
//! Variants are named so callers can distinguish "already returned" from
//! "not found" from "store unreachable" and respond accordingly; `kind()`
//! groups them into the four coarse categories the admin layer maps to
//! HTTP status codes.

use thiserror::Error;

/// Coarse error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape or range; caller should fix the request
    Validation,
    /// Operation not valid in the current lifecycle state
    StateConflict,
    /// Persistence or difficulty source unreachable; caller may retry
    DependencyUnavailable,
    /// Required constant missing or malformed at construction
    Configuration,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid {field}: {message}")]
    InvalidParameter { field: &'static str, message: String },

    #[error("Investment not found: {0}")]
    InvestmentNotFound(String),

    #[error("Investment {id} is not active (status: {status})")]
    InvestmentNotActive { id: String, status: String },

    #[error("Investment already sold: {0}")]
    AlreadySold(String),

    #[error("Boost already posted for investment {0}")]
    BoostAlreadyPosted(String),

    #[error("Boost not found for investment {0}")]
    BoostNotFound(String),

    #[error("Boost already returned for investment {0}")]
    BoostAlreadyReturned(String),

    #[error("Insufficient treasury balance: requested {requested}, available {available}")]
    InsufficientTreasuryBalance { requested: f64, available: f64 },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Difficulty reading unavailable: {0}")]
    DifficultyUnavailable(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidAmount(_)
            | EngineError::InvalidParameter { .. }
            | EngineError::InvestmentNotFound(_)
            | EngineError::BoostNotFound(_) => ErrorKind::Validation,

            EngineError::InvestmentNotActive { .. }
            | EngineError::AlreadySold(_)
            | EngineError::BoostAlreadyPosted(_)
            | EngineError::BoostAlreadyReturned(_)
            | EngineError::InsufficientTreasuryBalance { .. } => ErrorKind::StateConflict,

            EngineError::StoreUnavailable(_) | EngineError::DifficultyUnavailable(_) => {
                ErrorKind::DependencyUnavailable
            }

            EngineError::MissingConfig(_) | EngineError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
