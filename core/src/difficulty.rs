//! Mining difficulty readings
//!
//! Difficulty is a periodically persisted scalar >= 1.0. The engine only
//! ever uses the most recent reading; it never interpolates between
//! readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DifficultyReading {
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

impl DifficultyReading {
    pub fn new(value: f64, recorded_at: DateTime<Utc>) -> Result<Self> {
        if !value.is_finite() || value < 1.0 {
            return Err(EngineError::InvalidParameter {
                field: "difficulty",
                message: format!("must be a finite value >= 1.0, got {}", value),
            });
        }
        Ok(Self { value, recorded_at })
    }
}

/// Source of the latest difficulty reading
pub trait DifficultyProvider: Send + Sync {
    fn latest(&self) -> Result<DifficultyReading>;
}

/// Constant difficulty source, used at bootstrap and in tests
#[derive(Debug, Clone, Copy)]
pub struct FixedDifficulty(pub f64);

impl DifficultyProvider for FixedDifficulty {
    fn latest(&self) -> Result<DifficultyReading> {
        DifficultyReading::new(self.0, Utc::now())
    }
}
