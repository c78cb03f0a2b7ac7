//! Engine configuration.
//!
//! The reference configuration is an 8x8 grid with six token colors, 50
//! generation attempts per cell and 10 points per cleared tile.

use crate::board::TokenType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid dimension of the reference configuration
pub const DEFAULT_DIMENSION: usize = 8;

/// Number of token colors in the reference configuration
pub const DEFAULT_COLOR_COUNT: usize = 6;

/// Candidate draws per cell before the generator gives up and keeps the last one
pub const DEFAULT_GENERATION_ATTEMPTS: u32 = 50;

/// Points awarded for every physical tile cleared
pub const DEFAULT_POINTS_PER_TILE: u32 = 10;

/// Hard bound on cascade rounds per resolution
pub const DEFAULT_MAX_CASCADE_ROUNDS: u32 = 64;

/// Errors raised when a configuration cannot drive the engine
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("Grid dimension {0} is too small (minimum 3)")]
    DimensionTooSmall(usize),

    #[error("Color count {0} is out of range (2..=6)")]
    InvalidColorCount(usize),

    #[error("Generation attempts must be at least 1")]
    NoGenerationAttempts,

    #[error("Cascade round cap must be at least 1")]
    ZeroRoundCap,
}

/// Tunable parameters of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Side length N of the square grid
    pub dimension: usize,
    /// Number of token colors K in play
    pub color_count: usize,
    /// Retry bound of the board generator's rejection sampler
    pub generation_attempts: u32,
    /// Score awarded per cleared tile
    pub points_per_tile: u32,
    /// Optional cap on cascade rounds; `None` resolves until stable.
    ///
    /// When the cap trips, the session commits a board that still holds a
    /// match. Until the next swap clears it, every adjacent swap is accepted
    /// on the strength of that leftover match.
    pub max_cascade_rounds: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            color_count: DEFAULT_COLOR_COUNT,
            generation_attempts: DEFAULT_GENERATION_ATTEMPTS,
            points_per_tile: DEFAULT_POINTS_PER_TILE,
            max_cascade_rounds: Some(DEFAULT_MAX_CASCADE_ROUNDS),
        }
    }
}

impl EngineConfig {
    /// Reference configuration with a different grid size and color count
    pub fn new(dimension: usize, color_count: usize) -> Self {
        Self {
            dimension,
            color_count,
            ..Self::default()
        }
    }

    /// Check that the configuration can drive the engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension < 3 {
            return Err(ConfigError::DimensionTooSmall(self.dimension));
        }
        if !(2..=TokenType::COUNT).contains(&self.color_count) {
            return Err(ConfigError::InvalidColorCount(self.color_count));
        }
        if self.generation_attempts == 0 {
            return Err(ConfigError::NoGenerationAttempts);
        }
        if self.max_cascade_rounds == Some(0) {
            return Err(ConfigError::ZeroRoundCap);
        }
        Ok(())
    }

    /// Points awarded for clearing `tiles` physical tiles
    pub fn points_for(&self, tiles: usize) -> u64 {
        tiles as u64 * u64::from(self.points_per_tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_configuration() {
        let config = EngineConfig::default();
        assert_eq!(config.dimension, 8);
        assert_eq!(config.color_count, 6);
        assert_eq!(config.generation_attempts, 50);
        assert_eq!(config.points_per_tile, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(
            EngineConfig::new(2, 6).validate(),
            Err(ConfigError::DimensionTooSmall(2))
        );
        assert_eq!(
            EngineConfig::new(8, 7).validate(),
            Err(ConfigError::InvalidColorCount(7))
        );
        assert_eq!(
            EngineConfig::new(8, 1).validate(),
            Err(ConfigError::InvalidColorCount(1))
        );

        let mut config = EngineConfig::default();
        config.generation_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoGenerationAttempts));

        let mut config = EngineConfig::default();
        config.max_cascade_rounds = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroRoundCap));
    }

    #[test]
    fn test_points_are_flat_per_tile() {
        let config = EngineConfig::default();
        assert_eq!(config.points_for(0), 0);
        assert_eq!(config.points_for(3), 30);
        assert_eq!(config.points_for(7), 70);
    }
}
