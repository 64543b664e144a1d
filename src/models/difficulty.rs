use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Moderate,
    Advanced,
    Complex,
    Expert,
}

/// Sampling limits for the function generator at one difficulty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorLimits {
    pub max_degree: usize,
    pub max_factors: usize,
    pub holes_prob: f64,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Basic,
        Difficulty::Moderate,
        Difficulty::Advanced,
        Difficulty::Complex,
        Difficulty::Expert,
    ];

    pub fn from_level(level: u8) -> Result<Self> {
        match level {
            1 => Ok(Difficulty::Basic),
            2 => Ok(Difficulty::Moderate),
            3 => Ok(Difficulty::Advanced),
            4 => Ok(Difficulty::Complex),
            5 => Ok(Difficulty::Expert),
            other => Err(QuizError::InvalidDifficulty(other)),
        }
    }

    /// Like [`Difficulty::from_level`] but clamps out-of-range levels.
    pub fn clamped(level: u8) -> Self {
        Difficulty::from_level(level.clamp(1, 5)).unwrap_or(Difficulty::Basic)
    }

    pub fn level(&self) -> u8 {
        match self {
            Difficulty::Basic => 1,
            Difficulty::Moderate => 2,
            Difficulty::Advanced => 3,
            Difficulty::Complex => 4,
            Difficulty::Expert => 5,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Basic => "Basic",
            Difficulty::Moderate => "Moderate",
            Difficulty::Advanced => "Advanced",
            Difficulty::Complex => "Complex",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Difficulty::Basic => "Basic rational functions with simple factors",
            Difficulty::Moderate => "Moderate complexity with multiple factors",
            Difficulty::Advanced => "Advanced functions with higher degrees",
            Difficulty::Complex => "Complex functions with multiple asymptotes",
            Difficulty::Expert => "Expert level with challenging compositions",
        }
    }

    pub fn stars(&self) -> String {
        "*".repeat(self.level() as usize)
    }

    pub fn limits(&self) -> GeneratorLimits {
        let (max_degree, max_factors, holes_prob) = match self {
            Difficulty::Basic => (2, 2, 0.3),
            Difficulty::Moderate => (3, 3, 0.4),
            Difficulty::Advanced => (4, 4, 0.5),
            Difficulty::Complex => (5, 5, 0.6),
            Difficulty::Expert => (6, 6, 0.7),
        };
        GeneratorLimits {
            max_degree,
            max_factors,
            holes_prob,
        }
    }

    /// Multiplier applied to the base points of a correct answer.
    pub fn score_multiplier(&self) -> f64 {
        match self {
            Difficulty::Basic => 1.0,
            Difficulty::Moderate => 1.2,
            Difficulty::Advanced => 1.5,
            Difficulty::Complex => 1.8,
            Difficulty::Expert => 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trip() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_level(d.level()).unwrap(), d);
        }
        assert!(matches!(
            Difficulty::from_level(6),
            Err(QuizError::InvalidDifficulty(6))
        ));
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Difficulty::clamped(0), Difficulty::Basic);
        assert_eq!(Difficulty::clamped(9), Difficulty::Expert);
    }

    #[test]
    fn test_limits_grow_with_level() {
        let limits: Vec<_> = Difficulty::ALL.iter().map(|d| d.limits()).collect();
        for pair in limits.windows(2) {
            assert!(pair[1].max_degree > pair[0].max_degree);
            assert!(pair[1].holes_prob > pair[0].holes_prob);
        }
        assert_eq!(Difficulty::Basic.limits().max_degree, 2);
        assert_eq!(Difficulty::Expert.limits().max_factors, 6);
    }
}
