use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Difficulty;
use crate::question::QuestionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstCorrect,
    SpeedDemon,
    Perfectionist,
    AsymptoteMaster,
    InterceptHunter,
    HoleFinder,
    LevelUp,
}

impl Achievement {
    pub const ALL: [Achievement; 7] = [
        Achievement::FirstCorrect,
        Achievement::SpeedDemon,
        Achievement::Perfectionist,
        Achievement::AsymptoteMaster,
        Achievement::InterceptHunter,
        Achievement::HoleFinder,
        Achievement::LevelUp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstCorrect => "First Success!",
            Achievement::SpeedDemon => "Speed Demon",
            Achievement::Perfectionist => "Perfectionist",
            Achievement::AsymptoteMaster => "Asymptote Master",
            Achievement::InterceptHunter => "Intercept Hunter",
            Achievement::HoleFinder => "Hole Finder",
            Achievement::LevelUp => "Level Up!",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstCorrect => "Got your first answer correct",
            Achievement::SpeedDemon => "Answered 5 questions in under 5 seconds each",
            Achievement::Perfectionist => "Got 10 questions correct in a row",
            Achievement::AsymptoteMaster => "Correctly identified 20 asymptotes",
            Achievement::InterceptHunter => "Found 15 intercepts correctly",
            Achievement::HoleFinder => "Identified 10 holes correctly",
            Achievement::LevelUp => "Reached a new level",
        }
    }

    /// Bonus points added to the session score when unlocked.
    pub fn bonus(&self) -> u32 {
        match self {
            Achievement::FirstCorrect => 50,
            Achievement::SpeedDemon => 200,
            Achievement::Perfectionist => 500,
            Achievement::AsymptoteMaster => 300,
            Achievement::InterceptHunter => 250,
            Achievement::HoleFinder => 200,
            Achievement::LevelUp => 100,
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-kind answer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindTally {
    pub total: u32,
    pub correct: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub total_questions: u32,
    pub total_correct: u32,
    /// Points earned from answers, excluding achievement bonuses.
    pub total_points: u32,
    pub total_time: Duration,
    pub quick_answers: u32,
    pub max_streak: u32,
    pub current_level: u32,
    pub max_earned_level: u32,
    pub by_kind: BTreeMap<QuestionKind, KindTally>,
    pub asymptotes_correct: u32,
    pub intercepts_correct: u32,
    pub holes_correct: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            total_questions: 0,
            total_correct: 0,
            total_points: 0,
            total_time: Duration::ZERO,
            quick_answers: 0,
            max_streak: 0,
            current_level: 1,
            max_earned_level: 1,
            by_kind: BTreeMap::new(),
            asymptotes_correct: 0,
            intercepts_correct: 0,
            holes_correct: 0,
        }
    }
}

/// One player's state for the length of a run. Only the scoring system
/// mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSession {
    pub name: String,
    pub score: u32,
    pub streak: u32,
    pub achievements: BTreeSet<Achievement>,
    pub difficulty: Difficulty,
    pub stats: PlayerStats,
}

impl PlayerSession {
    pub fn new(name: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            name: name.into(),
            score: 0,
            streak: 0,
            achievements: BTreeSet::new(),
            difficulty,
            stats: PlayerStats::default(),
        }
    }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn accuracy(&self) -> f64 {
        if self.stats.total_questions == 0 {
            return 0.0;
        }
        self.stats.total_correct as f64 / self.stats.total_questions as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = PlayerSession::new("ada", Difficulty::Moderate);
        assert_eq!(session.score, 0);
        assert_eq!(session.stats.current_level, 1);
        assert_eq!(session.stats.max_earned_level, 1);
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn test_achievement_bonuses() {
        let total: u32 = Achievement::ALL.iter().map(|a| a.bonus()).sum();
        assert_eq!(total, 1600);
        assert_eq!(Achievement::Perfectionist.bonus(), 500);
    }
}
