use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::{Achievement, Difficulty, PlayerSession, PlayerStats};
use crate::question::QuestionKind;

pub const BASE_POINTS: f64 = 100.0;
pub const QUICK_BONUS: f64 = 50.0;
pub const STREAK_BONUS: f64 = 25.0;
pub const QUICK_ANSWER: Duration = Duration::from_secs(5);
pub const MAX_LEVEL: u32 = 5;

pub fn calculate_score(
    correct: bool,
    difficulty: Difficulty,
    elapsed: Duration,
    streak: u32,
) -> u32 {
    if !correct {
        return 0;
    }

    let mut score = BASE_POINTS * difficulty.score_multiplier();
    if elapsed < QUICK_ANSWER {
        score += QUICK_BONUS;
    }
    if streak >= 3 {
        score += (streak - 2).min(10) as f64 * STREAK_BONUS;
    }
    score as u32
}

/// Score needed to reach `level`.
pub fn level_requirement(level: u32) -> f64 {
    1000.0 * (level as f64).powf(1.5)
}

pub fn level_for_score(score: u32) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && score as f64 >= level_requirement(level + 1) {
        level += 1;
    }
    level
}

/// Percent of the way from `level` to the next one, clamped to 0..=100.
pub fn progress_to_next_level(score: u32, level: u32) -> f64 {
    if level >= MAX_LEVEL {
        return 100.0;
    }
    let current = level_requirement(level);
    let next = level_requirement(level + 1);
    ((score as f64 - current) / (next - current) * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub difficulty: Difficulty,
    pub elapsed: Duration,
    pub kind: Option<QuestionKind>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreUpdate {
    /// Points from the answer itself.
    pub points: u32,
    /// Points from achievements unlocked by this answer.
    pub bonus: u32,
    pub unlocked: Vec<Achievement>,
}

impl ScoreUpdate {
    pub fn total(&self) -> u32 {
        self.points + self.bonus
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringSystem;

impl ScoringSystem {
    pub fn new() -> Self {
        ScoringSystem
    }

    pub fn record_answer(
        &self,
        session: &mut PlayerSession,
        outcome: AnswerOutcome,
    ) -> ScoreUpdate {
        let streak = if outcome.correct { session.streak + 1 } else { 0 };
        let points = calculate_score(outcome.correct, outcome.difficulty, outcome.elapsed, streak);

        session.streak = streak;
        session.add_points(points);
        update_stats(&mut session.stats, &outcome, streak, points);

        let mut update = ScoreUpdate {
            points,
            ..ScoreUpdate::default()
        };
        for achievement in earned(&session.stats) {
            if session.achievements.insert(achievement) {
                session.add_points(achievement.bonus());
                update.bonus += achievement.bonus();
                update.unlocked.push(achievement);
            }
        }
        if session.stats.current_level > session.stats.max_earned_level {
            session.stats.max_earned_level = session.stats.current_level;
            if session.achievements.insert(Achievement::LevelUp) {
                session.add_points(Achievement::LevelUp.bonus());
                update.bonus += Achievement::LevelUp.bonus();
                update.unlocked.push(Achievement::LevelUp);
            }
        }
        update
    }
}

fn update_stats(stats: &mut PlayerStats, outcome: &AnswerOutcome, streak: u32, points: u32) {
    stats.total_questions += 1;
    stats.total_time += outcome.elapsed;
    stats.total_points = stats.total_points.saturating_add(points);

    if outcome.correct {
        stats.total_correct += 1;
        stats.max_streak = stats.max_streak.max(streak);
        if outcome.elapsed < QUICK_ANSWER {
            stats.quick_answers += 1;
        }
        match outcome.kind {
            Some(kind) if kind.is_asymptote() => stats.asymptotes_correct += 1,
            Some(QuestionKind::XIntercepts) => stats.intercepts_correct += 1,
            Some(QuestionKind::Holes) => stats.holes_correct += 1,
            _ => {}
        }
    }

    if let Some(kind) = outcome.kind {
        let tally = stats.by_kind.entry(kind).or_default();
        tally.total += 1;
        if outcome.correct {
            tally.correct += 1;
        }
    }

    stats.current_level = level_for_score(stats.total_points);
}

/// Threshold achievements the stats currently qualify for.
fn earned(stats: &PlayerStats) -> Vec<Achievement> {
    let checks = [
        (Achievement::FirstCorrect, stats.total_correct >= 1),
        (Achievement::SpeedDemon, stats.quick_answers >= 5),
        (Achievement::Perfectionist, stats.max_streak >= 10),
        (Achievement::AsymptoteMaster, stats.asymptotes_correct >= 20),
        (Achievement::InterceptHunter, stats.intercepts_correct >= 15),
        (Achievement::HoleFinder, stats.holes_correct >= 10),
    ];
    checks
        .into_iter()
        .filter(|(_, ok)| *ok)
        .map(|(a, _)| a)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindPerformance {
    pub total: u32,
    pub correct: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analytics {
    pub accuracy: f64,
    pub average_time: Duration,
    pub points_per_question: f64,
    pub streak_efficiency: f64,
    pub quick_answer_rate: f64,
    pub by_kind: BTreeMap<QuestionKind, KindPerformance>,
}

pub fn analytics(stats: &PlayerStats) -> Analytics {
    let questions = stats.total_questions.max(1);
    let by_kind = stats
        .by_kind
        .iter()
        .map(|(kind, tally)| {
            let accuracy = if tally.total > 0 {
                tally.correct as f64 / tally.total as f64 * 100.0
            } else {
                0.0
            };
            (
                *kind,
                KindPerformance {
                    total: tally.total,
                    correct: tally.correct,
                    accuracy,
                },
            )
        })
        .collect();

    Analytics {
        accuracy: stats.total_correct as f64 / questions as f64 * 100.0,
        average_time: stats.total_time / questions,
        points_per_question: stats.total_points as f64 / questions as f64,
        streak_efficiency: stats.max_streak as f64 / questions as f64 * 100.0,
        quick_answer_rate: stats.quick_answers as f64 / stats.total_correct.max(1) as f64 * 100.0,
        by_kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(correct: bool, secs: u64, kind: QuestionKind) -> AnswerOutcome {
        AnswerOutcome {
            correct,
            difficulty: Difficulty::Basic,
            elapsed: Duration::from_secs(secs),
            kind: Some(kind),
        }
    }

    #[test]
    fn test_calculate_score() {
        let slow = Duration::from_secs(10);
        let quick = Duration::from_secs(2);
        assert_eq!(calculate_score(false, Difficulty::Expert, quick, 9), 0);
        assert_eq!(calculate_score(true, Difficulty::Basic, slow, 0), 100);
        assert_eq!(calculate_score(true, Difficulty::Moderate, slow, 1), 120);
        assert_eq!(calculate_score(true, Difficulty::Advanced, quick, 0), 200);
        assert_eq!(calculate_score(true, Difficulty::Basic, slow, 3), 125);
        assert_eq!(calculate_score(true, Difficulty::Basic, slow, 12), 350);
        assert_eq!(calculate_score(true, Difficulty::Basic, slow, 40), 350);
    }

    #[test]
    fn test_streak_bonus_is_monotonic() {
        let slow = Duration::from_secs(10);
        for d in Difficulty::ALL {
            let mut previous = 0;
            for streak in 0..30 {
                let score = calculate_score(true, d, slow, streak);
                assert!(score >= previous);
                assert!(score > 0);
                previous = score;
            }
        }
    }

    #[test]
    fn test_levels() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(2828), 1);
        assert_eq!(level_for_score(2829), 2);
        assert_eq!(level_for_score(1_000_000), 5);
        assert_eq!(progress_to_next_level(10, 5), 100.0);
        assert_eq!(progress_to_next_level(0, 1), 0.0);
        let halfway = (level_requirement(1) + level_requirement(2)) / 2.0;
        assert!((progress_to_next_level(halfway as u32, 1) - 50.0).abs() < 0.1);
    }

    #[test]
    fn test_first_correct_unlocks_once() {
        let scoring = ScoringSystem::new();
        let mut session = PlayerSession::new("ada", Difficulty::Basic);

        let miss = scoring.record_answer(&mut session, outcome(false, 10, QuestionKind::Holes));
        assert_eq!(miss.total(), 0);
        assert_eq!(session.streak, 0);

        let hit = scoring.record_answer(&mut session, outcome(true, 10, QuestionKind::Holes));
        assert_eq!(hit.points, 100);
        assert_eq!(hit.unlocked, vec![Achievement::FirstCorrect]);
        assert_eq!(session.score, 150);

        let again = scoring.record_answer(&mut session, outcome(true, 10, QuestionKind::Holes));
        assert!(again.unlocked.is_empty());
        assert_eq!(session.streak, 2);
    }

    #[test]
    fn test_perfectionist_and_speed_demon() {
        let scoring = ScoringSystem::new();
        let mut session = PlayerSession::new("ada", Difficulty::Basic);
        let mut unlocked = Vec::new();
        for _ in 0..10 {
            let update =
                scoring.record_answer(&mut session, outcome(true, 1, QuestionKind::XIntercepts));
            unlocked.extend(update.unlocked);
        }
        assert!(unlocked.contains(&Achievement::SpeedDemon));
        assert!(unlocked.contains(&Achievement::Perfectionist));
        assert_eq!(session.stats.max_streak, 10);
        assert_eq!(session.stats.intercepts_correct, 10);
    }

    #[test]
    fn test_level_up_after_crossing_requirement() {
        let scoring = ScoringSystem::new();
        let mut session = PlayerSession::new("ada", Difficulty::Expert);
        let mut leveled = false;
        for _ in 0..20 {
            let update = scoring.record_answer(
                &mut session,
                AnswerOutcome {
                    correct: true,
                    difficulty: Difficulty::Expert,
                    elapsed: Duration::from_secs(1),
                    kind: None,
                },
            );
            if update.unlocked.contains(&Achievement::LevelUp) {
                assert!(session.stats.total_points as f64 >= level_requirement(2));
                leveled = true;
            }
        }
        assert!(leveled);
        assert!(session.stats.current_level >= 2);
    }

    #[test]
    fn test_correct_answers_never_decrease_score() {
        let scoring = ScoringSystem::new();
        let mut session = PlayerSession::new("ada", Difficulty::Basic);
        for i in 0..40 {
            let before = session.score;
            let correct = i % 3 != 0;
            let kind = QuestionKind::ALL[(i % 4) as usize];
            scoring.record_answer(&mut session, outcome(correct, i % 7, kind));
            assert!(session.score >= before);
        }
    }

    #[test]
    fn test_analytics() {
        let scoring = ScoringSystem::new();
        let mut session = PlayerSession::new("ada", Difficulty::Basic);
        scoring.record_answer(&mut session, outcome(true, 2, QuestionKind::Holes));
        scoring.record_answer(&mut session, outcome(false, 6, QuestionKind::Holes));
        scoring.record_answer(&mut session, outcome(true, 10, QuestionKind::VerticalAsymptotes));

        let a = analytics(&session.stats);
        assert!((a.accuracy - 66.666).abs() < 0.01);
        assert_eq!(a.average_time, Duration::from_secs(6));
        assert_eq!(a.quick_answer_rate, 50.0);
        assert_eq!(a.by_kind[&QuestionKind::Holes].total, 2);
        assert_eq!(a.by_kind[&QuestionKind::Holes].accuracy, 50.0);
        assert_eq!(a.by_kind[&QuestionKind::VerticalAsymptotes].correct, 1);
    }
}
