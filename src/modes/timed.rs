use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use rand::Rng;
use tracing::info;

use crate::error::{QuizError, Result};
use crate::generator::HolePolicy;
use crate::leaderboard::Leaderboard;
use crate::models::session::KindTally;
use crate::models::{Difficulty, PlayerSession};
use crate::modes::QuizItem;
use crate::question::{QuestionKind, Response};
use crate::scoring::{AnswerOutcome, ScoringSystem};

pub const MODE_PREFIX: &str = "timed_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimedKind {
    Blitz,
    Sprint,
    Marathon,
}

impl TimedKind {
    pub const ALL: [TimedKind; 3] = [TimedKind::Blitz, TimedKind::Sprint, TimedKind::Marathon];

    pub fn duration(&self) -> Duration {
        match self {
            TimedKind::Blitz => Duration::from_secs(30),
            TimedKind::Sprint => Duration::from_secs(60),
            TimedKind::Marathon => Duration::from_secs(300),
        }
    }

    pub fn question_count(&self) -> usize {
        match self {
            TimedKind::Blitz => 5,
            TimedKind::Sprint => 10,
            TimedKind::Marathon => 25,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TimedKind::Blitz => "30-Second Blitz",
            TimedKind::Sprint => "1-Minute Sprint",
            TimedKind::Marathon => "5-Minute Marathon",
        }
    }

    pub fn mode_name(&self) -> String {
        format!("{}{}", MODE_PREFIX, self.as_str())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimedKind::Blitz => "blitz",
            TimedKind::Sprint => "sprint",
            TimedKind::Marathon => "marathon",
        }
    }

    /// Difficulty of the question at `index`. Blitz is random, the others
    /// ramp up as the challenge goes on.
    pub fn difficulty_for<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Difficulty {
        let level = match self {
            TimedKind::Blitz => rng.gen_range(1..=3),
            TimedKind::Sprint => (index / 2 + 1).min(5),
            TimedKind::Marathon => (index / 5 + 1).min(5),
        };
        Difficulty::clamped(level as u8)
    }
}

impl fmt::Display for TimedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedAnswer {
    pub index: usize,
    pub response: String,
    pub correct: bool,
    pub elapsed: Duration,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Excellent,
    Great,
    Good,
    KeepPracticing,
}

impl PerformanceTier {
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 90.0 {
            PerformanceTier::Excellent
        } else if accuracy >= 75.0 {
            PerformanceTier::Great
        } else if accuracy >= 50.0 {
            PerformanceTier::Good
        } else {
            PerformanceTier::KeepPracticing
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent performance! You're a rational function expert!",
            PerformanceTier::Great => "Great job! You're getting the hang of this!",
            PerformanceTier::Good => "Good effort! Keep practicing to improve your accuracy.",
            PerformanceTier::KeepPracticing => {
                "Don't worry! Practice makes perfect. Try practice mode to build your skills."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedResults {
    pub score: u32,
    pub answered: usize,
    pub total_questions: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub average_time: Duration,
    pub total_time: Duration,
    pub by_kind: BTreeMap<QuestionKind, KindTally>,
    pub tier: PerformanceTier,
}

/// A fixed set of questions against the clock.
#[derive(Debug, Clone)]
pub struct TimedChallenge {
    kind: TimedKind,
    items: Vec<QuizItem>,
    answers: Vec<TimedAnswer>,
    session: PlayerSession,
    scoring: ScoringSystem,
    started_at: Instant,
    shown_at: Instant,
    ended_at: Option<Instant>,
}

impl TimedChallenge {
    /// Generates every question up front and starts the clock at `now`.
    pub fn start<R: Rng + ?Sized>(
        rng: &mut R,
        kind: TimedKind,
        session: PlayerSession,
        now: Instant,
    ) -> Result<Self> {
        let items = (0..kind.question_count())
            .map(|i| {
                let difficulty = kind.difficulty_for(i, rng);
                QuizItem::generate(rng, difficulty, None, HolePolicy::Random)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(player = %session.name, kind = kind.as_str(), "timed challenge started");
        Ok(Self {
            kind,
            items,
            answers: Vec::new(),
            session,
            scoring: ScoringSystem::new(),
            started_at: now,
            shown_at: now,
            ended_at: None,
        })
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    /// Zero-based index of the question being asked.
    pub fn position(&self) -> usize {
        self.answers.len()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.kind
            .duration()
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.ended_at.is_some()
            || self.remaining(now).is_zero()
            || self.position() >= self.items.len()
    }

    pub fn current(&self, now: Instant) -> Option<&QuizItem> {
        if self.is_finished(now) {
            return None;
        }
        self.items.get(self.position())
    }

    pub fn submit(&mut self, response: &Response, now: Instant) -> Result<TimedAnswer> {
        if self.ended_at.is_none() && self.remaining(now).is_zero() {
            self.ended_at = Some(self.started_at + self.kind.duration());
            return Err(QuizError::TimeUp);
        }
        let index = self.position();
        let item = self
            .current(now)
            .ok_or(QuizError::NoActiveQuestion)?;

        let correct = item.question.check(response)?;
        let elapsed = now.saturating_duration_since(self.shown_at);
        let kind = item.question.kind;
        let difficulty = item.difficulty;
        let text = item.question.describe(response);

        let update = self.scoring.record_answer(
            &mut self.session,
            AnswerOutcome {
                correct,
                difficulty,
                elapsed,
                kind: Some(kind),
            },
        );

        let answer = TimedAnswer {
            index,
            response: text,
            correct,
            elapsed,
            points: update.total(),
        };
        self.answers.push(answer.clone());
        self.shown_at = now;
        if self.position() >= self.items.len() {
            self.ended_at = Some(now);
        }
        Ok(answer)
    }

    pub fn results(&self, now: Instant) -> TimedResults {
        let end = self.ended_at.unwrap_or(now);
        let total_time = end
            .saturating_duration_since(self.started_at)
            .min(self.kind.duration());
        let answered = self.answers.len();
        let correct = self.answers.iter().filter(|a| a.correct).count();
        let accuracy = correct as f64 / answered.max(1) as f64 * 100.0;

        let mut by_kind: BTreeMap<QuestionKind, KindTally> = BTreeMap::new();
        for answer in &self.answers {
            let tally = by_kind
                .entry(self.items[answer.index].question.kind)
                .or_default();
            tally.total += 1;
            if answer.correct {
                tally.correct += 1;
            }
        }

        TimedResults {
            score: self.answers.iter().map(|a| a.points).sum(),
            answered,
            total_questions: self.items.len(),
            correct,
            accuracy,
            average_time: total_time / answered.max(1) as u32,
            total_time,
            by_kind,
            tier: PerformanceTier::from_accuracy(accuracy),
        }
    }

    /// Records the final score under `timed_<kind>` and hands the session back.
    pub fn finish(
        self,
        leaderboard: &mut Leaderboard,
        now: Instant,
    ) -> (TimedResults, PlayerSession) {
        let results = self.results(now);
        info!(
            player = %self.session.name,
            kind = self.kind.as_str(),
            score = results.score,
            "timed challenge finished"
        );
        leaderboard.update_player_score(
            &self.session.name,
            results.score,
            self.session.stats.current_level,
            &self.kind.mode_name(),
        );
        (results, self.session)
    }
}

/// Best score per timed challenge kind for `player`.
pub fn personal_bests(leaderboard: &Leaderboard, player: &str) -> Vec<(TimedKind, u32)> {
    let bests = leaderboard.best_by_mode(player, MODE_PREFIX);
    TimedKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let mode = kind.mode_name();
            bests
                .iter()
                .find(|(m, _)| *m == mode)
                .map(|(_, best)| (kind, *best))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn start(kind: TimedKind, seed: u64, now: Instant) -> TimedChallenge {
        let mut rng = StdRng::seed_from_u64(seed);
        TimedChallenge::start(&mut rng, kind, PlayerSession::new("ada", Difficulty::Basic), now)
            .unwrap()
    }

    fn answer_correctly(c: &mut TimedChallenge, now: Instant) -> TimedAnswer {
        let index = c.current(now).unwrap().question.correct_index;
        c.submit(&Response::Choice(index), now).unwrap()
    }

    #[test]
    fn test_difficulty_progression() {
        let mut rng = StdRng::seed_from_u64(0);
        let sprint: Vec<u8> = (0..10)
            .map(|i| TimedKind::Sprint.difficulty_for(i, &mut rng).level())
            .collect();
        assert_eq!(sprint, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
        assert_eq!(TimedKind::Marathon.difficulty_for(24, &mut rng), Difficulty::Expert);
        assert_eq!(TimedKind::Marathon.difficulty_for(4, &mut rng), Difficulty::Basic);
        for i in 0..20 {
            assert!(TimedKind::Blitz.difficulty_for(i, &mut rng).level() <= 3);
        }
    }

    #[test]
    fn test_generates_all_questions() {
        let now = Instant::now();
        let c = start(TimedKind::Sprint, 1, now);
        assert_eq!(c.items().len(), 10);
        assert_eq!(c.items()[9].difficulty, Difficulty::Expert);
        assert_eq!(c.remaining(now), Duration::from_secs(60));
    }

    #[test]
    fn test_per_question_elapsed() {
        let t0 = Instant::now();
        let mut c = start(TimedKind::Blitz, 3, t0);

        let first = answer_correctly(&mut c, t0 + Duration::from_secs(4));
        assert_eq!(first.elapsed, Duration::from_secs(4));
        let second = answer_correctly(&mut c, t0 + Duration::from_secs(10));
        assert_eq!(second.elapsed, Duration::from_secs(6));
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn test_ends_when_all_answered() {
        let t0 = Instant::now();
        let mut c = start(TimedKind::Blitz, 9, t0);
        for i in 1..=5 {
            answer_correctly(&mut c, t0 + Duration::from_secs(i));
        }
        let done = t0 + Duration::from_secs(5);
        assert!(c.is_finished(done));
        assert!(matches!(
            c.submit(&Response::Choice(0), done),
            Err(QuizError::NoActiveQuestion)
        ));

        let results = c.results(t0 + Duration::from_secs(25));
        assert_eq!(results.answered, 5);
        assert_eq!(results.correct, 5);
        assert_eq!(results.accuracy, 100.0);
        assert_eq!(results.total_time, Duration::from_secs(5));
        assert_eq!(results.average_time, Duration::from_secs(1));
        assert_eq!(results.tier, PerformanceTier::Excellent);
        assert_eq!(results.by_kind.values().map(|t| t.total).sum::<u32>(), 5);
    }

    #[test]
    fn test_time_runs_out() {
        let t0 = Instant::now();
        let mut c = start(TimedKind::Blitz, 5, t0);
        answer_correctly(&mut c, t0 + Duration::from_secs(3));

        let late = t0 + Duration::from_secs(31);
        assert!(c.is_finished(late));
        assert!(c.current(late).is_none());
        assert!(matches!(
            c.submit(&Response::Choice(0), late),
            Err(QuizError::TimeUp)
        ));

        let results = c.results(late);
        assert_eq!(results.answered, 1);
        assert_eq!(results.total_questions, 5);
        assert_eq!(results.total_time, Duration::from_secs(30));
    }

    #[test]
    fn test_tiers() {
        assert_eq!(PerformanceTier::from_accuracy(90.0), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_accuracy(80.0), PerformanceTier::Great);
        assert_eq!(PerformanceTier::from_accuracy(50.0), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_accuracy(10.0), PerformanceTier::KeepPracticing);
    }

    #[test]
    fn test_finish_records_mode_and_bests() {
        let dir = TempDir::new().unwrap();
        let mut board = Leaderboard::open(dir.path().join("lb.json"));
        let t0 = Instant::now();
        let mut c = start(TimedKind::Blitz, 12, t0);
        answer_correctly(&mut c, t0 + Duration::from_secs(2));

        let (results, _) = c.finish(&mut board, t0 + Duration::from_secs(40));
        let history = board.player_history("ada", 5);
        assert_eq!(history[0].mode, "timed_blitz");
        assert_eq!(history[0].score, results.score);
        assert_eq!(
            personal_bests(&board, "ada"),
            vec![(TimedKind::Blitz, results.score)]
        );
    }
}
