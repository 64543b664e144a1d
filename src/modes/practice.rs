use std::time::{Duration, Instant};

use rand::Rng;
use tracing::info;

use crate::analyzer;
use crate::error::{QuizError, Result};
use crate::generator::HolePolicy;
use crate::leaderboard::Leaderboard;
use crate::models::{Difficulty, PlayerSession};
use crate::modes::QuizItem;
use crate::question::{QuestionKind, Response, SOLUTION_STEPS};
use crate::scoring::{AnswerOutcome, ScoreUpdate, ScoringSystem};

pub const MODE_NAME: &str = "practice";

/// Result of one practice answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub correct: bool,
    pub update: ScoreUpdate,
    pub your_answer: String,
    pub correct_answer: String,
    pub explanation: &'static str,
    pub elapsed: Duration,
}

/// Worked solution for the current function.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub summary: Vec<(&'static str, String)>,
    pub steps: &'static [&'static str],
}

#[derive(Debug, Clone)]
struct Round {
    item: QuizItem,
    shown_at: Instant,
    answered: bool,
}

/// Untimed practice with hints and worked solutions.
#[derive(Debug, Clone)]
pub struct Practice {
    session: PlayerSession,
    focus: Option<QuestionKind>,
    holes: HolePolicy,
    scoring: ScoringSystem,
    current: Option<Round>,
    answered: u32,
}

impl Practice {
    pub fn new(session: PlayerSession) -> Self {
        Self {
            session,
            focus: None,
            holes: HolePolicy::Random,
            scoring: ScoringSystem::new(),
            current: None,
            answered: 0,
        }
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn difficulty(&self) -> Difficulty {
        self.session.difficulty
    }

    /// Changing the difficulty drops the current question.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if difficulty != self.session.difficulty {
            self.session.difficulty = difficulty;
            self.current = None;
        }
    }

    pub fn focus(&self) -> Option<QuestionKind> {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Option<QuestionKind>) {
        self.focus = focus;
    }

    pub fn set_hole_policy(&mut self, holes: HolePolicy) {
        self.holes = holes;
    }

    pub fn questions_answered(&self) -> u32 {
        self.answered
    }

    pub fn streak(&self) -> u32 {
        self.session.streak
    }

    pub fn next_question<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: Instant,
    ) -> Result<&QuizItem> {
        let item = QuizItem::generate(rng, self.session.difficulty, self.focus, self.holes)?;
        let round = self.current.insert(Round {
            item,
            shown_at: now,
            answered: false,
        });
        Ok(&round.item)
    }

    pub fn hint(&self) -> Result<&'static str> {
        let round = self.current.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        Ok(round.item.question.kind.hint())
    }

    pub fn solution(&self) -> Result<Solution> {
        let round = self.current.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        Ok(Solution {
            summary: analyzer::summary(&round.item.generated.analysis),
            steps: &SOLUTION_STEPS,
        })
    }

    /// Malformed responses leave the question open so the player can retry.
    pub fn submit(&mut self, response: &Response, now: Instant) -> Result<Feedback> {
        let round = self
            .current
            .as_mut()
            .filter(|r| !r.answered)
            .ok_or(QuizError::NoActiveQuestion)?;

        let question = &round.item.question;
        let correct = question.check(response)?;
        let elapsed = now.saturating_duration_since(round.shown_at);
        round.answered = true;

        let update = self.scoring.record_answer(
            &mut self.session,
            AnswerOutcome {
                correct,
                difficulty: round.item.difficulty,
                elapsed,
                kind: Some(question.kind),
            },
        );
        self.answered += 1;

        Ok(Feedback {
            correct,
            update,
            your_answer: question.describe(response),
            correct_answer: question.correct_choice().to_string(),
            explanation: question.explanation,
            elapsed,
        })
    }

    /// Clears the practice counters. The session score is kept.
    pub fn reset(&mut self) {
        self.answered = 0;
        self.session.streak = 0;
        self.current = None;
    }

    /// Records the session score under the `practice` mode and returns it.
    pub fn finish(self, leaderboard: &mut Leaderboard) -> PlayerSession {
        if self.answered > 0 || self.session.score > 0 {
            info!(player = %self.session.name, score = self.session.score, "practice finished");
            leaderboard.update_player_score(
                &self.session.name,
                self.session.score,
                self.session.stats.current_level,
                MODE_NAME,
            );
        }
        self.session
    }
}
