use std::fmt;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::error::{QuizError, Result};
use crate::generator::HolePolicy;
use crate::leaderboard::Leaderboard;
use crate::models::{Difficulty, PlayerSession};
use crate::modes::QuizItem;
use crate::question::Response;
use crate::scoring::{AnswerOutcome, ScoringSystem};

pub const MAX_PLAYERS: usize = 4;
pub const BOT_NAMES: [&str; 4] = ["MathBot", "GraphGuru", "AsymptoteAce", "FunctionFinder"];
pub const MODE_PREFIX: &str = "multiplayer_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoomKind {
    Quick,
    Standard,
    Expert,
}

impl RoomKind {
    pub fn duration(&self) -> Duration {
        match self {
            RoomKind::Quick => Duration::from_secs(120),
            RoomKind::Standard => Duration::from_secs(300),
            RoomKind::Expert => Duration::from_secs(600),
        }
    }

    pub fn question_count(&self) -> usize {
        match self {
            RoomKind::Quick => 8,
            RoomKind::Standard => 15,
            RoomKind::Expert => 20,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RoomKind::Quick => "Quick Quiz (2 min)",
            RoomKind::Standard => "Standard Quiz (5 min)",
            RoomKind::Expert => "Expert Quiz (10 min)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::Quick => "quick",
            RoomKind::Standard => "standard",
            RoomKind::Expert => "expert",
        }
    }

    pub fn mode_name(&self) -> String {
        format!("{}{}", MODE_PREFIX, self.as_str())
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Difficulty for question `index` of `total`: easy first third, harder
/// middle third, hardest last third.
pub fn difficulty_for<R: Rng + ?Sized>(index: usize, total: usize, rng: &mut R) -> Difficulty {
    let level = if index < total / 3 {
        rng.gen_range(1..=2)
    } else if index < 2 * total / 3 {
        rng.gen_range(2..=4)
    } else {
        rng.gen_range(3..=5)
    };
    Difficulty::clamped(level)
}

/// Chance that a bot answers a question of `difficulty` correctly.
pub fn bot_accuracy(difficulty: Difficulty) -> f64 {
    (1.0 - 0.15 * difficulty.level() as f64).max(0.4)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundAnswer {
    pub question: usize,
    pub response: String,
    pub correct: bool,
    pub elapsed: Duration,
    pub points: u32,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub session: PlayerSession,
    pub is_bot: bool,
    pub answers: Vec<RoundAnswer>,
    turn_started_at: Option<Instant>,
}

impl Participant {
    fn new(name: &str, is_bot: bool) -> Self {
        Self {
            session: PlayerSession::new(name, Difficulty::Basic),
            is_bot,
            answers: Vec::new(),
            turn_started_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.session.name
    }

    fn has_answered(&self, question: usize) -> bool {
        self.answers.iter().any(|a| a.question == question)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Waiting,
    Active,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub rank: usize,
    pub name: String,
    pub score: u32,
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalResult {
    pub rank: usize,
    pub name: String,
    pub score: u32,
    pub correct: usize,
    pub answered: usize,
    pub accuracy: f64,
    pub is_bot: bool,
}

/// A local quiz room: humans take turns at one terminal, bots fill in.
#[derive(Debug, Clone)]
pub struct Room {
    code: String,
    kind: RoomKind,
    players: Vec<Participant>,
    items: Vec<QuizItem>,
    current: usize,
    state: RoomState,
    scoring: ScoringSystem,
    started_at: Option<Instant>,
    shown_at: Option<Instant>,
}

impl Room {
    /// Opens a room hosted by `host` and generates its questions.
    pub fn create<R: Rng + ?Sized>(rng: &mut R, kind: RoomKind, host: &str) -> Result<Self> {
        let code = format!("ROOM{}", rng.gen_range(1000..=9999));
        let total = kind.question_count();
        let items = (0..total)
            .map(|i| {
                let difficulty = difficulty_for(i, total, rng);
                QuizItem::generate(rng, difficulty, None, HolePolicy::Random)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(room = %code, kind = kind.as_str(), host, "room created");
        Ok(Self {
            code,
            kind,
            players: vec![Participant::new(host, false)],
            items,
            current: 0,
            state: RoomState::Waiting,
            scoring: ScoringSystem::new(),
            started_at: None,
            shown_at: None,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn players(&self) -> &[Participant] {
        &self.players
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    /// Zero-based index of the question being asked.
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn join(&mut self, name: &str) -> Result<()> {
        self.add_player(name, false)
    }

    fn add_player(&mut self, name: &str, is_bot: bool) -> Result<()> {
        if self.state != RoomState::Waiting {
            return Err(QuizError::GameInProgress(self.code.clone()));
        }
        if self.players.iter().any(|p| p.name() == name) {
            return Err(QuizError::DuplicatePlayer(name.to_string()));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(QuizError::RoomFull(self.code.clone()));
        }
        self.players.push(Participant::new(name, is_bot));
        info!(room = %self.code, player = name, bot = is_bot, "player joined");
        Ok(())
    }

    /// Adds between one and three bots, limited by the free seats. Returns
    /// the names added.
    pub fn fill_with_bots<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<String> {
        let wanted = rng.gen_range(1..=3);
        self.add_bots(rng, wanted)
    }

    pub fn add_bots<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> Vec<String> {
        let mut names: Vec<&str> = BOT_NAMES
            .iter()
            .copied()
            .filter(|n| !self.players.iter().any(|p| p.name() == *n))
            .collect();
        names.shuffle(rng);

        let mut added = Vec::new();
        for name in names.into_iter().take(count) {
            if self.add_player(name, true).is_ok() {
                added.push(name.to_string());
            }
        }
        added
    }

    pub fn start(&mut self, now: Instant) -> Result<()> {
        if self.state != RoomState::Waiting {
            return Err(QuizError::GameInProgress(self.code.clone()));
        }
        if self.players.is_empty() || self.items.is_empty() {
            return Err(QuizError::NotEnoughPlayers(self.code.clone()));
        }
        self.state = RoomState::Active;
        self.started_at = Some(now);
        self.shown_at = Some(now);
        info!(room = %self.code, players = self.players.len(), "game started");
        Ok(())
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(start) => self
                .kind
                .duration()
                .saturating_sub(now.saturating_duration_since(start)),
            None => self.kind.duration(),
        }
    }

    pub fn is_over(&self, now: Instant) -> bool {
        match self.state {
            RoomState::Waiting => false,
            RoomState::Finished => true,
            RoomState::Active => self.remaining(now).is_zero() || self.current >= self.items.len(),
        }
    }

    pub fn current(&self) -> Option<&QuizItem> {
        match self.state {
            RoomState::Active => self.items.get(self.current),
            _ => None,
        }
    }

    /// Humans who still owe an answer to the current question, in seat order.
    pub fn pending_humans(&self) -> Vec<&str> {
        self.players
            .iter()
            .filter(|p| !p.is_bot && !p.has_answered(self.current))
            .map(|p| p.name())
            .collect()
    }

    /// Starts `name`'s answer clock. Without it the clock runs from when the
    /// question was shown.
    pub fn begin_turn(&mut self, name: &str, now: Instant) -> Result<()> {
        let player = self.player_mut(name)?;
        player.turn_started_at = Some(now);
        Ok(())
    }

    pub fn submit(&mut self, name: &str, response: &Response, now: Instant) -> Result<RoundAnswer> {
        if self.state != RoomState::Active || self.current >= self.items.len() {
            return Err(QuizError::NoActiveQuestion);
        }
        if self.remaining(now).is_zero() {
            return Err(QuizError::TimeUp);
        }

        let index = self.position_of(name)?;
        if self.players[index].has_answered(self.current) {
            return Err(QuizError::AlreadyAnswered(name.to_string()));
        }

        let item = &self.items[self.current];
        let correct = item.question.check(response)?;
        let text = item.question.describe(response);
        let difficulty = item.difficulty;
        let kind = item.question.kind;

        let shown_at = self.shown_at.unwrap_or(now);
        let player = &mut self.players[index];
        let turn_start = player.turn_started_at.take().unwrap_or(shown_at);
        let elapsed = now.saturating_duration_since(turn_start);

        let update = self.scoring.record_answer(
            &mut player.session,
            AnswerOutcome {
                correct,
                difficulty,
                elapsed,
                kind: Some(kind),
            },
        );
        let answer = RoundAnswer {
            question: self.current,
            response: text,
            correct,
            elapsed,
            points: update.total(),
        };
        player.answers.push(answer.clone());
        Ok(answer)
    }

    /// Every bot that has not answered the current question does so now.
    pub fn play_bots<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<(String, RoundAnswer)> {
        let Some(item) = self.current() else {
            return Vec::new();
        };
        let question = item.question.clone();
        let difficulty = item.difficulty;
        let accuracy = bot_accuracy(difficulty);
        let current = self.current;

        let mut played = Vec::new();
        for player in self.players.iter_mut().filter(|p| p.is_bot) {
            if player.has_answered(current) {
                continue;
            }

            let choice = if rng.gen_bool(accuracy) {
                question.correct_index
            } else {
                let wrong: Vec<usize> = (0..question.choices.len())
                    .filter(|i| *i != question.correct_index)
                    .collect();
                wrong.choose(rng).copied().unwrap_or(question.correct_index)
            };
            let correct = choice == question.correct_index;
            let elapsed = Duration::from_secs_f64(rng.gen_range(3.0..15.0));

            let update = self.scoring.record_answer(
                &mut player.session,
                AnswerOutcome {
                    correct,
                    difficulty,
                    elapsed,
                    kind: Some(question.kind),
                },
            );
            let answer = RoundAnswer {
                question: current,
                response: question.choices[choice].clone(),
                correct,
                elapsed,
                points: update.total(),
            };
            player.answers.push(answer.clone());
            played.push((player.name().to_string(), answer));
        }
        played
    }

    /// Answers given to the current question so far, in seat order.
    pub fn round_answers(&self) -> Vec<(&Participant, &RoundAnswer)> {
        self.players
            .iter()
            .filter_map(|p| {
                let answer = p.answers.iter().find(|a| a.question == self.current)?;
                Some((p, answer))
            })
            .collect()
    }

    pub fn all_answered(&self) -> bool {
        self.players.iter().all(|p| p.has_answered(self.current))
    }

    /// Moves to the next question once everyone has answered or time is up.
    /// Returns whether the game is still running.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.state != RoomState::Active {
            return false;
        }
        if self.remaining(now).is_zero() {
            self.finish();
            return false;
        }
        if !self.all_answered() {
            return true;
        }

        self.current += 1;
        self.shown_at = Some(now);
        if self.current >= self.items.len() {
            self.finish();
            return false;
        }
        true
    }

    pub fn finish(&mut self) {
        if self.state != RoomState::Finished {
            self.state = RoomState::Finished;
            info!(room = %self.code, "game finished");
        }
    }

    /// Players by score, highest first; ties keep seat order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut sorted: Vec<&Participant> = self.players.iter().collect();
        sorted.sort_by(|a, b| b.session.score.cmp(&a.session.score));
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, p)| Standing {
                rank: i + 1,
                name: p.name().to_string(),
                score: p.session.score,
                is_bot: p.is_bot,
            })
            .collect()
    }

    pub fn final_results(&self) -> Vec<FinalResult> {
        self.standings()
            .into_iter()
            .filter_map(|s| {
                let player = self.players.iter().find(|p| p.name() == s.name)?;
                let answered = player.answers.len();
                let correct = player.answers.iter().filter(|a| a.correct).count();
                Some(FinalResult {
                    rank: s.rank,
                    name: s.name,
                    score: s.score,
                    correct,
                    answered,
                    accuracy: correct as f64 / answered.max(1) as f64 * 100.0,
                    is_bot: s.is_bot,
                })
            })
            .collect()
    }

    /// Records every human's score under `multiplayer_<kind>`.
    pub fn record(&self, leaderboard: &mut Leaderboard) {
        let mode = self.kind.mode_name();
        for player in self.players.iter().filter(|p| !p.is_bot) {
            leaderboard.update_player_score(
                player.name(),
                player.session.score,
                player.session.stats.current_level,
                &mode,
            );
        }
    }

    fn position_of(&self, name: &str) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| QuizError::UnknownPlayer(name.to_string()))
    }

    fn player_mut(&mut self, name: &str) -> Result<&mut Participant> {
        let index = self.position_of(name)?;
        Ok(&mut self.players[index])
    }
}
