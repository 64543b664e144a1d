use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Game records kept per player; older ones are dropped.
pub const HISTORY_LIMIT: usize = 50;
pub const RECENT_GAMES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub score: u32,
    pub level: u32,
    pub mode: String,
    /// RFC 3339 local time.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub total_score: u64,
    pub games_played: u32,
    pub best_score: u32,
    pub max_level: u32,
    pub last_played: Option<String>,
    #[serde(default)]
    pub game_scores: Vec<GameRecord>,
}

impl PlayerRecord {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_score: 0,
            games_played: 0,
            best_score: 0,
            max_level: 1,
            last_played: None,
            game_scores: Vec::new(),
        }
    }

    pub fn average_score(&self) -> f64 {
        self.total_score as f64 / self.games_played.max(1) as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LeaderboardFile {
    #[serde(default)]
    players: Vec<PlayerRecord>,
}

/// One row of a ranked view.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub total_score: u64,
    pub games_played: u32,
    pub best_score: u32,
    pub max_level: u32,
    pub average_score: f64,
    pub last_played: Option<String>,
}

impl LeaderboardEntry {
    fn from_record(rank: usize, record: &PlayerRecord) -> Self {
        Self {
            rank,
            name: record.name.clone(),
            total_score: record.total_score,
            games_played: record.games_played,
            best_score: record.best_score,
            max_level: record.max_level,
            average_score: record.average_score(),
            last_played: record.last_played.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatsSummary {
    pub entry: LeaderboardEntry,
    pub recent_average: f64,
    pub recent_best: u32,
    pub recent_games: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardSummary {
    pub total_players: usize,
    pub total_games: u64,
    pub average_score: f64,
    pub highest_score: u64,
    pub most_active_player: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    TotalScore,
    GamesPlayed,
    BestScore,
    MaxLevel,
    AverageScore,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::TotalScore => "Total Score",
            Category::GamesPlayed => "Games Played",
            Category::BestScore => "Best Score",
            Category::MaxLevel => "Max Level",
            Category::AverageScore => "Average Score",
        }
    }

    pub fn value(&self, entry: &LeaderboardEntry) -> f64 {
        match self {
            Category::TotalScore => entry.total_score as f64,
            Category::GamesPlayed => entry.games_played as f64,
            Category::BestScore => entry.best_score as f64,
            Category::MaxLevel => entry.max_level as f64,
            Category::AverageScore => entry.average_score,
        }
    }
}

/// Persistent scores for every player on this machine.
#[derive(Debug)]
pub struct Leaderboard {
    path: PathBuf,
    data: LeaderboardFile,
}

impl Leaderboard {
    /// Read the board at `path`. A missing, unreadable or corrupt file
    /// gives an empty board.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match load(&path) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "could not read leaderboard, starting empty"
                );
                LeaderboardFile::default()
            }
        };
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.data.players.is_empty()
    }

    pub fn update_player_score(&mut self, name: &str, score: u32, level: u32, mode: &str) {
        let now = Local::now().to_rfc3339();

        let index = match self.data.players.iter().position(|p| p.name == name) {
            Some(i) => i,
            None => {
                self.data.players.push(PlayerRecord::new(name));
                self.data.players.len() - 1
            }
        };
        let record = &mut self.data.players[index];

        record.total_score += score as u64;
        record.games_played += 1;
        record.best_score = record.best_score.max(score);
        record.max_level = record.max_level.max(level);
        record.last_played = Some(now.clone());
        record.game_scores.push(GameRecord {
            score,
            level,
            mode: mode.to_string(),
            date: now,
        });
        if record.game_scores.len() > HISTORY_LIMIT {
            let excess = record.game_scores.len() - HISTORY_LIMIT;
            record.game_scores.drain(..excess);
        }

        info!(player = name, score, mode, "recorded game");
        self.persist();
    }

    /// All players by total score, highest first. Ties keep the order in
    /// which players first appeared.
    pub fn rankings(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        let mut records: Vec<&PlayerRecord> = self.data.players.iter().collect();
        records.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        records
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(i, r)| LeaderboardEntry::from_record(i + 1, r))
            .collect()
    }

    pub fn player_rank(&self, name: &str) -> Option<usize> {
        self.rankings(None)
            .into_iter()
            .find(|e| e.name == name)
            .map(|e| e.rank)
    }

    pub fn player_stats(&self, name: &str) -> Option<PlayerStatsSummary> {
        let entry = self.rankings(None).into_iter().find(|e| e.name == name)?;
        let record = self.record(name)?;

        let start = record.game_scores.len().saturating_sub(RECENT_GAMES);
        let recent = &record.game_scores[start..];
        let (recent_average, recent_best) = if recent.is_empty() {
            (0.0, 0)
        } else {
            let sum: u64 = recent.iter().map(|g| g.score as u64).sum();
            let best = recent.iter().map(|g| g.score).max().unwrap_or(0);
            (sum as f64 / recent.len() as f64, best)
        };

        Some(PlayerStatsSummary {
            entry,
            recent_average,
            recent_best,
            recent_games: recent.len(),
        })
    }

    pub fn top_by(&self, category: Category, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries = self.rankings(None);
        entries.sort_by(|a, b| category.value(b).total_cmp(&category.value(a)));
        entries.truncate(limit);
        entries
    }

    /// The most recent `limit` games, oldest first.
    pub fn player_history(&self, name: &str, limit: usize) -> Vec<GameRecord> {
        match self.record(name) {
            Some(record) => {
                let start = record.game_scores.len().saturating_sub(limit);
                record.game_scores[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Returns whether the player existed.
    pub fn reset_player(&mut self, name: &str) -> bool {
        let before = self.data.players.len();
        self.data.players.retain(|p| p.name != name);
        let removed = self.data.players.len() != before;
        if removed {
            info!(player = name, "reset player");
            self.persist();
        }
        removed
    }

    pub fn summary(&self) -> BoardSummary {
        let players = &self.data.players;
        let total_games = players.iter().map(|p| p.games_played as u64).sum();
        let highest_score = players.iter().map(|p| p.total_score).max().unwrap_or(0);
        let average_score = if players.is_empty() {
            0.0
        } else {
            players.iter().map(|p| p.total_score as f64).sum::<f64>() / players.len() as f64
        };
        // First registered wins ties.
        let most_active_player = players
            .iter()
            .fold(None::<&PlayerRecord>, |best, p| match best {
                Some(b) if b.games_played >= p.games_played => Some(b),
                _ => Some(p),
            })
            .map(|p| p.name.clone());

        BoardSummary {
            total_players: players.len(),
            total_games,
            average_score,
            highest_score,
            most_active_player,
        }
    }

    /// Rankings as CSV; empty when there are no players.
    pub fn export_csv(&self) -> String {
        let entries = self.rankings(None);
        if entries.is_empty() {
            return String::new();
        }

        let mut out = String::from(
            "player_name,total_score,games_played,best_score,max_level,avg_score,last_played\n",
        );
        for e in entries {
            out.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                csv_field(&e.name),
                e.total_score,
                e.games_played,
                e.best_score,
                e.max_level,
                e.average_score,
                e.last_played.as_deref().unwrap_or("")
            ));
        }
        out
    }

    /// Personal best for each game mode whose name starts with `prefix`.
    pub fn best_by_mode(&self, name: &str, prefix: &str) -> Vec<(String, u32)> {
        let mut bests: Vec<(String, u32)> = Vec::new();
        let Some(record) = self.record(name) else {
            return bests;
        };
        for game in record.game_scores.iter().filter(|g| g.mode.starts_with(prefix)) {
            match bests.iter_mut().find(|(mode, _)| *mode == game.mode) {
                Some((_, best)) => *best = (*best).max(game.score),
                None => bests.push((game.mode.clone(), game.score)),
            }
        }
        bests
    }

    fn record(&self, name: &str) -> Option<&PlayerRecord> {
        self.data.players.iter().find(|p| p.name == name)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(
                path = %self.path.display(),
                error = %e,
                "could not save leaderboard, keeping scores in memory"
            );
        }
    }
}

fn load(path: &Path) -> Result<LeaderboardFile> {
    if !path.exists() {
        return Ok(LeaderboardFile::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn board(dir: &TempDir) -> Leaderboard {
        Leaderboard::open(dir.path().join("leaderboard.json"))
    }

    #[test]
    fn test_update_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut lb = board(&dir);
        lb.update_player_score("ada", 300, 2, "practice");
        lb.update_player_score("ada", 100, 1, "timed_blitz");

        let reloaded = board(&dir);
        let stats = reloaded.player_stats("ada").unwrap();
        assert_eq!(stats.entry.total_score, 400);
        assert_eq!(stats.entry.games_played, 2);
        assert_eq!(stats.entry.best_score, 300);
        assert_eq!(stats.entry.max_level, 2);
        assert_eq!(stats.entry.average_score, 200.0);
        assert_eq!(stats.recent_games, 2);
        assert_eq!(stats.recent_best, 300);
        assert!(stats.entry.last_played.is_some());
    }

    #[test]
    fn test_rankings_are_stable() {
        let dir = TempDir::new().unwrap();
        let mut lb = board(&dir);
        lb.update_player_score("first", 100, 1, "practice");
        lb.update_player_score("second", 100, 1, "practice");
        lb.update_player_score("leader", 500, 1, "practice");

        let names: Vec<_> = lb.rankings(None).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["leader", "first", "second"]);
        assert_eq!(lb.rankings(Some(1)).len(), 1);
        assert_eq!(lb.player_rank("second"), Some(3));
        assert_eq!(lb.player_rank("nobody"), None);
    }

    #[test]
    fn test_history_is_capped() {
        let dir = TempDir::new().unwrap();
        let mut lb = board(&dir);
        for score in 0..60 {
            lb.update_player_score("ada", score, 1, "practice");
        }
        let history = lb.player_history("ada", 100);
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].score, 10);
        assert_eq!(lb.player_history("ada", 3).last().unwrap().score, 59);

        let stats = lb.player_stats("ada").unwrap();
        assert_eq!(stats.entry.games_played, 60);
        assert_eq!(stats.recent_best, 59);
        assert_eq!(stats.recent_average, 54.5);
    }

    #[test]
    fn test_top_by_and_summary() {
        let dir = TempDir::new().unwrap();
        let mut lb = board(&dir);
        lb.update_player_score("ada", 900, 3, "practice");
        lb.update_player_score("bob", 200, 1, "practice");
        lb.update_player_score("bob", 250, 2, "practice");

        let busiest = lb.top_by(Category::GamesPlayed, 1);
        assert_eq!(busiest[0].name, "bob");

        let summary = lb.summary();
        assert_eq!(summary.total_players, 2);
        assert_eq!(summary.total_games, 3);
        assert_eq!(summary.highest_score, 900);
        assert_eq!(summary.average_score, 675.0);
        assert_eq!(summary.most_active_player.as_deref(), Some("bob"));
    }

    #[test]
    fn test_reset_and_export() {
        let dir = TempDir::new().unwrap();
        let mut lb = board(&dir);
        assert_eq!(lb.export_csv(), "");
        lb.update_player_score("ada, jr", 100, 1, "practice");

        let csv = lb.export_csv();
        assert!(csv.starts_with("player_name,total_score"));
        assert!(csv.contains("\"ada, jr\",100,1,100,1,100,"));

        assert!(lb.reset_player("ada, jr"));
        assert!(!lb.reset_player("ada, jr"));
        assert!(board(&dir).is_empty());
    }

    #[test]
    fn test_best_by_mode() {
        let dir = TempDir::new().unwrap();
        let mut lb = board(&dir);
        lb.update_player_score("ada", 300, 1, "timed_blitz");
        lb.update_player_score("ada", 500, 1, "timed_blitz");
        lb.update_player_score("ada", 200, 1, "timed_sprint");
        lb.update_player_score("ada", 900, 1, "practice");

        let bests = lb.best_by_mode("ada", "timed_");
        assert_eq!(
            bests,
            vec![("timed_blitz".to_string(), 500), ("timed_sprint".to_string(), 200)]
        );
    }

    #[test]
    fn test_corrupt_or_unwritable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leaderboard.json");
        fs::write(&path, "not json").unwrap();
        assert!(Leaderboard::open(&path).is_empty());

        // A directory where the file should be makes every save fail.
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();
        let mut lb = Leaderboard::open(&blocked);
        lb.update_player_score("ada", 100, 1, "practice");
        assert_eq!(lb.player_rank("ada"), Some(1));
    }
}
