use std::fs;
use std::path::PathBuf;

use clap::Subcommand;

use crate::cli::prompt;
use crate::display;
use crate::leaderboard::{Category, Leaderboard};
use crate::models::config;

#[derive(Subcommand)]
pub enum LeaderboardAction {
    /// Ranked players (the default).
    Top {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        #[arg(long, value_enum)]
        by: Option<Category>,
    },
    /// Detailed stats for one player, yourself by default.
    Player { name: Option<String> },
    History {
        name: Option<String>,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    Summary,
    /// Write the rankings as CSV to a file, or stdout.
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a player's records, yourself by default.
    Reset {
        name: Option<String>,
        #[arg(long)]
        yes: bool,
    },
}

pub fn handle_leaderboard(action: Option<LeaderboardAction>) {
    let user_config = config::load_config();
    let me = user_config.player_name().to_string();
    let mut leaderboard = Leaderboard::open(user_config.leaderboard_path());

    match action.unwrap_or(LeaderboardAction::Top { limit: 10, by: None }) {
        LeaderboardAction::Top { limit, by: None } => {
            display::banner("ASYMPTOTE - Leaderboard");
            display::display_rankings(&leaderboard.rankings(Some(limit)), Some(me.as_str()));
        }
        LeaderboardAction::Top {
            limit,
            by: Some(category),
        } => {
            display::banner(&format!("Top players by {}", category.display_name()));
            for entry in leaderboard.top_by(category, limit) {
                println!("  {:<20}{}", entry.name, category.value(&entry));
            }
        }
        LeaderboardAction::Player { name } => {
            let name = name.unwrap_or(me);
            match leaderboard.player_stats(&name) {
                Some(stats) => display::display_player_stats(&stats),
                None => println!("No games recorded for {}", name),
            }
        }
        LeaderboardAction::History { name, limit } => {
            let name = name.unwrap_or(me);
            display::display_history(&leaderboard.player_history(&name, limit));
        }
        LeaderboardAction::Summary => {
            if leaderboard.is_empty() {
                println!("No games recorded yet.");
            } else {
                display::display_board_summary(&leaderboard.summary());
            }
            println!("\nStored in {}", leaderboard.path().display());
        }
        LeaderboardAction::Export { output: None } => {
            print!("{}", leaderboard.export_csv());
        }
        LeaderboardAction::Export { output: Some(path) } => {
            if let Err(e) = fs::write(&path, leaderboard.export_csv()) {
                eprintln!("Failed to write {}: {}", path.display(), e);
                std::process::exit(1);
            }
            println!("Leaderboard exported to {}", path.display());
        }
        LeaderboardAction::Reset { name, yes } => {
            let name = name.unwrap_or(me);
            if !yes && !prompt::confirm(&format!("Delete all records for {}?", name)) {
                println!("Nothing changed.");
                return;
            }
            if leaderboard.reset_player(&name) {
                println!("Records for {} deleted.", name);
            } else {
                println!("No records for {}.", name);
            }
        }
    }
}
