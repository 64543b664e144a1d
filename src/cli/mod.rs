mod analyze;
mod difficulty_cmd;
mod leaderboard_cmd;
mod multiplayer;
mod practice;
pub mod prompt;
mod timed;

use clap::{Parser, Subcommand};

use crate::display;
use crate::generator::HolePolicy;
use crate::leaderboard::Leaderboard;
use crate::models::{config, Achievement, Difficulty};
use crate::modes::multiplayer::{RoomKind, MAX_PLAYERS};
use crate::modes::timed::TimedKind;
use crate::question::QuestionKind;
use crate::scoring;

pub use leaderboard_cmd::LeaderboardAction;

#[derive(Parser)]
#[command(name = "asymptote")]
#[command(about = "Practice graphing rational functions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Untimed questions with hints and worked solutions.
    Practice {
        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,
        #[arg(short, long, value_enum)]
        focus: Option<QuestionKind>,
        #[arg(long, value_enum)]
        holes: Option<HolePolicy>,
    },
    /// A fixed set of questions against the clock.
    Timed {
        #[arg(value_enum)]
        kind: TimedKind,
    },
    /// A local match: extra players take turns, bots fill empty seats.
    Multiplayer {
        #[arg(value_enum)]
        kind: RoomKind,
        #[arg(short, long = "player")]
        players: Vec<String>,
        #[arg(long)]
        bots: Option<usize>,
    },
    /// Show the asymptotes, holes and intercepts of a rational function.
    Analyze {
        expression: String,
        /// Plot window is [-range, range] on both axes.
        #[arg(long, default_value_t = 10.0)]
        range: f64,
        #[arg(long)]
        no_plot: bool,
    },
    Leaderboard {
        #[command(subcommand)]
        action: Option<LeaderboardAction>,
    },
    Difficulty {
        #[arg(value_enum)]
        level: Option<Difficulty>,
    },
    /// Set the player name used for scores.
    Name { player: String },
    Info,
}

pub fn run(cli: Cli) {
    match cli.command {
        None => show_home(),
        Some(Commands::Practice {
            difficulty,
            focus,
            holes,
        }) => practice::run_practice(difficulty, focus, holes.unwrap_or_default()),
        Some(Commands::Timed { kind }) => timed::run_timed(kind),
        Some(Commands::Multiplayer {
            kind,
            players,
            bots,
        }) => multiplayer::run_multiplayer(kind, players, bots),
        Some(Commands::Analyze {
            expression,
            range,
            no_plot,
        }) => analyze::analyze_expression(&expression, range, !no_plot),
        Some(Commands::Leaderboard { action }) => leaderboard_cmd::handle_leaderboard(action),
        Some(Commands::Difficulty { level }) => difficulty_cmd::handle_difficulty(level),
        Some(Commands::Name { player }) => difficulty_cmd::handle_name(&player),
        Some(Commands::Info) => generic_info(),
    }
}

fn show_home() {
    let user_config = config::load_config();
    let leaderboard = Leaderboard::open(user_config.leaderboard_path());
    let name = user_config.player_name();

    display::banner("ASYMPTOTE - Rational Function Graphing Quiz");
    println!("Player: {}", name);
    println!(
        "Difficulty: {} {}",
        user_config.difficulty.display_name(),
        user_config.difficulty.stars()
    );
    match leaderboard.player_stats(name) {
        Some(stats) => {
            println!("Leaderboard rank: #{}", stats.entry.rank);
            println!("Total score: {}", stats.entry.total_score);
            println!("Games played: {}", stats.entry.games_played);
        }
        None => println!("No games played yet."),
    }
    if user_config.player_name.is_none() {
        println!("\nSet your name with `asymptote name <PLAYER>`");
    }

    println!("\nModes:");
    println!("  asymptote practice              Learn at your own pace");
    println!("  asymptote timed <blitz|sprint|marathon>");
    println!("  asymptote multiplayer <quick|standard|expert>");
    println!("  asymptote analyze \"(x^2 - 1)/(x - 3)\"");
    println!("  asymptote leaderboard");
    println!("\nRun `asymptote info` for scoring rules");
}

fn generic_info() {
    println!("Scoring:");
    println!(
        "  {} base points per correct answer, times the difficulty multiplier",
        scoring::BASE_POINTS
    );
    println!(
        "  +{} for answering in under {} seconds",
        scoring::QUICK_BONUS,
        scoring::QUICK_ANSWER.as_secs()
    );
    println!(
        "  +{} per answer in a streak past two, up to +{}",
        scoring::STREAK_BONUS,
        scoring::STREAK_BONUS * 10.0
    );

    println!("\nLevels:");
    for level in 1..=scoring::MAX_LEVEL {
        println!(
            "  Level {}: {:.0} points",
            level,
            scoring::level_requirement(level)
        );
    }

    println!("\nAchievements:");
    for achievement in Achievement::ALL {
        println!(
            "  {:<18}{:<48}+{}",
            achievement.name(),
            achievement.description(),
            achievement.bonus()
        );
    }

    println!("\nTimed challenges:");
    for kind in TimedKind::ALL {
        println!(
            "  {:<20}{} questions in {}s",
            kind.display_name(),
            kind.question_count(),
            kind.duration().as_secs()
        );
    }
    println!("\nMultiplayer rooms hold up to {} players.", MAX_PLAYERS);
}
