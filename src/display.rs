use std::time::Duration;

use crate::analyzer::{self, Analysis, MarkerKind, Plot};
use crate::leaderboard::{BoardSummary, GameRecord, LeaderboardEntry, PlayerStatsSummary};
use crate::math::RationalFunction;
use crate::modes::multiplayer::{FinalResult, Standing};
use crate::modes::timed::TimedResults;
use crate::modes::QuizItem;
use crate::question::SOLUTION_STEPS;
use crate::scoring::{Analytics, ScoreUpdate};

pub const PLOT_WIDTH: usize = 61;
pub const PLOT_HEIGHT: usize = 21;

pub fn banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

pub fn rule() {
    println!("{}", "-".repeat(60));
}

pub fn seconds(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}

pub fn display_question(item: &QuizItem, number: usize, total: Option<usize>) {
    match total {
        Some(total) => println!("Question {}/{}", number, total),
        None => println!("Question {}", number),
    }
    println!(
        "Difficulty: {} {}",
        item.difficulty.display_name(),
        item.difficulty.stars()
    );
    println!("Topic: {}", item.question.kind);
    rule();
    println!("f(x) = {}", item.generated.function);
    println!("{}", item.question.prompt);
    rule();
    for (i, choice) in item.question.choices.iter().enumerate() {
        println!("  {}) {}", i + 1, choice);
    }
}

pub fn display_score_update(update: &ScoreUpdate) {
    if update.points > 0 {
        println!("+{} points", update.points);
    }
    for achievement in &update.unlocked {
        println!(
            "Achievement unlocked: {} - {} (+{} points)",
            achievement.name(),
            achievement.description(),
            achievement.bonus()
        );
    }
}

pub fn display_analysis(function: &RationalFunction, analysis: &Analysis) {
    println!("f(x) = {}", function);
    println!("LaTeX: {}", function.latex());
    if !analysis.common_factor.is_constant() {
        println!("Simplified: {}", analysis.reduced);
        println!("Common factor: {}", analysis.common_factor);
    }
    rule();
    for (label, value) in analyzer::summary(analysis) {
        println!("{:<22}{}", format!("{}:", label), value);
    }
}

pub fn display_solution(summary: &[(&'static str, String)]) {
    println!("Complete solution:");
    for (label, value) in summary {
        println!("  {:<22}{}", format!("{}:", label), value);
    }
    println!("\nStep-by-step process:");
    for (i, step) in SOLUTION_STEPS.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}

/// Draw the curve, asymptotes and markers onto a character grid.
///
/// Asymptotes are `|` and `-`, the axes `+`, the curve `*`, intercepts `o`
/// and holes `O`.
pub fn render_plot(plot: &Plot, width: usize, height: usize) -> String {
    let width = width.max(2);
    let height = height.max(2);
    let (x_lo, x_hi) = plot.x_range;
    let (y_lo, y_hi) = plot.y_range;

    let col = |x: f64| -> Option<usize> {
        let c = ((x - x_lo) / (x_hi - x_lo) * (width - 1) as f64).round();
        (0.0..=(width - 1) as f64).contains(&c).then_some(c as usize)
    };
    let row = |y: f64| -> Option<usize> {
        let r = ((y_hi - y) / (y_hi - y_lo) * (height - 1) as f64).round();
        (0.0..=(height - 1) as f64).contains(&r).then_some(r as usize)
    };

    let mut grid = vec![vec![' '; width]; height];

    if let Some(r) = row(0.0) {
        grid[r].iter_mut().for_each(|c| *c = '+');
    }
    if let Some(c) = col(0.0) {
        grid.iter_mut().for_each(|line| line[c] = '+');
    }
    if let Some(r) = plot.horizontal_line.and_then(row) {
        grid[r].iter_mut().for_each(|c| *c = '-');
    }
    for c in plot.vertical_lines.iter().filter_map(|x| col(*x)) {
        grid.iter_mut().for_each(|line| line[c] = '|');
    }
    for (x, y) in plot.points.iter().flatten() {
        if let (Some(c), Some(r)) = (col(*x), row(*y)) {
            grid[r][c] = '*';
        }
    }
    for marker in &plot.markers {
        if let (Some(c), Some(r)) = (col(marker.x), row(marker.y)) {
            grid[r][c] = match marker.kind {
                MarkerKind::Hole => 'O',
                MarkerKind::XIntercept | MarkerKind::YIntercept => 'o',
            };
        }
    }

    grid.into_iter()
        .map(|line| line.into_iter().collect::<String>().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn display_plot(plot: &Plot) {
    println!("{}", render_plot(plot, PLOT_WIDTH, PLOT_HEIGHT));
    println!(
        "x in [{}, {}], y in [{}, {}]  (* curve, | - asymptotes, o intercepts, O holes)",
        plot.x_range.0,
        plot.x_range.1,
        plot.y_range.0,
        plot.y_range.1
    );
}

pub fn display_rankings(entries: &[LeaderboardEntry], highlight: Option<&str>) {
    if entries.is_empty() {
        println!("No players on the leaderboard yet.");
        return;
    }
    println!(
        "{:<6}{:<20}{:>12}{:>8}{:>8}{:>7}{:>10}",
        "Rank",
        "Player",
        "Total",
        "Games",
        "Best",
        "Level",
        "Average"
    );
    rule();
    for e in entries {
        let marker = if Some(e.name.as_str()) == highlight { " <" } else { "" };
        println!(
            "{:<6}{:<20}{:>12}{:>8}{:>8}{:>7}{:>10.1}{}",
            e.rank,
            e.name,
            e.total_score,
            e.games_played,
            e.best_score,
            e.max_level,
            e.average_score,
            marker
        );
    }
}

pub fn display_player_stats(stats: &PlayerStatsSummary) {
    let e = &stats.entry;
    println!("Player: {} (rank #{})", e.name, e.rank);
    println!("Total score: {}", e.total_score);
    println!("Games played: {}", e.games_played);
    println!("Best score: {}", e.best_score);
    println!("Max level: {}", e.max_level);
    println!("Average score: {:.1}", e.average_score);
    println!(
        "Recent {} games: average {:.1}, best {}",
        stats.recent_games, stats.recent_average, stats.recent_best
    );
    if let Some(last) = &e.last_played {
        println!("Last played: {}", last);
    }
}

pub fn display_history(history: &[GameRecord]) {
    if history.is_empty() {
        println!("No games recorded.");
        return;
    }
    println!("{:<28}{:<22}{:>8}{:>7}", "Date", "Mode", "Score", "Level");
    rule();
    for game in history.iter().rev() {
        println!("{:<28}{:<22}{:>8}{:>7}", game.date, game.mode, game.score, game.level);
    }
}

pub fn display_board_summary(summary: &BoardSummary) {
    println!("Players: {}", summary.total_players);
    println!("Games played: {}", summary.total_games);
    println!("Average total score: {:.1}", summary.average_score);
    println!("Highest total score: {}", summary.highest_score);
    println!(
        "Most active player: {}",
        summary.most_active_player.as_deref().unwrap_or("-")
    );
}

pub fn display_analytics(analytics: &Analytics) {
    println!("Accuracy: {:.1}%", analytics.accuracy);
    println!("Average time: {}", seconds(analytics.average_time));
    println!("Points per question: {:.1}", analytics.points_per_question);
    println!("Streak efficiency: {:.1}%", analytics.streak_efficiency);
    println!("Quick answer rate: {:.1}%", analytics.quick_answer_rate);
    for (kind, perf) in &analytics.by_kind {
        println!(
            "  {:<22}{}/{} ({:.1}%)",
            format!("{}:", kind),
            perf.correct,
            perf.total,
            perf.accuracy
        );
    }
}

pub fn display_timed_results(results: &TimedResults) {
    println!("Final score: {}", results.score);
    println!("Accuracy: {:.1}%", results.accuracy);
    println!("Average time per question: {}", seconds(results.average_time));
    println!(
        "Questions answered: {}/{}",
        results.answered, results.total_questions
    );
    if !results.by_kind.is_empty() {
        println!("\nPerformance by topic:");
        for (kind, tally) in &results.by_kind {
            let accuracy = tally.correct as f64 / tally.total.max(1) as f64 * 100.0;
            println!(
                "  {:<22}{}/{} ({:.1}%)",
                format!("{}:", kind),
                tally.correct,
                tally.total,
                accuracy
            );
        }
    }
    println!("\n{}", results.tier.message());
}

pub fn display_standings(standings: &[Standing]) {
    for s in standings {
        let tag = if s.is_bot { " (bot)" } else { "" };
        println!("  {}. {}{}: {} points", s.rank, s.name, tag, s.score);
    }
}

pub fn display_final_results(results: &[FinalResult]) {
    println!("{:<6}{:<20}{:>8}{:>10}{:>10}", "Rank", "Player", "Score", "Correct", "Accuracy");
    rule();
    for r in results {
        let name = if r.is_bot {
            format!("{} (bot)", r.name)
        } else {
            r.name.clone()
        };
        println!(
            "{:<6}{:<20}{:>8}{:>10}{:>9.1}%",
            r.rank,
            name,
            r.score,
            format!("{}/{}", r.correct, r.answered),
            r.accuracy
        );
    }
    if let Some(winner) = results.first() {
        println!("\nWinner: {}", winner.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze, plot};
    use crate::math::parse_rational;

    #[test]
    fn test_render_plot_draws_asymptotes_and_markers() {
        let f = parse_rational("(x - 2)(x + 1)/((x - 2)(x - 1))").unwrap();
        let analysis = analyze(&f).unwrap();
        let p = plot(&f, &analysis, (-5.0, 5.0), (-5.0, 5.0), 500);
        let text = render_plot(&p, 11, 11);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 11);
        // x = 1 maps to column 6 on an 11-wide grid over [-5, 5]; the curve
        // covers it only near the top and bottom edges.
        let asymptote_rows = lines.iter().filter(|l| l.chars().nth(6) == Some('|')).count();
        assert!(asymptote_rows >= 6, "{}", text);
        // y = 1 maps to row 4.
        assert!(lines[4].contains('-'));
        assert!(text.contains('O'));
        assert!(text.contains('o'));
        assert!(text.contains('*'));
    }

    #[test]
    fn test_render_plot_clips_offscreen_markers() {
        let f = parse_rational("1/(x - 20)").unwrap();
        let analysis = analyze(&f).unwrap();
        let p = plot(&f, &analysis, (-5.0, 5.0), (-5.0, 5.0), 100);
        let text = render_plot(&p, 21, 11);
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_seconds() {
        assert_eq!(seconds(Duration::from_millis(2500)), "2.5s");
    }
}
