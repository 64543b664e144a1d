use crate::models::{config, Difficulty};

pub fn handle_difficulty(level: Option<Difficulty>) {
    let mut user_config = config::load_config();

    match level {
        None => {
            let current = user_config.difficulty;
            println!(
                "Current difficulty: {} {}",
                current.display_name(),
                current.stars()
            );
            println!();
            for d in Difficulty::ALL {
                let limits = d.limits();
                println!(
                    "  {:<10}{:<7}degree <= {}, {:.0}% hole chance, x{:.1} points",
                    d.display_name(),
                    d.stars(),
                    limits.max_degree,
                    limits.holes_prob * 100.0,
                    d.score_multiplier()
                );
                println!("            {}", d.description());
            }
            println!();
            println!("To change: asymptote difficulty <level>");
        }
        Some(new_level) => {
            let old_level = user_config.difficulty;
            if old_level == new_level {
                println!("Difficulty is already set to {}", new_level.display_name());
                return;
            }

            user_config.difficulty = new_level;
            if let Err(e) = config::save_config(&user_config) {
                eprintln!("Failed to save config: {}", e);
                std::process::exit(1);
            }

            println!(
                "Difficulty changed from {} to {}",
                old_level.display_name(),
                new_level.display_name()
            );
            println!(
                "Correct answers are now worth x{:.1} points",
                new_level.score_multiplier()
            );
        }
    }
}

pub fn handle_name(player: &str) {
    let player = player.trim();
    if player.is_empty() {
        eprintln!("Player name cannot be empty");
        std::process::exit(1);
    }

    let mut user_config = config::load_config();
    user_config.player_name = Some(player.to_string());
    if let Err(e) = config::save_config(&user_config) {
        eprintln!("Failed to save config: {}", e);
        std::process::exit(1);
    }
    println!("Playing as {}", player);
}
