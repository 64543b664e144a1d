use std::time::Instant;

use crate::cli::prompt::{self, Input};
use crate::display;
use crate::error::QuizError;
use crate::leaderboard::Leaderboard;
use crate::models::config;
use crate::modes::multiplayer::{Room, RoomKind, RoundAnswer};
use crate::modes::QuizItem;

pub fn run_multiplayer(kind: RoomKind, players: Vec<String>, bots: Option<usize>) {
    let user_config = config::load_config();
    let host = user_config.player_name().to_string();
    let mut rng = rand::thread_rng();

    let mut room = match Room::create(&mut rng, kind, &host) {
        Ok(room) => room,
        Err(e) => {
            eprintln!("Failed to create room: {}", e);
            std::process::exit(1);
        }
    };
    for name in &players {
        if let Err(e) = room.join(name) {
            eprintln!("Could not add {}: {}", name, e);
        }
    }
    match bots {
        Some(count) => {
            room.add_bots(&mut rng, count);
        }
        None if room.players().len() < 2 => {
            room.fill_with_bots(&mut rng);
        }
        None => {}
    }

    display::banner(&format!("ASYMPTOTE - {}", kind));
    println!("Room ID: {}", room.code());
    println!(
        "{} questions, {} minutes",
        kind.question_count(),
        kind.duration().as_secs() / 60
    );
    println!("\nPlayers:");
    for (i, player) in room.players().iter().enumerate() {
        let tag = if player.is_bot { " (bot)" } else { "" };
        println!("  {}. {}{}", i + 1, player.name(), tag);
    }
    println!("\nHumans answer in turn. Enter 1-4 or type an answer. q = end the game");

    if let Err(e) = room.start(Instant::now()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    let hot_seat = room.players().iter().filter(|p| !p.is_bot).count() > 1;
    let total = room.items().len();

    'game: while !room.is_over(Instant::now()) {
        let Some(item) = room.current().cloned() else {
            break;
        };
        println!(
            "\nTime left: {}",
            display::seconds(room.remaining(Instant::now()))
        );
        display::display_question(&item, room.position() + 1, Some(total));

        let pending: Vec<String> = room.pending_humans().into_iter().map(String::from).collect();
        for name in pending {
            if hot_seat {
                println!("\n{}, your turn:", name);
            }
            if let Err(e) = room.begin_turn(&name, Instant::now()) {
                eprintln!("{}", e);
                continue;
            }

            loop {
                let response = match prompt::read_input(">", item.question.choices.len()) {
                    Input::Quit => {
                        room.finish();
                        break 'game;
                    }
                    Input::Hint | Input::Solution | Input::Skip => {
                        println!("No hints or skips in a match!");
                        continue;
                    }
                    Input::Reset | Input::Difficulty(_) => {
                        println!("That command only works in practice mode.");
                        continue;
                    }
                    Input::Answer(response) => response,
                };

                match room.submit(&name, &response, Instant::now()) {
                    Ok(answer) => {
                        println!("{}", turn_feedback(&answer, hot_seat, &item));
                        break;
                    }
                    Err(e @ QuizError::InvalidAnswer(_)) => eprintln!("{}", e),
                    Err(QuizError::TimeUp) => {
                        println!("Time's up!");
                        break 'game;
                    }
                    Err(e) => {
                        eprintln!("{}", e);
                        break;
                    }
                }
            }
        }

        for (name, answer) in room.play_bots(&mut rng) {
            let verdict = if answer.correct { "correct" } else { "wrong" };
            println!(
                "{} answered {} ({}, {})",
                name,
                answer.response,
                verdict,
                display::seconds(answer.elapsed)
            );
        }

        if hot_seat {
            println!("\nCorrect answer: {}", item.question.correct_choice());
            for (player, answer) in room.round_answers().into_iter().filter(|(p, _)| !p.is_bot) {
                println!("{}", reveal_line(player.name(), answer));
            }
        }

        println!("\nCurrent standings:");
        display::display_standings(&room.standings());
        if !room.advance(Instant::now()) {
            break;
        }
    }
    room.finish();

    display::banner("Final Results");
    display::display_final_results(&room.final_results());

    let mut leaderboard = Leaderboard::open(user_config.leaderboard_path());
    room.record(&mut leaderboard);
}

/// With several humans at one terminal the verdict waits until everyone has
/// answered, so later players never see the correct choice.
fn turn_feedback(answer: &RoundAnswer, hot_seat: bool, item: &QuizItem) -> String {
    if hot_seat {
        "Answer locked in.".to_string()
    } else if answer.correct {
        format!("Correct! +{} points", answer.points)
    } else {
        format!("Incorrect. Correct answer: {}", item.question.correct_choice())
    }
}

fn reveal_line(name: &str, answer: &RoundAnswer) -> String {
    if answer.correct {
        format!("{} answered {} (correct, +{} points)", name, answer.response, answer.points)
    } else {
        format!("{} answered {} (wrong)", name, answer.response)
    }
}
