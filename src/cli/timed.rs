use std::time::Instant;

use crate::cli::prompt::{self, Input};
use crate::display;
use crate::error::QuizError;
use crate::leaderboard::Leaderboard;
use crate::models::{config, PlayerSession};
use crate::modes::timed::{personal_bests, TimedChallenge, TimedKind};

pub fn run_timed(kind: TimedKind) {
    let user_config = config::load_config();
    let session = PlayerSession::new(user_config.player_name(), user_config.difficulty);
    let mut rng = rand::thread_rng();

    let mut challenge = match TimedChallenge::start(&mut rng, kind, session, Instant::now()) {
        Ok(challenge) => challenge,
        Err(e) => {
            eprintln!("Failed to start challenge: {}", e);
            std::process::exit(1);
        }
    };

    display::banner(&format!("ASYMPTOTE - {}", kind));
    println!(
        "{} questions, {} seconds. The challenge ends when time runs out or every question is answered.",
        kind.question_count(),
        kind.duration().as_secs()
    );
    println!("Enter 1-4 or type an answer. q = give up\n");

    let total = challenge.items().len();
    'questions: loop {
        let now = Instant::now();
        let Some(item) = challenge.current(now) else {
            break;
        };
        println!("\nTime left: {}", display::seconds(challenge.remaining(now)));
        display::display_question(item, challenge.position() + 1, Some(total));
        let choices = item.question.choices.len();

        loop {
            let response = match prompt::read_input(">", choices) {
                Input::Quit => break 'questions,
                Input::Hint | Input::Solution | Input::Skip => {
                    println!("No hints or skips against the clock!");
                    continue;
                }
                Input::Reset | Input::Difficulty(_) => {
                    println!("That command only works in practice mode.");
                    continue;
                }
                Input::Answer(response) => response,
            };

            match challenge.submit(&response, Instant::now()) {
                Ok(answer) => {
                    let elapsed = display::seconds(answer.elapsed);
                    if answer.correct {
                        println!("Correct! +{} points ({})", answer.points, elapsed);
                    } else {
                        println!("Incorrect ({})", elapsed);
                    }
                    let session = challenge.session();
                    println!("Score: {}  Streak: {}", session.score, session.streak);
                    continue 'questions;
                }
                Err(QuizError::TimeUp) => {
                    println!("Time's up!");
                    break 'questions;
                }
                Err(e @ QuizError::InvalidAnswer(_)) => eprintln!("{}", e),
                Err(e) => {
                    eprintln!("{}", e);
                    break 'questions;
                }
            }
        }
    }

    let mut leaderboard = Leaderboard::open(user_config.leaderboard_path());
    let (results, session) = challenge.finish(&mut leaderboard, Instant::now());

    display::banner(&format!("{} Complete!", kind));
    display::display_timed_results(&results);

    let bests = personal_bests(&leaderboard, &session.name);
    if !bests.is_empty() {
        println!("\nPersonal bests:");
        for (kind, best) in bests {
            println!("  {:<20}{} pts", kind.display_name(), best);
        }
    }
}
