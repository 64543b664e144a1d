use std::time::Instant;

use crate::cli::prompt::{self, Input};
use crate::display;
use crate::error::QuizError;
use crate::generator::HolePolicy;
use crate::leaderboard::Leaderboard;
use crate::models::{config, Difficulty, PlayerSession};
use crate::modes::practice::Practice;
use crate::question::QuestionKind;
use crate::scoring;

pub fn run_practice(
    difficulty: Option<Difficulty>,
    focus: Option<QuestionKind>,
    holes: HolePolicy,
) {
    let user_config = config::load_config();
    let difficulty = difficulty.unwrap_or(user_config.difficulty);
    let session = PlayerSession::new(user_config.player_name(), difficulty);

    let mut practice = Practice::new(session);
    practice.set_focus(focus);
    practice.set_hole_policy(holes);
    let mut rng = rand::thread_rng();

    display::banner("ASYMPTOTE - Practice Mode");
    println!(
        "Difficulty: {} {}  Focus: {}",
        practice.difficulty().display_name(),
        practice.difficulty().stars(),
        practice.focus().map(|k| k.display_name()).unwrap_or("Random")
    );
    println!("Enter 1-4 or type an answer (e.g. `x = 2, x = -1`, `none`).");
    println!("Commands: h = hint, s = solution, n = skip, r = reset stats,");
    println!("          d <1-5> = change difficulty, q = quit\n");

    'questions: loop {
        let number = practice.questions_answered() as usize + 1;
        let item = match practice.next_question(&mut rng, Instant::now()) {
            Ok(item) => item,
            Err(e) => {
                eprintln!("Failed to generate a question: {}", e);
                break;
            }
        };
        println!();
        display::display_question(item, number, None);
        let choices = item.question.choices.len();

        loop {
            match prompt::read_input(">", choices) {
                Input::Quit => break 'questions,
                Input::Skip => continue 'questions,
                Input::Reset => {
                    practice.reset();
                    println!("Practice stats reset.");
                    continue 'questions;
                }
                Input::Difficulty(level) => {
                    if level == practice.difficulty() {
                        println!("Already practicing at {}", level.display_name());
                        continue;
                    }
                    practice.set_difficulty(level);
                    println!("Difficulty: {} {}", level.display_name(), level.stars());
                    continue 'questions;
                }
                Input::Hint => match practice.hint() {
                    Ok(hint) => println!("Hint: {}", hint),
                    Err(e) => eprintln!("{}", e),
                },
                Input::Solution => match practice.solution() {
                    Ok(solution) => display::display_solution(&solution.summary),
                    Err(e) => eprintln!("{}", e),
                },
                Input::Answer(response) => match practice.submit(&response, Instant::now()) {
                    Ok(feedback) => {
                        if feedback.correct {
                            println!("Correct! Well done!");
                        } else {
                            println!(
                                "Incorrect. The correct answer is: {}",
                                feedback.correct_answer
                            );
                        }
                        display::display_score_update(&feedback.update);
                        println!("Explanation: {}", feedback.explanation);
                        println!(
                            "Time taken: {}  Streak: {}  Score: {}",
                            display::seconds(feedback.elapsed),
                            practice.streak(),
                            practice.session().score
                        );
                        continue 'questions;
                    }
                    Err(e @ QuizError::InvalidAnswer(_)) => eprintln!("{}", e),
                    Err(e) => {
                        eprintln!("{}", e);
                        continue 'questions;
                    }
                },
            }
        }
    }

    let mut leaderboard = Leaderboard::open(user_config.leaderboard_path());
    let session = practice.finish(&mut leaderboard);
    if session.stats.total_questions == 0 {
        println!("\nNo questions answered. See you next time!");
        return;
    }

    display::banner("Practice Summary");
    println!("Score: {}", session.score);
    println!("Accuracy: {:.1}%", session.accuracy());
    println!(
        "Level: {} ({:.0}% to next)",
        session.stats.current_level,
        scoring::progress_to_next_level(session.stats.total_points, session.stats.current_level)
    );
    display::display_analytics(&scoring::analytics(&session.stats));
    if let Some(rank) = leaderboard.player_rank(&session.name) {
        println!("\nLeaderboard rank: #{}", rank);
    }
}
