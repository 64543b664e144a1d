use std::io::{self, BufRead, Write};

use clap::ValueEnum;

use crate::models::Difficulty;
use crate::question::Response;

/// One line of player input during a quiz.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Answer(Response),
    Hint,
    Solution,
    Skip,
    /// Clear the practice counters.
    Reset,
    /// `d 3` or `d expert`.
    Difficulty(Difficulty),
    Quit,
}

/// A bare number from 1 to `choices` picks that choice; anything else that is
/// not a command is a typed answer.
pub fn parse_input(line: &str, choices: usize) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line.to_lowercase().as_str() {
        "h" | "hint" | "?" => return Some(Input::Hint),
        "s" | "solution" => return Some(Input::Solution),
        "n" | "next" | "skip" => return Some(Input::Skip),
        "r" | "reset" => return Some(Input::Reset),
        "q" | "quit" | "exit" => return Some(Input::Quit),
        _ => {}
    }

    if let Some(difficulty) = parse_difficulty(line) {
        return Some(Input::Difficulty(difficulty));
    }

    match line.parse::<usize>() {
        Ok(n) if (1..=choices).contains(&n) => Some(Input::Answer(Response::Choice(n - 1))),
        _ => Some(Input::Answer(Response::Text(line.to_string()))),
    }
}

fn parse_difficulty(line: &str) -> Option<Difficulty> {
    let (command, level) = line.split_once(char::is_whitespace)?;
    if !matches!(command.to_lowercase().as_str(), "d" | "difficulty") {
        return None;
    }
    let level = level.trim();
    match level.parse::<u8>() {
        Ok(n) => Difficulty::from_level(n).ok(),
        Err(_) => Difficulty::from_str(level, true).ok(),
    }
}

/// Prints `prompt` and reads one line. `None` on end of input.
pub fn read_line(prompt: &str) -> Option<String> {
    print!("{} ", prompt);
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Reads until the player enters something usable. End of input quits.
pub fn read_input(prompt: &str, choices: usize) -> Input {
    loop {
        let Some(line) = read_line(prompt) else {
            return Input::Quit;
        };
        if let Some(input) = parse_input(&line, choices) {
            return input;
        }
    }
}

pub fn confirm(prompt: &str) -> bool {
    matches!(
        read_line(&format!("{} [y/N]", prompt)).as_deref().map(str::trim),
        Some("y") | Some("Y") | Some("yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("  ", 4), None);
        assert_eq!(parse_input("2", 4), Some(Input::Answer(Response::Choice(1))));
        assert_eq!(
            parse_input("7", 4),
            Some(Input::Answer(Response::Text("7".into())))
        );
        assert_eq!(
            parse_input("x = -2, x = 3", 4),
            Some(Input::Answer(Response::Text("x = -2, x = 3".into())))
        );
        assert_eq!(parse_input("H", 4), Some(Input::Hint));
        assert_eq!(parse_input("solution", 4), Some(Input::Solution));
        assert_eq!(parse_input("skip", 4), Some(Input::Skip));
        assert_eq!(parse_input("q", 4), Some(Input::Quit));
    }

    #[test]
    fn test_parse_practice_commands() {
        assert_eq!(parse_input("r", 4), Some(Input::Reset));
        assert_eq!(parse_input("RESET", 4), Some(Input::Reset));
        assert_eq!(
            parse_input("d 3", 4),
            Some(Input::Difficulty(Difficulty::Advanced))
        );
        assert_eq!(
            parse_input("difficulty expert", 4),
            Some(Input::Difficulty(Difficulty::Expert))
        );
        // out of range falls through to a typed answer
        assert_eq!(
            parse_input("d 9", 4),
            Some(Input::Answer(Response::Text("d 9".into())))
        );
    }
}
