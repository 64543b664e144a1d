use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuizError>;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("Invalid answer '{0}'. Try something like '1, -2' or 'none'")]
    InvalidAnswer(String),

    #[error("Difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),

    #[error("Denominator is the zero polynomial")]
    ZeroDenominator,

    #[error("Gave up generating a usable function after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    #[error("Room {0} is full")]
    RoomFull(String),

    #[error("{0} is already in this room")]
    DuplicatePlayer(String),

    #[error("Room {0} needs at least one player to start")]
    NotEnoughPlayers(String),

    #[error("The game in room {0} has already started")]
    GameInProgress(String),

    #[error("No player named {0} in this room")]
    UnknownPlayer(String),

    #[error("{0} has already answered this question")]
    AlreadyAnswered(String),

    #[error("No question is active")]
    NoActiveQuestion,

    #[error("Time is up")]
    TimeUp,
}

impl QuizError {
    pub fn parse(input: &str, reason: impl Into<String>) -> Self {
        QuizError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
