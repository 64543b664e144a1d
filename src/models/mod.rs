pub mod config;
pub mod difficulty;
pub mod session;

// config is accessed as crate::models::config::{load_config, save_config, ...}
pub use difficulty::{Difficulty, GeneratorLimits};
pub use session::{Achievement, PlayerSession, PlayerStats};
