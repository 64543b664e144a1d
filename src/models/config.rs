use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Difficulty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub player_name: Option<String>,
    pub difficulty: Difficulty,
    /// Overrides [`default_leaderboard_path`] when set.
    #[serde(default)]
    pub leaderboard_path: Option<PathBuf>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            player_name: None,
            difficulty: Difficulty::Basic,
            leaderboard_path: None,
        }
    }
}

impl UserConfig {
    pub fn player_name(&self) -> &str {
        self.player_name.as_deref().unwrap_or("Player")
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.leaderboard_path
            .clone()
            .unwrap_or_else(default_leaderboard_path)
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("asymptote").join("config.json"))
}

pub fn default_leaderboard_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("asymptote").join("leaderboard.json"),
        None => PathBuf::from("leaderboard.json"),
    }
}

pub fn load_config() -> UserConfig {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => UserConfig::default(),
    }
}

pub fn load_config_from(path: &Path) -> UserConfig {
    if !path.exists() {
        return UserConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
        Err(_) => UserConfig::default(),
    }
}

pub fn save_config(config: &UserConfig) -> Result<()> {
    let path = get_config_path().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not determine home directory",
        )
    })?;
    save_config_to(&path, config)
}

pub fn save_config_to(path: &Path, config: &UserConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
