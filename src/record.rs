use std::fmt::Display;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{code::Code, config::GameConfig, session::Attempt, session::Status};

pub type UtcDateTime = chrono::DateTime<Utc>;

/// Status of a stored game. Unlike [`Status`], a game can also be abandoned
/// when the player starts over instead of resuming it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[default]
    InProgress,
    Won,
    Lost,
    Abandoned,
}

impl From<Status> for GameStatus {
    fn from(value: Status) -> Self {
        match value {
            Status::InProgress => Self::InProgress,
            Status::Won => Self::Won,
            Status::Lost => Self::Lost,
        }
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::InProgress => "in progress",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Abandoned => "abandoned",
        })
    }
}

/// Everything a store needs to keep about one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub secret: Code,
    pub config: GameConfig,
    pub status: GameStatus,
    pub started_at: UtcDateTime,
    pub completed_at: Option<UtcDateTime>,
    pub attempts: Vec<Attempt>,
}

impl GameRecord {
    pub fn is_finished(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    pub fn in_progress(&self) -> bool {
        !self.is_finished()
    }

    pub fn attempts_remaining(&self) -> usize {
        self.config.max_attempts.saturating_sub(self.attempts.len())
    }

    /// Marks an unfinished game as given up at `at`. Finished games are left alone.
    pub fn into_abandoned(mut self, at: UtcDateTime) -> Self {
        if self.in_progress() {
            self.status = GameStatus::Abandoned;
            self.completed_at = Some(at);
        }

        self
    }
}
