use std::ops::Not;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    code::Code,
    config::{GameConfig, InvalidConfig},
    feedback::{evaluate, Feedback},
    random::RandomSource,
    record::{GameRecord, GameStatus, UtcDateTime},
    secret, GameOver, Result, SecretHidden,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl Status {
    pub fn is_over(&self) -> bool {
        *self != Self::InProgress
    }
}

/// One recorded guess. Numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    guess: Code,
    feedback: Feedback,
    number: usize,
}

impl Attempt {
    pub fn guess(&self) -> &Code {
        &self.guess
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn number(&self) -> usize {
        self.number
    }
}

/// A single play-through, from a freshly generated secret to a win or a loss.
#[derive(Debug, Clone)]
pub struct GameSession {
    secret: Code,
    config: GameConfig,
    attempts: Vec<Attempt>,
    status: Status,
    started: UtcDateTime,
    completed: Option<UtcDateTime>,
}

impl GameSession {
    /// Starts a game around a known secret.
    pub fn new(config: GameConfig, secret: Code) -> Result<Self> {
        config.validate()?;
        secret
            .check(config.code_length, config.alphabet_size)
            .map_err(InvalidConfig::Secret)?;

        Ok(Self {
            secret,
            config,
            attempts: Vec::with_capacity(config.max_attempts),
            status: Status::InProgress,
            started: Utc::now(),
            completed: None,
        })
    }

    /// Validates `config` and starts a game with a secret drawn from `source`.
    #[tracing::instrument(skip_all)]
    pub async fn start<S>(config: GameConfig, source: &S) -> Result<Self>
    where
        S: RandomSource,
    {
        config.validate()?;

        let secret = secret::generate(config.code_length, config.alphabet_size, source).await?;
        let session = Self::new(config, secret)?;

        info!(?config, "new game started");

        Ok(session)
    }

    /// Rebuilds a game from its record by replaying every recorded guess.
    pub fn resume(record: &GameRecord) -> Result<Self> {
        let mut session = Self::new(record.config, record.secret.clone())?;
        session.started = record.started_at;

        for attempt in &record.attempts {
            if session.is_over() {
                break;
            }

            session.submit_guess(attempt.guess().clone())?;
        }

        if session.is_over() {
            session.completed = record.completed_at.or(session.completed);
        }

        debug!(
            attempts = session.attempts.len(),
            status = ?session.status,
            "resumed game"
        );

        Ok(session)
    }

    /// Scores `guess`, records it, and moves the game to won or lost when it ends.
    pub fn submit_guess(&mut self, guess: Code) -> Result<Feedback> {
        if self.is_over() {
            return Err(GameOver.into());
        }

        guess.check(self.config.code_length, self.config.alphabet_size)?;

        let feedback = evaluate(&self.secret, &guess)?;

        self.attempts.push(Attempt {
            guess,
            feedback,
            number: self.attempts.len() + 1,
        });

        if feedback.is_solved(self.secret.len()) {
            self.finish(Status::Won);
        } else if self.attempts.len() == self.config.max_attempts {
            self.finish(Status::Lost);
        }

        debug!(
            attempt = self.attempts.len(),
            %feedback,
            status = ?self.status,
            "guess scored"
        );

        Ok(feedback)
    }

    fn finish(&mut self, status: Status) {
        self.status = status;
        self.completed = Some(Utc::now());

        info!(?status, attempts = self.attempts.len(), "game over");
    }

    /// The secret, once the game is over.
    pub fn reveal_secret(&self) -> Result<&Code> {
        if self.is_over() {
            Ok(&self.secret)
        } else {
            Err(SecretHidden.into())
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn in_progress(&self) -> bool {
        self.is_over().not()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn latest(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    pub fn attempts_remaining(&self) -> usize {
        self.config.max_attempts.saturating_sub(self.attempts.len())
    }

    pub fn started(&self) -> UtcDateTime {
        self.started
    }

    pub fn completed(&self) -> Option<UtcDateTime> {
        self.completed
    }

    /// A snapshot for the store. Unlike [`Self::reveal_secret`] this always
    /// carries the secret, so an unfinished game can be resumed later.
    pub fn record(&self) -> GameRecord {
        GameRecord {
            secret: self.secret.clone(),
            config: self.config,
            status: GameStatus::from(self.status),
            started_at: self.started,
            completed_at: self.completed,
            attempts: self.attempts.clone(),
        }
    }
}
