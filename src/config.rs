use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::code::CodeError;

/// Rules for a single game: code length, number of distinct symbols, and
/// how many guesses the player gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub code_length: usize,
    pub alphabet_size: u32,
    pub max_attempts: usize,
}

impl GameConfig {
    pub const DEFAULT_CODE_LENGTH: usize = 4;
    pub const DEFAULT_ALPHABET_SIZE: u32 = 8;
    pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

    pub fn builder() -> GameConfigBuilder {
        GameConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.code_length == 0 {
            return Err(InvalidConfig::NonPositive("code_length"));
        }

        if self.alphabet_size == 0 {
            return Err(InvalidConfig::NonPositive("alphabet_size"));
        }

        if self.max_attempts == 0 {
            return Err(InvalidConfig::NonPositive("max_attempts"));
        }

        Ok(())
    }

    /// Highest symbol allowed in a code.
    pub const fn max_symbol(&self) -> u32 {
        self.alphabet_size.saturating_sub(1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            code_length: Self::DEFAULT_CODE_LENGTH,
            alphabet_size: Self::DEFAULT_ALPHABET_SIZE,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameConfigBuilder {
    config: GameConfig,
}

impl GameConfigBuilder {
    pub fn code_length(mut self, code_length: usize) -> Self {
        self.config.code_length = code_length;
        self
    }

    pub fn alphabet_size(mut self, alphabet_size: u32) -> Self {
        self.config.alphabet_size = alphabet_size;
        self
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    pub fn build(self) -> Result<GameConfig, InvalidConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl From<GameConfig> for GameConfigBuilder {
    fn from(config: GameConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidConfig {
    #[error("`{0}` must be positive")]
    NonPositive(&'static str),

    #[error("secret doesn't fit the game: {0}")]
    Secret(#[from] CodeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Ask the remote service first, falling back to the local generator.
    pub remote: bool,
    pub url: url::Url,
    pub quota_url: url::Url,
    pub timeout_secs: u64,
}

impl RandomConfig {
    pub const DEFAULT_URL: &'static str = "https://www.random.org/integers/";
    pub const DEFAULT_QUOTA_URL: &'static str = "https://www.random.org/quota/";

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RandomConfig {
    #[allow(clippy::unwrap_used)]
    fn default() -> Self {
        Self {
            remote: true,
            url: url::Url::parse(Self::DEFAULT_URL).unwrap(),
            quota_url: url::Url::parse(Self::DEFAULT_QUOTA_URL).unwrap(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// MongoDB connection string. History is kept in memory when unset.
    pub url: Option<String>,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            database: "mastermind".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub random: RandomConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub const ENV_PREFIX: &'static str = "MASTERMIND";
    pub const PATH_VAR: &'static str = "MASTERMIND_TOML";
    pub const DEFAULT_PATH: &'static str = "./mastermind.toml";

    /// Loads the TOML file at `path` (if it exists), then applies
    /// `MASTERMIND__SECTION__KEY` environment overrides.
    #[tracing::instrument(skip_all, name = "config")]
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!(path = %path.display(), "looking for config file");

        let path = path
            .to_str()
            .ok_or_else(|| Error::Path(path.to_string_lossy().into_owned()))?;

        let config: Self = ::config::Config::builder()
            .add_source(::config::File::new(path, ::config::FileFormat::Toml).required(false))
            .add_source(
                ::config::Environment::with_prefix(Self::ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(Error::Read)?
            .try_deserialize()
            .map_err(Error::Parse)?;

        config.game.validate()?;

        info!(game = ?config.game, remote = config.random.remote, "config loaded");

        Ok(config)
    }

    /// The config file path from `MASTERMIND_TOML`, or the default.
    pub fn path_from_env() -> std::path::PathBuf {
        std::env::var(Self::PATH_VAR)
            .map(Into::into)
            .unwrap_or_else(|_| Self::DEFAULT_PATH.into())
    }
}

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum Error {
    #[error("config path `{0}` is not valid unicode")]
    #[event(level = ERROR)]
    Path(String),

    #[error("file read error: {0}")]
    #[event(level = ERROR)]
    Read(::config::ConfigError),

    #[error("parsing error: {0}")]
    #[event(level = ERROR)]
    Parse(::config::ConfigError),

    #[error(transparent)]
    #[event(level = ERROR)]
    Invalid(#[from] InvalidConfig),
}
