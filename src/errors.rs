use thiserror::Error as ThisError;
use thisslime::TracingError;

use crate::{code::CodeError, config::InvalidConfig, feedback::LengthMismatch, random};

#[derive(Debug, ThisError, TracingError)]
#[span]
pub enum Error {
    #[error("invalid configuration: {0}")]
    #[event(level = WARN)]
    InvalidConfiguration(#[from] InvalidConfig),

    #[error("invalid guess: {0}")]
    #[event(level = DEBUG)]
    InvalidGuess(#[from] CodeError),

    #[error("secret and guess don't line up: {0}")]
    #[event(level = ERROR)]
    LengthMismatch(#[from] LengthMismatch),

    #[error(transparent)]
    #[event(level = DEBUG)]
    SessionClosed(#[from] GameOver),

    #[error(transparent)]
    #[event(level = DEBUG)]
    SecretStillHidden(#[from] SecretHidden),

    #[error("no secret could be generated: {0}")]
    RandomnessUnavailable(#[from] random::Unavailable),
}

impl Error {
    /// Whether the player can fix this by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidGuess(_) | Self::InvalidConfiguration(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("the game is already over")]
pub struct GameOver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("the secret stays hidden until the game is over")]
pub struct SecretHidden;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_str_eq;
    use thisslime::TracingError;

    use super::{Error, GameOver};
    use crate::{code::CodeError, config::InvalidConfig};

    #[test]
    fn messages() {
        assert_str_eq!(
            Error::from(InvalidConfig::NonPositive("max_attempts")).to_string(),
            "invalid configuration: `max_attempts` must be positive"
        );
        assert_str_eq!(
            Error::from(CodeError::WrongLength {
                expected: 4,
                found: 2
            })
            .to_string(),
            "invalid guess: code must have 4 numbers but has 2"
        );
        assert_str_eq!(Error::from(GameOver).to_string(), "the game is already over");
    }

    #[test]
    #[tracing_test::traced_test]
    fn trace_levels() {
        Error::from(GameOver).trace();
        assert!(logs_contain("DEBUG"));
        assert!(!logs_contain("WARN"));

        Error::from(InvalidConfig::NonPositive("code_length")).trace();
        assert!(logs_contain("WARN"));
    }

    #[test]
    fn user_errors() {
        assert!(Error::from(CodeError::NotANumber("x".to_owned())).is_user_error());
        assert!(!Error::from(GameOver).is_user_error());
    }
}
