//! A Mastermind engine: secret generation backed by random.org with a local
//! fallback, guess scoring, and game sessions that can be stored and resumed.

#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

pub mod code;
pub use code::{Code, CodeError, Symbol};

pub mod feedback;
pub use feedback::{evaluate, Feedback, LengthMismatch};

pub mod config;
pub use config::{AppConfig, GameConfig};

pub mod random;

pub mod secret;

pub mod session;
pub use session::{Attempt, GameSession, Status};

pub mod record;
pub use record::{GameRecord, GameStatus};

pub mod store;

mod errors;
pub use errors::{Error, GameOver, SecretHidden};

pub type Result<T, E = Error> = std::result::Result<T, E>;
