//! Sources of random integers for secret generation.
//!
//! [`Remote`] asks random.org, [`Local`] uses a seeded [`rand::rngs::StdRng`],
//! and [`WithFallback`] composes the two so a network failure never stops a
//! game from starting.

mod local;
pub use local::{Local, LocalError};

mod remote;
pub use remote::{Limit, Remote, RemoteError};

mod fallback;
pub use fallback::{ContractViolation, SourcesFailed, Unavailable, WithFallback};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Remote source with a local fallback, as selected by [`crate::config::RandomConfig`].
pub type Randomness = WithFallback<Remote, Local>;

pub trait RandomSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Draws `count` independent integers, each within `lower..=upper`.
    async fn next(&self, count: usize, lower: i64, upper: i64) -> Result<Vec<i64>, Self::Error>;
}
