use thisslime::TracingError;
use tracing::{debug, warn};

use super::{BoxError, Local, RandomSource, Remote};
use crate::config::RandomConfig;

/// Tries `primary` first and falls back to `fallback` when it fails or is disabled.
#[derive(Debug)]
pub struct WithFallback<P, F> {
    primary: Option<P>,
    fallback: F,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self {
            primary: Some(primary),
            fallback,
        }
    }

    pub fn fallback_only(fallback: F) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }
}

impl WithFallback<Remote, Local> {
    /// Remote randomness unless disabled by `config` (or `force_local`), with a
    /// freshly seeded local generator behind it.
    pub fn from_config(config: &RandomConfig, force_local: bool) -> Self {
        if force_local || !config.remote {
            debug!("remote randomness disabled");
            return Self::fallback_only(Local::new());
        }

        match Remote::new(config) {
            Ok(remote) => Self::new(remote, Local::new()),
            Err(err) => {
                warn!(error = %err, "couldn't build random.org client, using local randomness");
                Self::fallback_only(Local::new())
            }
        }
    }
}

impl<P, F> RandomSource for WithFallback<P, F>
where
    P: RandomSource,
    F: RandomSource,
{
    type Error = Unavailable;

    async fn next(&self, count: usize, lower: i64, upper: i64) -> Result<Vec<i64>, Self::Error> {
        let primary_error = match self.primary {
            Some(ref primary) => match primary.next(count, lower, upper).await {
                Ok(numbers) => return Ok(numbers),
                Err(err) => {
                    warn!(error = %err, "primary randomness failed, falling back");
                    Some(BoxError::from(err))
                }
            },
            None => None,
        };

        self.fallback
            .next(count, lower, upper)
            .await
            .map_err(|err| {
                SourcesFailed {
                    primary: primary_error,
                    fallback: err.into(),
                }
                .into()
            })
    }
}

/// No usable random numbers could be produced.
#[derive(Debug, thiserror::Error, TracingError)]
#[span]
pub enum Unavailable {
    #[error(transparent)]
    Failed(#[from] SourcesFailed),

    #[error(transparent)]
    #[event(level = ERROR)]
    Contract(#[from] ContractViolation),
}

impl Unavailable {
    /// Wraps an error from any source, keeping an existing [`Unavailable`] as is.
    pub(crate) fn wrap<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match BoxError::from(err).downcast::<Self>() {
            Ok(unavailable) => *unavailable,
            Err(other) => SourcesFailed {
                primary: None,
                fallback: other,
            }
            .into(),
        }
    }
}

/// Every source was asked and none of them answered.
#[derive(Debug, thiserror::Error, TracingError)]
#[error("every randomness source failed, last error: {fallback}")]
#[event(level = ERROR)]
pub struct SourcesFailed {
    /// Why the primary source failed, if there was one to ask.
    #[field(print = Debug)]
    pub primary: Option<BoxError>,

    #[field(print = Debug)]
    #[source]
    pub fallback: BoxError,
}

/// A source handed back numbers that don't match what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("asked for {expected} numbers, got {found}")]
    WrongCount { expected: usize, found: usize },

    #[error("{value} is outside {lower}..={upper}")]
    OutOfRange { value: i64, lower: i64, upper: i64 },
}
