use thisslime::TracingError;
use tracing::{debug, warn};

use super::{ContractViolation, RandomSource};
use crate::config::RandomConfig;

/// Client for random.org's plain-text integer and quota endpoints.
#[derive(Debug, Clone)]
pub struct Remote {
    client: reqwest::Client,
    url: reqwest::Url,
    quota_url: reqwest::Url,
}

impl Remote {
    pub const MAX_COUNT: usize = 10_000;
    pub const MAX_BOUND: i64 = 1_000_000_000;

    pub fn new(config: &RandomConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(RemoteError::Client)?;

        Ok(Self::with_client(
            client,
            config.url.clone(),
            config.quota_url.clone(),
        ))
    }

    pub fn with_client(client: reqwest::Client, url: reqwest::Url, quota_url: reqwest::Url) -> Self {
        Self {
            client,
            url,
            quota_url,
        }
    }

    fn client(&self) -> &reqwest::Client {
        &self.client
    }

    fn integers_url(&self, count: usize, lower: i64, upper: i64) -> reqwest::Url {
        let mut url = self.url.clone();

        url.query_pairs_mut()
            .append_pair("num", &count.to_string())
            .append_pair("min", &lower.to_string())
            .append_pair("max", &upper.to_string())
            .append_pair("col", "1")
            .append_pair("base", "10")
            .append_pair("format", "plain")
            .append_pair("rnd", "new");

        url
    }

    fn quota_request_url(&self) -> reqwest::Url {
        let mut url = self.quota_url.clone();

        url.query_pairs_mut()
            .append_pair("getusage", "true")
            .append_pair("format", "plain");

        url
    }

    fn check_limits(count: usize, lower: i64, upper: i64) -> Result<(), RemoteError> {
        let limit = if !(1..=Self::MAX_COUNT).contains(&count) {
            Some(Limit::Count(count))
        } else if !(-Self::MAX_BOUND..=Self::MAX_BOUND).contains(&lower) {
            Some(Limit::Bound(lower))
        } else if !(-Self::MAX_BOUND..=Self::MAX_BOUND).contains(&upper) {
            Some(Limit::Bound(upper))
        } else if lower > upper {
            Some(Limit::EmptyRange { lower, upper })
        } else {
            None
        };

        limit.map_or(Ok(()), |limit| Err(RemoteError::Limits(limit)))
    }

    /// Parses a plain-text body with one integer per line.
    fn parse_integers(
        body: &str,
        count: usize,
        lower: i64,
        upper: i64,
    ) -> Result<Vec<i64>, RemoteError> {
        let numbers = body
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| RemoteError::NotAnInteger(token.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if numbers.len() != count {
            return Err(ContractViolation::WrongCount {
                expected: count,
                found: numbers.len(),
            }
            .into());
        }

        if let Some(&value) = numbers.iter().find(|n| !(lower..=upper).contains(*n)) {
            return Err(ContractViolation::OutOfRange {
                value,
                lower,
                upper,
            }
            .into());
        }

        Ok(numbers)
    }

    async fn get_text(&self, url: reqwest::Url) -> Result<String, RemoteError> {
        let response = self
            .client()
            .get(url)
            .send()
            .await
            .map_err(RemoteError::or_service)?;

        debug!(code = %response.status());

        response
            .error_for_status()
            .map_err(RemoteError::or_service)?
            .text()
            .await
            .map_err(RemoteError::Client)
    }

    /// Bits left in this client's random.org allowance. Negative once exhausted.
    #[tracing::instrument(skip_all)]
    pub async fn quota(&self) -> Result<i64, RemoteError> {
        let body = self.get_text(self.quota_request_url()).await?;
        let trimmed = body.trim();

        let quota = trimmed
            .parse::<i64>()
            .map_err(|_| RemoteError::NotAnInteger(trimmed.to_owned()))?;

        debug!(quota, "checked random.org quota");

        if quota < 0 {
            warn!(quota, "random.org quota exhausted");
        }

        Ok(quota)
    }
}

impl RandomSource for Remote {
    type Error = RemoteError;

    #[tracing::instrument(skip(self))]
    async fn next(&self, count: usize, lower: i64, upper: i64) -> Result<Vec<i64>, Self::Error> {
        Self::check_limits(count, lower, upper)?;

        let body = self
            .get_text(self.integers_url(count, lower, upper))
            .await
            .inspect_err(|err| {
                if err.is_timeout() {
                    warn!("random.org timed out");
                }
            })?;
        let numbers = Self::parse_integers(&body, count, lower, upper)?;

        debug!(?numbers, "generated random numbers using random.org");

        Ok(numbers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Limit {
    #[error("can't request {0} numbers, must be between 1 and {max}", max = Remote::MAX_COUNT)]
    Count(usize),

    #[error("bound {0} is beyond ±{max}", max = Remote::MAX_BOUND)]
    Bound(i64),

    #[error("empty range {lower}..={upper}")]
    EmptyRange { lower: i64, upper: i64 },
}

#[derive(Debug, thiserror::Error, TracingError)]
#[span]
pub enum RemoteError {
    #[error("request out of service limits: {0}")]
    #[event(level = WARN)]
    Limits(Limit),

    #[error("random number service returned an error: {0}")]
    #[event(level = WARN)]
    Service(reqwest::Error),

    #[error("error from reqwest client: {0}")]
    #[event(level = ERROR)]
    Client(reqwest::Error),

    #[error("malformed response: `{0}` is not an integer")]
    #[event(level = ERROR)]
    NotAnInteger(String),

    #[error("service broke its response format: {0}")]
    #[event(level = ERROR)]
    Contract(#[from] ContractViolation),
}

impl RemoteError {
    /// Status errors are the service's fault; everything else is the client's.
    fn or_service(err: reqwest::Error) -> Self {
        if err.is_status() {
            Self::Service(err)
        } else {
            Self::Client(err)
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Service(err) | Self::Client(err) => err.is_timeout(),
            _ => false,
        }
    }
}
