use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use super::RandomSource;

/// Pseudo-random numbers from a [`StdRng`].
///
/// Seed it with [`Local::seeded`] to replay the same sequence.
#[derive(Debug)]
pub struct Local {
    rng: Mutex<StdRng>,
}

impl Local {
    pub fn new() -> Self {
        let seed: [u8; 32] = rand::random();
        Self::from_rng(StdRng::from_seed(seed))
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Default for Local {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocalError {
    #[error("empty range {lower}..={upper}")]
    EmptyRange { lower: i64, upper: i64 },

    #[error("random generator lock was poisoned")]
    Poisoned,
}

impl RandomSource for Local {
    type Error = LocalError;

    async fn next(&self, count: usize, lower: i64, upper: i64) -> Result<Vec<i64>, Self::Error> {
        if lower > upper {
            return Err(LocalError::EmptyRange { lower, upper });
        }

        let numbers: Vec<i64> = {
            let mut rng = self.rng.lock().map_err(|_| LocalError::Poisoned)?;
            (0..count).map(|_| rng.gen_range(lower..=upper)).collect()
        };

        debug!(count, lower, upper, ?numbers, "generated pseudo-random numbers");

        Ok(numbers)
    }
}
