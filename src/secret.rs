use tracing::debug;

use crate::{
    code::{Code, Symbol},
    config::InvalidConfig,
    random::{ContractViolation, RandomSource, Unavailable},
    Error, Result,
};

/// Draws a secret of `length` symbols from `0..alphabet_size`.
#[tracing::instrument(skip(source))]
pub async fn generate<S>(length: usize, alphabet_size: u32, source: &S) -> Result<Code>
where
    S: RandomSource,
{
    if length == 0 {
        return Err(InvalidConfig::NonPositive("code_length").into());
    }

    if alphabet_size == 0 {
        return Err(InvalidConfig::NonPositive("alphabet_size").into());
    }

    let upper = i64::from(alphabet_size) - 1;

    let numbers = source
        .next(length, 0, upper)
        .await
        .map_err(Unavailable::wrap)?;

    if numbers.len() != length {
        return Err(Error::from(Unavailable::from(ContractViolation::WrongCount {
            expected: length,
            found: numbers.len(),
        })));
    }

    let symbols = numbers
        .into_iter()
        .map(|value| {
            Symbol::try_from(value)
                .ok()
                .filter(|symbol| *symbol < alphabet_size)
                .ok_or(ContractViolation::OutOfRange {
                    value,
                    lower: 0,
                    upper,
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(Unavailable::from)?;

    debug!("secret generated");

    Ok(Code::from(symbols))
}
