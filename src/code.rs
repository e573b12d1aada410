use std::{fmt::Display, ops::Index, slice::Iter, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single peg in a [`Code`], drawn from `0..alphabet_size`.
pub type Symbol = u32;

/// An ordered sequence of symbols, used for both the secret and the player's guesses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code {
    symbols: Vec<Symbol>,
}

impl Code {
    /// Builds a code and checks it against the configured length and alphabet.
    pub fn new(symbols: Vec<Symbol>, length: usize, alphabet_size: u32) -> Result<Self, CodeError> {
        let code = Self { symbols };
        code.check(length, alphabet_size)?;
        Ok(code)
    }

    pub fn check(&self, length: usize, alphabet_size: u32) -> Result<(), CodeError> {
        if self.len() != length {
            return Err(CodeError::WrongLength {
                expected: length,
                found: self.len(),
            });
        }

        if let Some((position, &symbol)) = self
            .iter()
            .enumerate()
            .find(|(_, &symbol)| symbol >= alphabet_size)
        {
            return Err(CodeError::OutOfRange {
                symbol,
                position,
                max: alphabet_size.saturating_sub(1),
            });
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn iter(&self) -> Iter<'_, Symbol> {
        self.symbols.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("code must have {expected} numbers but has {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("{symbol} (position {}) is not between 0 and {max}", .position + 1)]
    OutOfRange {
        symbol: Symbol,
        position: usize,
        max: Symbol,
    },

    #[error("`{0}` is not a valid number")]
    NotANumber(String),
}

impl FromStr for Code {
    type Err = CodeError;

    /// Parses whitespace- or comma-separated numbers, e.g. `1 2 3 4` or `1,2,3,4`.
    ///
    /// Only the syntax is checked here; length and range are checked against a
    /// game's configuration by [`Code::check`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols = s
            .split(|ch: char| ch.is_whitespace() || ch == ',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<Symbol>()
                    .map_err(|_| CodeError::NotANumber(part.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { symbols })
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut symbols = self.iter();

        if let Some(first) = symbols.next() {
            write!(f, "{first}")?;
        }

        for symbol in symbols {
            write!(f, " {symbol}")?;
        }

        Ok(())
    }
}

impl From<Vec<Symbol>> for Code {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }
}

impl<const N: usize> From<[Symbol; N]> for Code {
    fn from(symbols: [Symbol; N]) -> Self {
        Self {
            symbols: symbols.to_vec(),
        }
    }
}

impl From<Code> for Vec<Symbol> {
    fn from(value: Code) -> Self {
        value.symbols
    }
}

impl IntoIterator for Code {
    type Item = Symbol;
    type IntoIter = std::vec::IntoIter<Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.into_iter()
    }
}

impl<'a> IntoIterator for &'a Code {
    type Item = &'a Symbol;
    type IntoIter = Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Index<usize> for Code {
    type Output = Symbol;

    fn index(&self, index: usize) -> &Self::Output {
        self.symbols.index(index)
    }
}
