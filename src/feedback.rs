use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::code::{Code, Symbol};

/// Score for a single guess: pegs in the right place, and pegs that belong
/// somewhere else in the secret.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feedback {
    exact: usize,
    partial: usize,
}

impl Feedback {
    pub const fn new(exact: usize, partial: usize) -> Self {
        Self { exact, partial }
    }

    pub const fn exact(&self) -> usize {
        self.exact
    }

    pub const fn partial(&self) -> usize {
        self.partial
    }

    /// Whether this feedback solves a code of `length` symbols.
    pub const fn is_solved(&self, length: usize) -> bool {
        self.exact == length
    }

    /// Peg string for a code of `length` symbols: `O` exact, `o` partial, `.` miss.
    pub fn pegs(&self, length: usize) -> String {
        let misses = length.saturating_sub(self.exact + self.partial);

        "O".repeat(self.exact) + &"o".repeat(self.partial) + &".".repeat(misses)
    }
}

impl Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{exact} exact, {partial} partial",
            exact = self.exact,
            partial = self.partial
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("secret has {secret} symbols but guess has {guess}")]
pub struct LengthMismatch {
    pub secret: usize,
    pub guess: usize,
}

/// Scores `guess` against `secret`.
///
/// Exact matches are counted first. The remaining symbols on each side are
/// tallied, and every symbol contributes the smaller of its two tallies to the
/// partial count, so a peg is never counted as both exact and partial.
pub fn evaluate(secret: &Code, guess: &Code) -> Result<Feedback, LengthMismatch> {
    if secret.len() != guess.len() {
        return Err(LengthMismatch {
            secret: secret.len(),
            guess: guess.len(),
        });
    }

    let mut exact = 0;
    let mut secret_counts: HashMap<Symbol, usize> = HashMap::new();
    let mut guess_counts: HashMap<Symbol, usize> = HashMap::new();

    for (secret_symbol, guess_symbol) in secret.iter().zip(guess) {
        if secret_symbol == guess_symbol {
            exact += 1;
        } else {
            *secret_counts.entry(*secret_symbol).or_default() += 1;
            *guess_counts.entry(*guess_symbol).or_default() += 1;
        }
    }

    trace!(exact, ?secret_counts, ?guess_counts);

    let partial = secret_counts
        .iter()
        .filter_map(|(symbol, in_secret)| {
            guess_counts
                .get(symbol)
                .map(|in_guess| (*in_secret).min(*in_guess))
        })
        .sum();

    Ok(Feedback::new(exact, partial))
}

#[cfg(test)]
mod tests {
    use paste::paste;
    use pretty_assertions::{assert_eq, assert_str_eq};

    use super::{evaluate, Feedback, LengthMismatch};
    use crate::Code;

    macro_rules! scores {
        ($($name:ident: $secret:expr, $guess:expr => ($exact:expr, $partial:expr);)+) => {
            paste! {
                $(
                    #[test]
                    fn [<scores_ $name>]() {
                        let secret = Code::from($secret);
                        let guess = Code::from($guess);

                        assert_eq!(
                            evaluate(&secret, &guess),
                            Ok(Feedback::new($exact, $partial))
                        )
                    }
                )+
            }
        };
    }

    scores! {
        all_exact: [2, 4, 1, 5], [2, 4, 1, 5] => (4, 0);
        three_misplaced: [2, 4, 1, 5], [1, 2, 3, 4] => (0, 3);
        rotated: [1, 2, 3, 4], [4, 1, 2, 3] => (0, 4);
        nothing: [0, 0, 0, 0], [1, 1, 1, 1] => (0, 0);
        mixed: [1, 2, 3, 4], [1, 3, 2, 5] => (1, 2);
        repeated_guess: [1, 1, 2, 3], [1, 1, 1, 1] => (2, 0);
        repeated_secret: [1, 1, 1, 1], [1, 2, 3, 1] => (2, 0);
        repeated_both: [1, 1, 2, 2], [2, 2, 1, 1] => (0, 4);
        one_spare: [1, 2, 2, 3], [2, 1, 1, 1] => (0, 2);
        exact_eats_partial: [3, 3, 5, 6], [3, 5, 3, 3] => (1, 2);
        single: [7], [7] => (1, 0);
        six_long: [0, 1, 2, 3, 4, 5], [5, 4, 3, 2, 1, 0] => (0, 6);
    }

    #[test]
    fn example_game_guess() {
        // secret 2 4 1 5 against 1 2 3 4: 1, 2 and 4 are all present but misplaced
        let secret = Code::from([2, 4, 1, 5]);
        let feedback = evaluate(&secret, &Code::from([1, 2, 3, 4])).expect("lengths match");

        assert_eq!(feedback.exact(), 0);
        assert_eq!(feedback.partial(), 3);
    }

    #[test]
    fn self_match_is_all_exact() {
        let codes = [
            Code::from([0]),
            Code::from([1, 1, 1, 1]),
            Code::from([3, 0, 3, 0, 3]),
            Code::from([7, 6, 5, 4, 3, 2, 1, 0]),
        ];

        for code in codes {
            assert_eq!(evaluate(&code, &code), Ok(Feedback::new(code.len(), 0)));
        }
    }

    #[test]
    fn never_exceeds_length() {
        let alphabet = 4;
        let length = 4;

        // every secret and guess over a small alphabet
        let all_codes: Vec<Code> = (0..alphabet * alphabet * alphabet * alphabet)
            .map(|mut n| {
                let mut symbols = Vec::with_capacity(length);
                for _ in 0..length {
                    symbols.push(n % alphabet);
                    n /= alphabet;
                }
                Code::from(symbols)
            })
            .collect();

        for secret in all_codes.iter().step_by(7) {
            for guess in &all_codes {
                let feedback = evaluate(secret, guess).expect("lengths match");
                assert!(feedback.exact() + feedback.partial() <= length);
            }
        }
    }

    #[test]
    fn symmetric() {
        let pairs = [
            ([1, 1, 2, 3], [1, 1, 1, 1]),
            ([1, 1, 2, 2], [2, 1, 1, 1]),
            ([0, 0, 0, 5], [5, 5, 0, 1]),
            ([4, 4, 4, 2], [2, 4, 2, 2]),
            ([3, 1, 3, 1], [1, 3, 3, 3]),
        ];

        for (a, b) in pairs {
            let (a, b) = (Code::from(a), Code::from(b));
            let forward = evaluate(&a, &b).expect("lengths match");
            let backward = evaluate(&b, &a).expect("lengths match");

            assert_eq!(forward.exact(), backward.exact());
            assert_eq!(forward.partial(), backward.partial());
        }
    }

    #[test]
    fn length_mismatch() {
        assert_eq!(
            evaluate(&Code::from([1, 2, 3, 4]), &Code::from([1, 2, 3])),
            Err(LengthMismatch {
                secret: 4,
                guess: 3
            })
        );
    }

    #[test]
    fn pegs() {
        assert_str_eq!(Feedback::new(2, 1).pegs(4), "OOo.");
        assert_str_eq!(Feedback::new(0, 0).pegs(4), "....");
        assert_str_eq!(Feedback::new(4, 0).pegs(4), "OOOO");
    }
}
