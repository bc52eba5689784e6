use crate::constants::ABSOLUTE_MARKER;
use chumsky::prelude::*;

/// Atom-level lexical parsers for formula text. Each one recognizes a
/// single token's *text*; none of them touch the reduction sink — that
/// happens one level up in `parser.rs`, which is what lets these stay
/// simple, reusable slice parsers.
pub struct Tokenizer;

impl Tokenizer {
    /// A number: digits, optional fractional part, optional exponent.
    pub fn number<'a>() -> impl Parser<'a, &'a str, f64, extra::Err<Rich<'a, char>>> + Clone {
        text::int(10)
            .then(just('.').then(text::digits(10)).or_not())
            .then(
                one_of("eE")
                    .then(one_of("+-").or_not())
                    .then(text::digits(10))
                    .or_not(),
            )
            .to_slice()
            .map(|s: &str| s.parse::<f64>().unwrap_or(0.0))
            .padded()
    }

    /// A string literal, delimited by either `"` or `'` (the rewriter's
    /// scanner in `transformer.rs` tolerates both forms, so the grammar
    /// that produces formulas must be able to emit both too).
    pub fn string<'a>() -> impl Parser<'a, &'a str, String, extra::Err<Rich<'a, char>>> + Clone {
        let double = just('"')
            .ignore_then(none_of('"').repeated().to_slice())
            .then_ignore(just('"'));
        let single = just('\'')
            .ignore_then(none_of('\'').repeated().to_slice())
            .then_ignore(just('\''));
        choice((double, single))
            .map(|s: &str| s.to_string())
            .padded()
    }

    /// One address component's raw text, e.g. `A1`, `$A1`, `A$1`, `$A$1`.
    /// Preserves `$` markers verbatim so the builder can normalize them.
    /// The row run is a plain digit sequence, not a numeric-literal parser
    /// — leading zeros are a valid (if unusual) row text and must not be
    /// rejected here the way a literal `007` would be.
    pub fn cell_ref_text<'a>()
    -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> + Clone {
        just(ABSOLUTE_MARKER)
            .or_not()
            .then(
                one_of('A'..='Z')
                    .or(one_of('a'..='z'))
                    .repeated()
                    .at_least(1),
            )
            .then(just(ABSOLUTE_MARKER).or_not())
            .then(one_of('0'..='9').repeated().at_least(1))
            .to_slice()
    }

    /// A range's raw text, e.g. `A1:B2`. Tried before a single reference
    /// since a reference is a valid prefix of a range.
    pub fn cell_range_text<'a>()
    -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> + Clone {
        Self::cell_ref_text()
            .then_ignore(just(':'))
            .then(Self::cell_ref_text())
            .to_slice()
    }

    /// A function name (case-insensitive, normalized to uppercase).
    pub fn function_name<'a>()
    -> impl Parser<'a, &'a str, String, extra::Err<Rich<'a, char>>> + Clone {
        text::ascii::ident()
            .map(|s: &str| s.to_uppercase())
            .padded()
    }
}
