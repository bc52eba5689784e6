use super::ast::Expr;
use super::builder::ExpressionBuilder;
use super::sink::ReductionSink;
use super::tokenizer::Tokenizer;
use crate::constants::FORMULA_PREFIX;
use crate::error::EngineError;
use chumsky::pratt::*;
use chumsky::prelude::*;
use std::cell::RefCell;

/// Drives the formula grammar against an [`ExpressionBuilder`] and returns
/// the finished tree.
///
/// The parser itself produces no value (`Output = ()` throughout the
/// combinator chain below) — every atom and operator reduction acts purely
/// by calling into the [`super::sink::ReductionSink`] through a shared
/// `RefCell`. This mirrors the "external infix parser driving a callback
/// interface" architecture directly: the grammar only decides *when* to
/// fire which reduction, never what the resulting tree looks like.
pub struct FormulaParser;

impl FormulaParser {
    /// Parse formula text (with or without a leading `=`) into an AST.
    pub fn parse(formula: &str) -> Result<Expr, EngineError> {
        let body = formula.trim_start_matches(FORMULA_PREFIX);
        let sink = RefCell::new(ExpressionBuilder::new());
        let grammar = Self::build(&sink).then_ignore(end());

        match grammar.parse(body).into_result() {
            Ok(()) => sink.into_inner().finish().ok_or_else(|| {
                EngineError::ParseFailure(format!(
                    "formula reduces to no evaluable expression: {formula}"
                ))
            }),
            Err(errors) => {
                let detail = errors
                    .into_iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(EngineError::ParseFailure(format!("{formula}: {detail}")))
            }
        }
    }

    fn build<'a>(
        sink: &'a RefCell<ExpressionBuilder>,
    ) -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
        recursive(|expr| {
            let atom = Self::atom(sink, expr);
            Self::operators(sink, atom)
        })
        .padded()
    }

    fn function_call<'a>(
        sink: &'a RefCell<ExpressionBuilder>,
        expr: impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone + 'a,
    ) -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
        Tokenizer::function_name()
            .then(
                expr.separated_by(just(',').padded())
                    .allow_trailing()
                    .collect::<Vec<()>>()
                    .delimited_by(just('(').padded(), just(')').padded()),
            )
            .map(move |(name, args)| sink.borrow_mut().func_call(name, args.len()))
    }

    fn atom<'a>(
        sink: &'a RefCell<ExpressionBuilder>,
        expr: impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone + 'a,
    ) -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
        let number = Tokenizer::number().map(move |n| sink.borrow_mut().val_number(n));
        let string = Tokenizer::string().map(move |s| sink.borrow_mut().val_string(s));
        // Ranges are tried before single references: a reference is a
        // valid prefix of a range, so the more specific pattern goes first.
        let range =
            Tokenizer::cell_range_text().map(move |s| sink.borrow_mut().val_range(s.to_string()));
        let reference =
            Tokenizer::cell_ref_text().map(move |s| sink.borrow_mut().val_reference(s.to_string()));
        let func_call = Self::function_call(sink, expr.clone());
        let parenthesized = expr.delimited_by(just('(').padded(), just(')').padded());

        choice((func_call, range, reference, number, string, parenthesized)).padded()
    }

    /// Precedence follows the same relative ordering a Pratt-parsed
    /// spreadsheet grammar conventionally uses: unary negation binds
    /// tighter than every binary operator except `^`, multiplication and
    /// division bind tighter than addition and subtraction, and the six
    /// comparison operators all share the lowest level.
    fn operators<'a>(
        sink: &'a RefCell<ExpressionBuilder>,
        atom: impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone + 'a,
    ) -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
        atom.pratt((
            prefix(5, just('-').padded(), move |_, (), _span| {
                sink.borrow_mut().op_neg()
            }),
            infix(right(4), just('^').padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_pow()
            }),
            infix(left(3), just('*').padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_mul()
            }),
            infix(left(3), just('/').padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_div()
            }),
            infix(left(2), just('+').padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_add()
            }),
            infix(left(2), just('-').padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_sub()
            }),
            infix(left(1), just("<=").padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_le()
            }),
            infix(left(1), just(">=").padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_ge()
            }),
            infix(left(1), just("<>").padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_ne()
            }),
            infix(left(1), just('<').padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_lt()
            }),
            infix(left(1), just('>').padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_gt()
            }),
            infix(left(1), just('=').padded(), move |(), _, (), _span| {
                sink.borrow_mut().op_eq()
            }),
        ))
        .padded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::ast::OpKind;
    use crate::types::Value;

    #[test]
    fn parses_number() {
        let expr = FormulaParser::parse("=42").unwrap();
        assert_eq!(expr, Expr::Value(Value::Number(42.0)));
    }

    #[test]
    fn parses_string_literal() {
        let expr = FormulaParser::parse("=\"hi\"").unwrap();
        assert_eq!(expr, Expr::Value(Value::Text("hi".to_string())));
    }

    #[test]
    fn parses_reference_stripping_dollar() {
        let expr = FormulaParser::parse("=$A$1").unwrap();
        assert_eq!(expr, Expr::Ref("a1".to_string()));
    }

    #[test]
    fn parses_binary_addition() {
        let expr = FormulaParser::parse("=A1+A2").unwrap();
        match expr {
            Expr::Op { kind: OpKind::Add, .. } => {}
            other => panic!("expected addition, got {other:?}"),
        }
    }

    #[test]
    fn parses_unary_negation() {
        let expr = FormulaParser::parse("=-5").unwrap();
        match expr {
            Expr::Op { kind: OpKind::Neg, right, .. } => {
                assert_eq!(*right, Expr::Value(Value::Empty));
            }
            other => panic!("expected negation, got {other:?}"),
        }
    }

    #[test]
    fn parses_parentheses() {
        let expr = FormulaParser::parse("=(1+2)*3").unwrap();
        match expr {
            Expr::Op { kind: OpKind::Mul, .. } => {}
            other => panic!("expected multiplication at the root, got {other:?}"),
        }
    }

    #[test]
    fn parses_comparison_operators() {
        for op in ["=1=1", "=1<>1", "=1<2", "=1<=2", "=1>2", "=1>=2"] {
            assert!(FormulaParser::parse(op).is_ok(), "failed to parse {op}");
        }
    }

    #[test]
    fn bare_range_is_a_parse_failure() {
        assert!(FormulaParser::parse("=A1:B2").is_err());
    }

    #[test]
    fn bare_function_call_is_also_a_parse_failure() {
        // Neither `val_range` nor `func_call`'s non-padding path ever
        // updates the builder's `last` slot, so a formula that is nothing
        // but a single function call over a range has no root, matching
        // the documented builder quirk.
        assert!(FormulaParser::parse("=SUM(A1:B2)").is_err());
    }

    #[test]
    fn function_call_used_in_an_operation_parses() {
        let expr = FormulaParser::parse("=SUM(A1:B2)+1").unwrap();
        match expr {
            Expr::Op { kind: OpKind::Add, .. } => {}
            other => panic!("expected addition at the root, got {other:?}"),
        }
    }

    #[test]
    fn unknown_characters_fail_to_parse() {
        assert!(FormulaParser::parse("=A1 ~ B1").is_err());
    }
}
