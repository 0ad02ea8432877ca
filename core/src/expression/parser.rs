use bumpalo::Bump;
use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::expression::{
    BinaryOp, ExpressionError, Span, UnaryOp,
    parsed_expr::{Expr, ExprKind, Literal},
};

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                               // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::rem, Assoc::Left)
        )                                               // `*`, `/`, `%`
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos)) // `-`, `+`
        .op(Op::infix(Rule::pow, Assoc::Right))          // `**` (binds tighter than unary minus)

        // Postfix operators.
        .op(Op::postfix(Rule::call_op) | Op::postfix(Rule::field_op)) // `()`, `.`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "expression/expression.pest"]
pub struct ExpressionParser;

/// Parse `source` into an arena-allocated expression tree.
///
/// Nesting deeper than `max_depth` is rejected before the grammar runs. The
/// Pratt fold recurses once per parenthesis, prefix operator and `**`, so
/// all three count towards the limit.
pub fn parse<'a>(
    arena: &'a Bump,
    source: &str,
    max_depth: usize,
) -> Result<&'a Expr<'a>, ExpressionError> {
    check_nesting(source, max_depth)?;
    let mut pairs =
        ExpressionParser::parse(Rule::main, source).map_err(ExpressionError::from_pest)?;
    let main = pairs.next().ok_or_else(|| ExpressionError::Syntax {
        message: "empty expression".to_string(),
        span: Span::new(0, source.len()),
    })?;
    build_expr(arena, main)
}

fn check_nesting(source: &str, max_depth: usize) -> Result<(), ExpressionError> {
    // Nesting reached by each open group, innermost last.
    let mut groups: Vec<usize> = vec![0];
    let mut prefix_run = 0usize;
    let mut expect_operand = true;
    let mut chars = source.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        let mut end = offset + ch.len_utf8();
        let current = groups.last().copied().unwrap_or(0);
        let depth = match ch {
            c if c.is_whitespace() => continue,
            '(' => {
                groups.push(current + 1);
                prefix_run = 0;
                expect_operand = true;
                current + 1
            }
            ')' => {
                if groups.len() > 1 {
                    groups.pop();
                }
                prefix_run = 0;
                expect_operand = false;
                continue;
            }
            '+' | '-' if expect_operand => {
                prefix_run += 1;
                current + prefix_run
            }
            '*' if chars.peek().is_some_and(|&(_, next)| next == '*') => {
                chars.next();
                end += 1;
                let chained = current + 1;
                if let Some(top) = groups.last_mut() {
                    *top = chained;
                }
                prefix_run = 0;
                expect_operand = true;
                chained
            }
            '+' | '-' | '*' | '/' | '%' | ',' => {
                prefix_run = 0;
                expect_operand = true;
                continue;
            }
            _ => {
                prefix_run = 0;
                expect_operand = false;
                continue;
            }
        };
        if depth > max_depth {
            return Err(ExpressionError::TooDeep {
                max_depth,
                span: Span::new(offset, end),
            });
        }
    }
    Ok(())
}

fn alloc<'a>(arena: &'a Bump, kind: ExprKind<'a>, span: Span) -> &'a Expr<'a> {
    arena.alloc(Expr { kind, span })
}

fn unexpected(rule: Rule, span: Span) -> ExpressionError {
    ExpressionError::Syntax {
        message: format!("unexpected {:?}", rule),
        span,
    }
}

fn build_expr<'a>(arena: &'a Bump, pair: Pair<'_, Rule>) -> Result<&'a Expr<'a>, ExpressionError> {
    let span = Span::from(pair.as_span());
    match pair.as_rule() {
        Rule::main => {
            let inner = pair.into_inner().next().ok_or_else(|| ExpressionError::Syntax {
                message: "missing expression".to_string(),
                span: span.clone(),
            })?;
            build_expr(arena, inner)
        }

        Rule::expression => PRATT_PARSER
            .map_primary(|primary| build_expr(arena, primary))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let op_span = Span::from(op.as_span());
                let op = match op.as_rule() {
                    Rule::neg => UnaryOp::Neg,
                    Rule::pos => UnaryOp::Pos,
                    rule => return Err(unexpected(rule, op_span)),
                };
                let span = Span::combine(&op_span, &rhs.span);
                Ok(alloc(arena, ExprKind::Unary { op, expr: rhs }, span))
            })
            .map_infix(|lhs, op, rhs| {
                let (left, right) = (lhs?, rhs?);
                let op = match op.as_rule() {
                    Rule::add => BinaryOp::Add,
                    Rule::sub => BinaryOp::Sub,
                    Rule::mul => BinaryOp::Mul,
                    Rule::div => BinaryOp::Div,
                    Rule::rem => BinaryOp::Rem,
                    Rule::pow => BinaryOp::Pow,
                    rule => return Err(unexpected(rule, Span::from(op.as_span()))),
                };
                let span = Span::combine(&left.span, &right.span);
                Ok(alloc(arena, ExprKind::Binary { op, left, right }, span))
            })
            .map_postfix(|lhs, op| {
                let lhs = lhs?;
                let span = Span::combine(&lhs.span, &Span::from(op.as_span()));
                match op.as_rule() {
                    Rule::call_op => {
                        let args = op
                            .into_inner()
                            .map(|arg| build_expr(arena, arg))
                            .collect::<Result<Vec<_>, _>>()?;
                        let args = arena.alloc_slice_copy(&args);
                        Ok(alloc(
                            arena,
                            ExprKind::Call {
                                callable: lhs,
                                args,
                            },
                            span,
                        ))
                    }
                    Rule::field_op => {
                        let op_span = Span::from(op.as_span());
                        let field = op.into_inner().next().ok_or_else(|| ExpressionError::Syntax {
                            message: "missing member name".to_string(),
                            span: op_span,
                        })?;
                        let field = arena.alloc_str(field.as_str());
                        Ok(alloc(arena, ExprKind::Field { value: lhs, field }, span))
                    }
                    rule => Err(unexpected(rule, span)),
                }
            })
            .parse(pair.into_inner()),

        Rule::integer => {
            let text = pair.as_str();
            // Literals too large for i64 degrade to floats.
            let literal = match text.parse::<i64>() {
                Ok(value) => Literal::Int(value),
                Err(_) => Literal::Float(parse_float(text, &span)?),
            };
            Ok(alloc(arena, ExprKind::Literal(literal), span))
        }

        Rule::float => {
            let value = parse_float(pair.as_str(), &span)?;
            Ok(alloc(arena, ExprKind::Literal(Literal::Float(value)), span))
        }

        Rule::ident => {
            let name = arena.alloc_str(pair.as_str());
            Ok(alloc(arena, ExprKind::Ident(name), span))
        }

        rule => Err(unexpected(rule, span)),
    }
}

fn parse_float(text: &str, span: &Span) -> Result<f64, ExpressionError> {
    text.parse::<f64>()
        .map_err(|_| ExpressionError::InvalidNumber {
            text: text.to_string(),
            span: span.clone(),
        })
}
