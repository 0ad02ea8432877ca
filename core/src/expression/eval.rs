//! Core evaluation logic.

use tracing::trace;

use crate::{
    Value,
    expression::{
        BinaryOp, ExpressionError, Span, UnaryOp,
        parsed_expr::{Expr, ExprKind, Literal},
    },
    stdlib::{Member, NativeFunction, Namespace, Package},
};

/// Result of a numeric expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(i) => Value::Integer(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

/// What a subexpression denotes before it is forced to a number.
enum Resolved<'n> {
    Number(Number),
    Package(&'n Package),
    Function(&'n NativeFunction),
}

/// Evaluator for parsed expressions against an explicit namespace.
pub struct Evaluator<'n, 's> {
    namespace: &'n Namespace,
    source: &'s str,
    max_depth: usize,
    depth: usize,
}

impl<'n, 's> Evaluator<'n, 's> {
    pub fn new(namespace: &'n Namespace, source: &'s str, max_depth: usize) -> Self {
        Self {
            namespace,
            source,
            max_depth,
            depth: 0,
        }
    }

    /// Evaluate an expression that must produce a number.
    pub fn eval(&mut self, expr: &Expr<'_>) -> Result<Number, ExpressionError> {
        match self.resolve(expr)? {
            Resolved::Number(n) => Ok(n),
            Resolved::Package(package) => Err(ExpressionError::NotNumeric {
                what: format!("package '{}'", package.name()),
                span: expr.span.clone(),
            }),
            Resolved::Function(function) => Err(ExpressionError::NotNumeric {
                what: format!("function '{}'", function.name),
                span: expr.span.clone(),
            }),
        }
    }

    fn resolve(&mut self, expr: &Expr<'_>) -> Result<Resolved<'n>, ExpressionError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(ExpressionError::TooDeep {
                max_depth: self.max_depth,
                span: expr.span.clone(),
            });
        }
        let result = self.resolve_inner(expr);
        self.depth -= 1;
        result
    }

    fn resolve_inner(&mut self, expr: &Expr<'_>) -> Result<Resolved<'n>, ExpressionError> {
        match &expr.kind {
            ExprKind::Literal(Literal::Int(i)) => Ok(Resolved::Number(Number::Int(*i))),
            ExprKind::Literal(Literal::Float(f)) => Ok(Resolved::Number(Number::Float(*f))),

            ExprKind::Ident(name) => self
                .namespace
                .package(name)
                .map(Resolved::Package)
                .ok_or_else(|| ExpressionError::UnknownName {
                    name: name.to_string(),
                    span: expr.span.clone(),
                }),

            ExprKind::Field { value, field } => {
                let package = match self.resolve(value)? {
                    Resolved::Package(package) => package,
                    _ => {
                        return Err(ExpressionError::UnknownMember {
                            package: value.span.str_of(self.source).to_string(),
                            member: field.to_string(),
                            span: expr.span.clone(),
                        });
                    }
                };
                match package.member(field) {
                    Some(Member::Constant(c)) => Ok(Resolved::Number(Number::Float(*c))),
                    Some(Member::Function(f)) => Ok(Resolved::Function(f)),
                    None => Err(ExpressionError::UnknownMember {
                        package: package.name().to_string(),
                        member: field.to_string(),
                        span: expr.span.clone(),
                    }),
                }
            }

            ExprKind::Call { callable, args } => {
                let function = match self.resolve(callable)? {
                    Resolved::Function(f) => f,
                    _ => {
                        return Err(ExpressionError::NotCallable {
                            name: callable.span.str_of(self.source).to_string(),
                            span: callable.span.clone(),
                        });
                    }
                };
                if !function.accepts(args.len()) {
                    return Err(ExpressionError::Arity {
                        function: callable.span.str_of(self.source).to_string(),
                        expected: function.arity(),
                        found: args.len(),
                        span: expr.span.clone(),
                    });
                }
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg).map(Number::as_f64))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(function, &values, callable, &expr.span)
                    .map(Resolved::Number)
            }

            ExprKind::Unary { op, expr: operand } => {
                let value = self.eval(operand)?;
                Ok(Resolved::Number(match (op, value) {
                    (UnaryOp::Pos, n) => n,
                    (UnaryOp::Neg, Number::Int(i)) => match i.checked_neg() {
                        Some(negated) => Number::Int(negated),
                        None => Number::Float(-(i as f64)),
                    },
                    (UnaryOp::Neg, Number::Float(f)) => Number::Float(-f),
                }))
            }

            ExprKind::Binary { op, left, right } => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                binary(*op, l, r, &expr.span).map(Resolved::Number)
            }
        }
    }

    fn call(
        &self,
        function: &NativeFunction,
        args: &[f64],
        callable: &Expr<'_>,
        span: &Span,
    ) -> Result<Number, ExpressionError> {
        let result = function.call(args);
        trace!(function = function.name, ?args, result, "native call");
        if function.checks_domain && result.is_nan() && !args.iter().any(|a| a.is_nan()) {
            return Err(ExpressionError::Domain {
                function: callable.span.str_of(self.source).to_string(),
                span: span.clone(),
            });
        }
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        if function.returns_int && result >= i64::MIN as f64 && result < i64::MAX as f64 {
            Ok(Number::Int(result as i64))
        } else {
            Ok(Number::Float(result))
        }
    }
}

/// Apply a binary operator.
///
/// Integers stay integers where the result is exact; `/` always produces a
/// float and overflow degrades to float arithmetic.
fn binary(op: BinaryOp, l: Number, r: Number, span: &Span) -> Result<Number, ExpressionError> {
    let division_by_zero = || ExpressionError::DivisionByZero { span: span.clone() };

    if let (Number::Int(a), Number::Int(b)) = (l, r) {
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Rem => {
                if b == 0 {
                    return Err(division_by_zero());
                }
                a.checked_rem(b)
                    .map(|m| if m != 0 && (m < 0) != (b < 0) { m + b } else { m })
            }
            BinaryOp::Pow => u32::try_from(b).ok().and_then(|e| a.checked_pow(e)),
            BinaryOp::Div => None,
        };
        if let Some(value) = exact {
            return Ok(Number::Int(value));
        }
    }

    let (a, b) = (l.as_f64(), r.as_f64());
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if r.is_zero() {
                return Err(division_by_zero());
            }
            a / b
        }
        BinaryOp::Rem => {
            if r.is_zero() {
                return Err(division_by_zero());
            }
            let m = a % b;
            if m != 0.0 && (m < 0.0) != (b < 0.0) { m + b } else { m }
        }
        BinaryOp::Pow => {
            if l.is_zero() && b < 0.0 {
                return Err(division_by_zero());
            }
            let value = a.powf(b);
            if value.is_nan() && !a.is_nan() && !b.is_nan() {
                return Err(ExpressionError::Domain {
                    function: "**".to_string(),
                    span: span.clone(),
                });
            }
            value
        }
    };
    Ok(Number::Float(value))
}
