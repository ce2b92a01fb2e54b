//! # Evaluator
//!
//! Two entry points share one interpreter:
//! - [`evaluate`] walks an [`ExpressionNode`] directly. The tree already encodes precedence
//!   (parentheses, then `^`/`√`, then `×`/`÷`, then `+`/`-`, each left to right), so structural
//!   recursion is the whole algorithm.
//! - [`evaluate_expression`] accepts rendered text, parses it with a `nom` recursive-descent grammar
//!   into the same tree type and evaluates that.
//!
//! Division by zero and the square root of a negative number are not errors: the result of that
//! single operation is replaced with 0 and evaluation continues.
//!
//! Grammar (ASCII aliases in brackets):
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := signed (('×' [*, x] | '÷' [/]) signed)*
//! signed     := '-' signed | power
//! power      := unary ('^' unary)*
//! unary      := ('√' | 'sqrt') unary | atom
//! atom       := number | '(' expression ')'
//! ```
//! A leading minus binds looser than `^`: `-3^2` is `-(3^2)`, while `(-3)^2` squares the literal.
use crate::arithmetic::errors::EvaluationError;
use crate::arithmetic::expression::ExpressionNode;
use crate::arithmetic::operators::{BinaryOperator, UnaryOperator};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{opt, recognize},
    multi::many0,
    sequence::{delimited, preceded},
};

/// Operation whose mathematical result is undefined and was replaced with 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainFallback {
    DivisionByZero,
    NegativeRoot,
}

/// Value of one binary operation, with the fallback that was applied if any
pub fn apply_binary(op: BinaryOperator, a: f64, b: f64) -> (f64, Option<DomainFallback>) {
    match op {
        BinaryOperator::Add => (a + b, None),
        BinaryOperator::Sub => (a - b, None),
        BinaryOperator::Mul => (a * b, None),
        BinaryOperator::Div => {
            if b == 0.0 {
                (0.0, Some(DomainFallback::DivisionByZero))
            } else {
                (a / b, None)
            }
        }
        BinaryOperator::Pow => (a.powf(b), None),
    }
}

pub fn apply_unary(op: UnaryOperator, a: f64) -> (f64, Option<DomainFallback>) {
    match op {
        UnaryOperator::Sqrt => {
            if a < 0.0 {
                (0.0, Some(DomainFallback::NegativeRoot))
            } else {
                (a.sqrt(), None)
            }
        }
    }
}

/// Interpret the tree in double precision
pub fn evaluate(node: &ExpressionNode) -> f64 {
    match node {
        ExpressionNode::Literal { value, .. } => *value,
        ExpressionNode::BinaryOp {
            op, left, right, ..
        } => apply_binary(*op, evaluate(left), evaluate(right)).0,
        ExpressionNode::UnaryOp { op, operand } => apply_unary(*op, evaluate(operand)).0,
    }
}

/// Every fallback the tree triggers, in evaluation order
pub fn domain_fallbacks(node: &ExpressionNode) -> Vec<DomainFallback> {
    fn walk(node: &ExpressionNode, found: &mut Vec<DomainFallback>) -> f64 {
        match node {
            ExpressionNode::Literal { value, .. } => *value,
            ExpressionNode::BinaryOp {
                op, left, right, ..
            } => {
                let a = walk(left, found);
                let b = walk(right, found);
                let (value, fallback) = apply_binary(*op, a, b);
                found.extend(fallback);
                value
            }
            ExpressionNode::UnaryOp { op, operand } => {
                let a = walk(operand, found);
                let (value, fallback) = apply_unary(*op, a);
                found.extend(fallback);
                value
            }
        }
    }
    let mut found = Vec::new();
    walk(node, &mut found);
    found
}

////////////////////////////////////////TEXT FRONT END////////////////////////////////////////

fn number(input: &str) -> IResult<&str, ExpressionNode> {
    let parsed: IResult<&str, &str> = recognize((digit1, opt((char('.'), digit1)))).parse(input);
    let (rest, digits) = parsed?;
    let magnitude: f64 = match digits.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Float,
            )));
        }
    };
    let decimal_places = digits
        .split_once('.')
        .map(|(_, fraction)| fraction.len() as u32)
        .unwrap_or(0);
    Ok((rest, ExpressionNode::decimal(magnitude, decimal_places)))
}

fn group(input: &str) -> IResult<&str, ExpressionNode> {
    let (rest, inner) = delimited(
        (char('('), multispace0),
        expression,
        (multispace0, char(')')),
    )
    .parse(input)?;
    // "(-3)" is how negative literals are written, not a group
    let node = if inner.is_literal() {
        inner
    } else {
        inner.parenthesize()
    };
    Ok((rest, node))
}

fn atom(input: &str) -> IResult<&str, ExpressionNode> {
    preceded(multispace0, alt((number, group))).parse(input)
}

fn root(input: &str) -> IResult<&str, ExpressionNode> {
    let (rest, operand) =
        preceded((multispace0, alt((tag("√"), tag("sqrt")))), unary).parse(input)?;
    // the root's own brackets are not a separate group
    Ok((rest, ExpressionNode::sqrt(operand.bare())))
}

fn unary(input: &str) -> IResult<&str, ExpressionNode> {
    alt((root, atom)).parse(input)
}

fn power(input: &str) -> IResult<&str, ExpressionNode> {
    let (rest, first) = unary(input)?;
    let (rest, exponents) = many0(preceded((multispace0, char('^')), unary)).parse(rest)?;
    let node = exponents.into_iter().fold(first, |base, exponent| {
        ExpressionNode::binary(BinaryOperator::Pow, base, exponent)
    });
    Ok((rest, node))
}

/// `-x`: a negated literal stays a literal, anything else becomes `(-1) × x`
fn negate(node: ExpressionNode) -> ExpressionNode {
    match node {
        ExpressionNode::Literal {
            value,
            decimal_places,
        } => ExpressionNode::decimal(-value, decimal_places),
        other => ExpressionNode::binary(BinaryOperator::Mul, ExpressionNode::integer(-1), other),
    }
}

fn signed(input: &str) -> IResult<&str, ExpressionNode> {
    let minus: IResult<&str, char> = preceded(multispace0, char('-')).parse(input);
    match minus {
        Ok((rest, _)) => {
            let (rest, operand) = signed(rest)?;
            Ok((rest, negate(operand)))
        }
        Err(nom::Err::Error(_)) => power(input),
        Err(err) => Err(err),
    }
}

fn term(input: &str) -> IResult<&str, ExpressionNode> {
    let (rest, first) = signed(input)?;
    let (rest, tail) =
        many0((preceded(multispace0, one_of("×*x÷/")), signed)).parse(rest)?;
    let node = tail.into_iter().fold(first, |acc, (symbol, rhs)| {
        let op = match symbol {
            '÷' | '/' => BinaryOperator::Div,
            _ => BinaryOperator::Mul,
        };
        ExpressionNode::binary(op, acc, rhs)
    });
    Ok((rest, node))
}

fn expression(input: &str) -> IResult<&str, ExpressionNode> {
    let (rest, first) = term(input)?;
    let (rest, tail) = many0((preceded(multispace0, one_of("+-")), term)).parse(rest)?;
    let node = tail.into_iter().fold(first, |acc, (symbol, rhs)| {
        let op = if symbol == '+' {
            BinaryOperator::Add
        } else {
            BinaryOperator::Sub
        };
        ExpressionNode::binary(op, acc, rhs)
    });
    Ok((rest, node))
}

fn check_parentheses(text: &str) -> Result<(), EvaluationError> {
    let mut depth: i64 = 0;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(EvaluationError::UnbalancedParentheses);
                }
            }
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(EvaluationError::UnbalancedParentheses)
    }
}

/// Parse rendered (or hand-typed) expression text into a tree
pub fn parse_expression(text: &str) -> Result<ExpressionNode, EvaluationError> {
    let input = text.trim();
    if input.is_empty() {
        return Err(EvaluationError::Empty);
    }
    check_parentheses(input)?;
    match expression(input) {
        Ok((rest, node)) => {
            let rest = rest.trim();
            if rest.is_empty() {
                Ok(node)
            } else {
                Err(EvaluationError::TrailingInput(rest.to_string()))
            }
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = input.len() - e.input.len();
            let position = input[..offset].chars().count();
            match e.input.trim_start().chars().next() {
                Some(found) => Err(EvaluationError::UnexpectedCharacter { position, found }),
                None => Err(EvaluationError::InvalidNumber(input.to_string())),
            }
        }
        Err(nom::Err::Incomplete(_)) => Err(EvaluationError::InvalidNumber(input.to_string())),
    }
}

/// Value of an expression given as text
pub fn evaluate_expression(text: &str) -> Result<f64, EvaluationError> {
    let node = parse_expression(text)?;
    Ok(evaluate(&node))
}
