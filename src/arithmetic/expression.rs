//! # Expression tree
//!
//! `ExpressionNode` is the single source of truth for a generated problem: the builder produces it,
//! the evaluator and the step tracer interpret it, and the canonical renderer turns it into the text
//! the learner sees. Nothing downstream re-derives the expression from a string.
//!
//! ## Canonical rendering
//! - binary operators other than `^` are surrounded by single spaces: `5 + 3 × 2`
//! - `^` is tight: `3^2`, `(2 + 1)^2`
//! - a root over a bare literal is `√16`, over anything else `√(9 + 7)`
//! - negative literals are always wrapped, `4 × (-3)`, so the sign never reads as a subtraction
//! - a `BinaryOp` marked `parenthesized` is wrapped in `( )`
//!
//! Numbers are shown with at most 2 decimal places, trailing zeros trimmed.
use crate::arithmetic::operators::{BinaryOperator, Operator, UnaryOperator};
use std::collections::BTreeSet;
use std::fmt;

pub const MAX_DECIMAL_PLACES: u32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub enum ExpressionNode {
    /// Leaf number with the count of decimal places it was drawn with
    Literal { value: f64, decimal_places: u32 },
    BinaryOp {
        op: BinaryOperator,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
        parenthesized: bool,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<ExpressionNode>,
    },
}

/// Round to `places` decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(MAX_DECIMAL_PLACES) as i32);
    let rounded = (value * factor).round() / factor;
    // no -0
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Learner-facing number: at most 2 decimals, no trailing zeros, never `-0`
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = round_to(value, MAX_DECIMAL_PLACES);
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

/// Number of decimal places a value needs once rounded to 2 places
pub fn decimal_places_of(value: f64) -> u32 {
    let text = format_number(value);
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len() as u32,
        None => 0,
    }
}

fn precedence(op: BinaryOperator) -> u8 {
    match op {
        BinaryOperator::Add | BinaryOperator::Sub => 1,
        BinaryOperator::Mul | BinaryOperator::Div => 2,
        BinaryOperator::Pow => 3,
    }
}

impl ExpressionNode {
    /// BASIC CONSTRUCTORS

    pub fn integer(value: i64) -> ExpressionNode {
        ExpressionNode::Literal {
            value: value as f64,
            decimal_places: 0,
        }
    }

    pub fn decimal(value: f64, decimal_places: u32) -> ExpressionNode {
        ExpressionNode::Literal {
            value,
            decimal_places: decimal_places.min(MAX_DECIMAL_PLACES),
        }
    }

    /// Literal holding a computed value, e.g. a reduced sub-expression in a trace.
    /// The value is kept exact; only its display is rounded.
    pub fn from_value(value: f64) -> ExpressionNode {
        ExpressionNode::Literal {
            value,
            decimal_places: decimal_places_of(value),
        }
    }

    pub fn binary(op: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
        ExpressionNode::BinaryOp {
            op,
            left: left.boxed(),
            right: right.boxed(),
            parenthesized: false,
        }
    }

    pub fn sqrt(operand: ExpressionNode) -> ExpressionNode {
        ExpressionNode::UnaryOp {
            op: UnaryOperator::Sqrt,
            operand: operand.boxed(),
        }
    }

    pub fn boxed(self) -> Box<ExpressionNode> {
        Box::new(self)
    }

    /// Wrap in parentheses; literals and roots are returned untouched
    pub fn parenthesize(self) -> ExpressionNode {
        match self {
            ExpressionNode::BinaryOp {
                op, left, right, ..
            } => ExpressionNode::BinaryOp {
                op,
                left,
                right,
                parenthesized: true,
            },
            other => other,
        }
    }

    /// Drop the parentheses flag of the outermost node
    pub fn bare(self) -> ExpressionNode {
        match self {
            ExpressionNode::BinaryOp {
                op, left, right, ..
            } => ExpressionNode::BinaryOp {
                op,
                left,
                right,
                parenthesized: false,
            },
            other => other,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, ExpressionNode::Literal { .. })
    }

    pub fn literal_value(&self) -> Option<f64> {
        match self {
            ExpressionNode::Literal { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_parenthesized(&self) -> bool {
        matches!(
            self,
            ExpressionNode::BinaryOp {
                parenthesized: true,
                ..
            }
        )
    }

    /// STRUCTURAL METRICS

    /// Deepest stack of enclosing groups. A group is a parenthesized `BinaryOp` or the
    /// bracketed operand of a root.
    pub fn nesting_depth(&self) -> usize {
        match self {
            ExpressionNode::Literal { .. } => 0,
            ExpressionNode::BinaryOp {
                left,
                right,
                parenthesized,
                ..
            } => left.nesting_depth().max(right.nesting_depth()) + usize::from(*parenthesized),
            ExpressionNode::UnaryOp { operand, .. } => match operand.as_ref() {
                ExpressionNode::Literal { .. } => 0,
                ExpressionNode::BinaryOp { left, right, .. } => {
                    left.nesting_depth().max(right.nesting_depth()) + 1
                }
                unary => unary.nesting_depth() + 1,
            },
        }
    }

    /// (operands at this grouping level, largest operand count of any inner level)
    fn level_operands(&self, level_root: bool) -> (usize, usize) {
        match self {
            ExpressionNode::Literal { .. } => (1, 0),
            ExpressionNode::BinaryOp {
                op,
                left,
                right,
                parenthesized,
            } if *op != BinaryOperator::Pow => {
                if *parenthesized && !level_root {
                    let (n, inner) = self.level_operands(true);
                    return (1, n.max(inner));
                }
                let (l, l_inner) = left.level_operands(false);
                let (r, r_inner) = right.level_operands(false);
                (l + r, l_inner.max(r_inner))
            }
            ExpressionNode::BinaryOp { left, right, .. } => {
                let (base, base_inner) = left.level_operands(true);
                let (exp, exp_inner) = right.level_operands(true);
                (1, base.max(base_inner).max(exp).max(exp_inner))
            }
            ExpressionNode::UnaryOp { operand, .. } => {
                let (n, inner) = operand.level_operands(true);
                (1, n.max(inner))
            }
        }
    }

    /// Operands joined by `+ - × ÷` at the outermost level
    pub fn term_count(&self) -> usize {
        self.level_operands(true).0
    }

    /// Largest operand count of any single grouping level of the expression
    pub fn max_chain_terms(&self) -> usize {
        let (n, inner) = self.level_operands(true);
        n.max(inner)
    }

    pub fn used_operators(&self) -> BTreeSet<Operator> {
        let mut used = BTreeSet::new();
        self.collect_operators(&mut used);
        used
    }

    fn collect_operators(&self, used: &mut BTreeSet<Operator>) {
        match self {
            ExpressionNode::Literal { .. } => {}
            ExpressionNode::BinaryOp {
                op,
                left,
                right,
                parenthesized,
            } => {
                used.insert(op.as_operator());
                if *parenthesized {
                    used.insert(Operator::Parentheses);
                }
                left.collect_operators(used);
                right.collect_operators(used);
            }
            ExpressionNode::UnaryOp { op, operand } => {
                used.insert(op.as_operator());
                if !operand.is_literal() {
                    used.insert(Operator::Parentheses);
                }
                operand.collect_operators(used);
            }
        }
    }

    pub fn has_parentheses(&self) -> bool {
        self.used_operators().contains(&Operator::Parentheses)
    }

    pub fn has_exponents(&self) -> bool {
        self.used_operators().contains(&Operator::Exponent)
    }

    /// Decimal places the exact result can carry given its operands, never more than 2
    pub fn implied_decimal_places(&self) -> u32 {
        let places = match self {
            ExpressionNode::Literal { decimal_places, .. } => *decimal_places,
            ExpressionNode::BinaryOp {
                op, left, right, ..
            } => match op {
                BinaryOperator::Add | BinaryOperator::Sub => left
                    .implied_decimal_places()
                    .max(right.implied_decimal_places()),
                BinaryOperator::Mul => {
                    left.implied_decimal_places() + right.implied_decimal_places()
                }
                BinaryOperator::Div => MAX_DECIMAL_PLACES,
                BinaryOperator::Pow => match right.literal_value() {
                    Some(exp) if exp.fract() == 0.0 && exp >= 0.0 => {
                        left.implied_decimal_places().saturating_mul(exp as u32)
                    }
                    _ => MAX_DECIMAL_PLACES,
                },
            },
            ExpressionNode::UnaryOp { .. } => MAX_DECIMAL_PLACES,
        };
        places.min(MAX_DECIMAL_PLACES)
    }

    /// CANONICAL RENDERER

    fn render_into(&self, out: &mut String) {
        match self {
            ExpressionNode::Literal { value, .. } => {
                if *value < 0.0 && format_number(*value) != "0" {
                    out.push('(');
                    out.push_str(&format_number(*value));
                    out.push(')');
                } else {
                    out.push_str(&format_number(*value));
                }
            }
            ExpressionNode::BinaryOp {
                op,
                left,
                right,
                parenthesized,
            } => {
                if *parenthesized {
                    out.push('(');
                }
                self.render_operands(*op, left, right, out);
                if *parenthesized {
                    out.push(')');
                }
            }
            ExpressionNode::UnaryOp { op, operand } => {
                out.push_str(&op.to_string());
                match operand.as_ref() {
                    ExpressionNode::Literal { .. } => operand.render_into(out),
                    ExpressionNode::BinaryOp {
                        op, left, right, ..
                    } => {
                        // the root's own brackets replace the group's
                        out.push('(');
                        self.render_operands(*op, left, right, out);
                        out.push(')');
                    }
                    unary => {
                        out.push('(');
                        unary.render_into(out);
                        out.push(')');
                    }
                }
            }
        }
    }

    fn render_operands(
        &self,
        op: BinaryOperator,
        left: &ExpressionNode,
        right: &ExpressionNode,
        out: &mut String,
    ) {
        render_child(left, op, false, out);
        if op == BinaryOperator::Pow {
            out.push('^');
        } else {
            out.push(' ');
            out.push_str(&op.to_string());
            out.push(' ');
        }
        render_child(right, op, true, out);
    }
}

/// Children that would otherwise re-parse differently get implicit brackets
fn render_child(child: &ExpressionNode, parent: BinaryOperator, is_right: bool, out: &mut String) {
    if needs_implicit_brackets(child, parent, is_right) {
        out.push('(');
        child.render_into(out);
        out.push(')');
    } else {
        child.render_into(out);
    }
}

impl ExpressionNode {
    /// Same tree with every implicit bracket the renderer would add turned into an explicit
    /// group, so the tree's groups are exactly the brackets a reader sees
    pub fn with_explicit_groups(self) -> ExpressionNode {
        match self {
            ExpressionNode::Literal { .. } => self,
            ExpressionNode::BinaryOp {
                op,
                left,
                right,
                parenthesized,
            } => {
                let left = explicit_child(left.with_explicit_groups(), op, false);
                let right = explicit_child(right.with_explicit_groups(), op, true);
                ExpressionNode::BinaryOp {
                    op,
                    left: left.boxed(),
                    right: right.boxed(),
                    parenthesized,
                }
            }
            ExpressionNode::UnaryOp { op, operand } => ExpressionNode::UnaryOp {
                op,
                operand: operand.with_explicit_groups().bare().boxed(),
            },
        }
    }
}

fn needs_implicit_brackets(child: &ExpressionNode, parent: BinaryOperator, is_right: bool) -> bool {
    match child {
        ExpressionNode::BinaryOp {
            op,
            parenthesized: false,
            ..
        } => {
            let (c, p) = (precedence(*op), precedence(parent));
            c < p || (is_right && c == p)
        }
        _ => false,
    }
}

fn explicit_child(child: ExpressionNode, parent: BinaryOperator, is_right: bool) -> ExpressionNode {
    if needs_implicit_brackets(&child, parent, is_right) {
        child.parenthesize()
    } else {
        child
    }
}

/// Canonical text of an expression tree
pub fn render(node: &ExpressionNode) -> String {
    let mut out = String::new();
    node.render_into(&mut out);
    out
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOperator::*;

    fn int(v: i64) -> ExpressionNode {
        ExpressionNode::integer(v)
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(6.0), "6");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(1.0 / 3.0), "0.33");
        assert_eq!(format_number(-0.0001), "0");
        assert_eq!(format_number(-12.25), "-12.25");
        assert_eq!(decimal_places_of(3.75), 2);
        assert_eq!(decimal_places_of(4.0), 0);
    }

    #[test]
    fn test_render_flat_chain() {
        let e = ExpressionNode::binary(Sub, ExpressionNode::binary(Add, int(5), int(3)), int(2));
        assert_eq!(render(&e), "5 + 3 - 2");
    }

    #[test]
    fn test_render_parenthesized_and_power() {
        let group = ExpressionNode::binary(Add, int(5), int(3)).parenthesize();
        let e = ExpressionNode::binary(Mul, group.clone(), int(2));
        assert_eq!(render(&e), "(5 + 3) × 2");
        let p = ExpressionNode::binary(Pow, group, int(2));
        assert_eq!(render(&p), "(5 + 3)^2");
        let q = ExpressionNode::binary(Pow, int(3), int(2));
        assert_eq!(q.to_string(), "3^2");
    }

    #[test]
    fn test_render_roots_and_negatives() {
        let root = ExpressionNode::sqrt(int(16));
        assert_eq!(render(&root), "√16");
        let root_group = ExpressionNode::sqrt(ExpressionNode::binary(Add, int(9), int(7)));
        assert_eq!(render(&root_group), "√(9 + 7)");
        let neg = ExpressionNode::binary(Mul, int(4), int(-3));
        assert_eq!(render(&neg), "4 × (-3)");
        let dec = ExpressionNode::binary(Div, ExpressionNode::decimal(7.5, 1), int(5));
        assert_eq!(render(&dec), "7.5 ÷ 5");
    }

    #[test]
    fn test_render_adds_needed_brackets() {
        // (2 + 3) × 4 built without the flag still has to read that way
        let e = ExpressionNode::binary(Mul, ExpressionNode::binary(Add, int(2), int(3)), int(4));
        assert_eq!(render(&e), "(2 + 3) × 4");
        let r = ExpressionNode::binary(Sub, int(9), ExpressionNode::binary(Sub, int(4), int(1)));
        assert_eq!(render(&r), "9 - (4 - 1)");
    }

    #[test]
    fn test_explicit_groups_keep_text() {
        let e = ExpressionNode::binary(Mul, ExpressionNode::binary(Add, int(2), int(3)), int(4));
        let explicit = e.clone().with_explicit_groups();
        assert_eq!(render(&explicit), render(&e));
        assert_eq!(explicit.nesting_depth(), 1);
        assert_eq!(e.nesting_depth(), 0);
    }

    #[test]
    fn test_metrics() {
        let group = ExpressionNode::binary(Add, int(5), int(3)).parenthesize();
        let e = ExpressionNode::binary(
            Add,
            ExpressionNode::binary(Mul, group, int(2)),
            ExpressionNode::sqrt(int(16)),
        );
        assert_eq!(e.nesting_depth(), 1);
        assert_eq!(e.term_count(), 3);
        assert_eq!(e.max_chain_terms(), 3);
        assert!(e.has_parentheses());
        assert!(!e.has_exponents());
        let used: Vec<Operator> = e.used_operators().into_iter().collect();
        assert_eq!(
            used,
            vec![
                Operator::Addition,
                Operator::Multiplication,
                Operator::Parentheses,
                Operator::Root
            ]
        );
    }

    #[test]
    fn test_inner_level_counts() {
        let inner = ExpressionNode::binary(
            Add,
            ExpressionNode::binary(Add, int(1), int(2)),
            ExpressionNode::binary(Add, int(3), int(4)),
        )
        .parenthesize();
        let e = ExpressionNode::binary(Mul, inner, int(2));
        assert_eq!(e.term_count(), 2);
        assert_eq!(e.max_chain_terms(), 4);
        let nested = ExpressionNode::binary(
            Sub,
            int(10),
            ExpressionNode::binary(Mul, e.clone().parenthesize(), int(1)).parenthesize(),
        );
        assert_eq!(nested.nesting_depth(), 3);
    }

    #[test]
    fn test_implied_decimal_places() {
        let e = ExpressionNode::binary(Mul, ExpressionNode::decimal(1.5, 1), ExpressionNode::decimal(2.5, 1));
        assert_eq!(e.implied_decimal_places(), 2);
        let s = ExpressionNode::binary(Add, ExpressionNode::decimal(1.5, 1), int(2));
        assert_eq!(s.implied_decimal_places(), 1);
        let p = ExpressionNode::binary(Pow, int(3), int(2));
        assert_eq!(p.implied_decimal_places(), 0);
        assert_eq!(round_to(2.345, 1), 2.3);
        assert_eq!(round_to(-0.001, 2), 0.0);
    }
}
