//! # Expression builder
//!
//! Assembles a random expression tree for a difficulty profile, tracking the exact value of every
//! node as it is created.
//!
//! At each grouping level the builder draws 2..=min(4, max_terms) operands and joins them with
//! operators from the profile. Operands are folded with precedence already applied: `×`/`÷` extend the
//! running product, `+`/`-` close it, so the tree is exactly what the rendered text means.
//!
//! - a division whose quotient would not be exact gets its divisor replaced with one of
//!   2, 3, 4, 5, 10 that is exact, or turns into a multiplication when none is
//! - with probability 1/2, one operand of a level is a parenthesized sub-expression built one level
//!   deeper, optionally raised to 2 or 3 or put under a root
//! - `^` (level 3 on) and `√` (level 5) appear on literals at any depth and on groups within the
//!   profile's nesting depth
//! - a root only ever receives a non-negative perfect square; anything else is swapped for a
//!   perfect-square literal
use crate::arithmetic::difficulty::DifficultyProfile;
use crate::arithmetic::errors::GenerationError;
use crate::arithmetic::evaluator::{apply_binary, apply_unary};
use crate::arithmetic::expression::ExpressionNode;
use crate::arithmetic::operators::{BinaryOperator, Operator, UnaryOperator};
use crate::arithmetic::term_generator::{
    divides_evenly, exact_small_divisor, next_term, perfect_square_term, whole_term,
};
use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Upper bound of operands per grouping level, whatever the profile says
pub const MAX_TERMS_PER_LEVEL: usize = 4;
const GROUP_PROBABILITY: f64 = 0.5;
const GROUP_POWER_PROBABILITY: f64 = 0.3;
const GROUP_ROOT_PROBABILITY: f64 = 0.3;
const LITERAL_POWER_PROBABILITY: f64 = 0.2;
const LITERAL_ROOT_PROBABILITY: f64 = 0.15;
/// Largest |base| a parenthesized group may have to be squared
const MAX_GROUP_BASE: f64 = 12.0;
/// Largest |base| that may be cubed
const MAX_CUBE_BASE: f64 = 5.0;
const MAX_ROOT: i64 = 10;

/// A tree together with the value tracked while building it
#[derive(Debug, Clone, PartialEq)]
pub struct Built {
    pub node: ExpressionNode,
    pub value: f64,
}

impl Built {
    fn literal(node: ExpressionNode) -> Built {
        let value = node.literal_value().unwrap_or(0.0);
        Built { node, value }
    }

    fn binary(op: BinaryOperator, left: Built, right: Built) -> Built {
        let (value, _) = apply_binary(op, left.value, right.value);
        Built {
            node: ExpressionNode::binary(op, left.node, right.node),
            value,
        }
    }

    fn sqrt(operand: Built) -> Built {
        let (value, _) = apply_unary(UnaryOperator::Sqrt, operand.value);
        Built {
            node: ExpressionNode::sqrt(operand.node.bare()),
            value,
        }
    }

    fn parenthesized(self) -> Built {
        Built {
            node: self.node.parenthesize(),
            value: self.value,
        }
    }
}

fn fits_two_places(value: f64) -> bool {
    let scaled = value * 100.0;
    value.is_finite() && (scaled - scaled.round()).abs() < 1e-6
}

fn is_perfect_square(value: f64) -> bool {
    value >= 0.0 && value.fract() == 0.0 && value.sqrt().fract() == 0.0
}

pub struct ExpressionBuilder<'a, R: Rng + ?Sized> {
    profile: &'a DifficultyProfile,
    rng: &'a mut R,
    chain_operators: Vec<BinaryOperator>,
}

impl<'a, R: Rng + ?Sized> ExpressionBuilder<'a, R> {
    pub fn new(profile: &'a DifficultyProfile, rng: &'a mut R) -> Self {
        let mut chain_operators: Vec<BinaryOperator> = profile
            .allowed_operators
            .iter()
            .filter_map(|op| BinaryOperator::from_operator(*op))
            .filter(|op| op.is_additive() || op.is_multiplicative())
            .collect();
        if chain_operators.is_empty() {
            chain_operators = vec![BinaryOperator::Add, BinaryOperator::Sub];
        }
        ExpressionBuilder {
            profile,
            rng,
            chain_operators,
        }
    }

    /// Build a complete expression, starting at nesting depth 0
    pub fn build(&mut self) -> Built {
        let built = self.build_at_depth(0);
        debug!("built '{}' = {}", built.node, built.value);
        built
    }

    fn terms_per_level(&self) -> usize {
        self.profile.max_terms.min(MAX_TERMS_PER_LEVEL).max(2)
    }

    fn may_nest(&self, depth: usize) -> bool {
        self.profile.parentheses_enabled() && depth < self.profile.max_nesting_depth
    }

    fn build_at_depth(&mut self, depth: usize) -> Built {
        let n = self.rng.random_range(2..=self.terms_per_level());
        let group_slot = if self.may_nest(depth) && self.rng.random_bool(GROUP_PROBABILITY) {
            Some(self.rng.random_range(0..n))
        } else {
            None
        };

        let operands: Vec<Built> = (0..n)
            .map(|slot| {
                if group_slot == Some(slot) {
                    self.group_operand(depth)
                } else {
                    self.plain_operand()
                }
            })
            .collect();

        // fold with precedence: products first, then the additive chain
        let mut operands = operands.into_iter();
        let mut sum: Option<(Built, BinaryOperator)> = None;
        let mut product = match operands.next() {
            Some(first) => first,
            None => return Built::literal(next_term(self.profile, self.rng)),
        };
        for operand in operands {
            let op = *self
                .chain_operators
                .choose(self.rng)
                .unwrap_or(&BinaryOperator::Add);
            match op {
                BinaryOperator::Mul => product = self.multiply(product, operand),
                BinaryOperator::Div => product = self.divide(product, operand),
                BinaryOperator::Add | BinaryOperator::Sub => {
                    let left = match sum.take() {
                        None => product,
                        Some((acc, pending)) => Built::binary(pending, acc, product),
                    };
                    sum = Some((left, op));
                    product = operand;
                }
                BinaryOperator::Pow => unreachable!("^ is never a chain operator"),
            }
        }
        match sum {
            None => product,
            Some((acc, pending)) => Built::binary(pending, acc, product),
        }
    }

    /// `left × right`; a factor that would push the product past 2 decimal places is
    /// replaced with a small whole number
    fn multiply(&mut self, left: Built, right: Built) -> Built {
        let (value, _) = apply_binary(BinaryOperator::Mul, left.value, right.value);
        if fits_two_places(value) {
            return Built::binary(BinaryOperator::Mul, left, right);
        }
        let factor = whole_term(self.rng, 2, 5);
        debug!("{} × {} is not exact to 2 places, using {}", left.value, right.value, factor);
        Built::binary(BinaryOperator::Mul, left, Built::literal(factor))
    }

    /// `dividend ÷ divisor`, repaired so the quotient is exact
    fn divide(&mut self, dividend: Built, divisor: Built) -> Built {
        if divides_evenly(dividend.value, divisor.value) {
            return Built::binary(BinaryOperator::Div, dividend, divisor);
        }
        match exact_small_divisor(self.rng, dividend.value) {
            Some(d) => {
                debug!(
                    "{} does not divide {} evenly, using {} instead",
                    divisor.node, dividend.value, d
                );
                Built::binary(
                    BinaryOperator::Div,
                    dividend,
                    Built::literal(ExpressionNode::integer(d)),
                )
            }
            None => {
                debug!("no exact divisor for {}, multiplying instead", dividend.value);
                self.multiply(dividend, divisor)
            }
        }
    }

    /// Literal, `a^2`/`a^3` or `√(r²)`; none of them needs brackets, so any depth will do
    fn plain_operand(&mut self) -> Built {
        if self.profile.exponents_enabled() && self.rng.random_bool(LITERAL_POWER_PROBABILITY) {
            return self.literal_power();
        }
        if self.profile.roots_enabled() && self.rng.random_bool(LITERAL_ROOT_PROBABILITY) {
            let radicand = perfect_square_term(self.rng, MAX_ROOT);
            return Built::sqrt(Built::literal(radicand));
        }
        Built::literal(next_term(self.profile, self.rng))
    }

    fn literal_power(&mut self) -> Built {
        let cube = self.rng.random_bool(0.3);
        let (base, exponent) = if cube {
            (whole_term(self.rng, 2, MAX_CUBE_BASE as i64), 3)
        } else {
            let high = (self.profile.max_magnitude as i64).min(10);
            (whole_term(self.rng, 2, high), 2)
        };
        Built::binary(
            BinaryOperator::Pow,
            Built::literal(base),
            Built::literal(ExpressionNode::integer(exponent)),
        )
    }

    /// Parenthesized sub-expression one level deeper, possibly raised to a power or rooted
    fn group_operand(&mut self, depth: usize) -> Built {
        let inner = self.build_at_depth(depth + 1);

        if self.profile.roots_enabled() && self.rng.random_bool(GROUP_ROOT_PROBABILITY) {
            if is_perfect_square(inner.value) {
                return Built::sqrt(inner);
            }
            // never let a negative or irrational value flow into the root
            let radicand = perfect_square_term(self.rng, MAX_ROOT);
            debug!(
                "root over '{}' = {} replaced with √{}",
                inner.node, inner.value, radicand
            );
            return Built::sqrt(Built::literal(radicand));
        }

        let group = inner.parenthesized();
        if self.profile.exponents_enabled() && self.rng.random_bool(GROUP_POWER_PROBABILITY) {
            let value = group.value;
            if value.fract() == 0.0 && value.abs() <= MAX_GROUP_BASE {
                let exponent = if value.abs() <= MAX_CUBE_BASE && self.rng.random_bool(0.3) {
                    3
                } else {
                    2
                };
                return Built::binary(
                    BinaryOperator::Pow,
                    group,
                    Built::literal(ExpressionNode::integer(exponent)),
                );
            }
        }
        group
    }
}

/// Build an expression for `profile` from the given random stream
pub fn build<R: Rng + ?Sized>(profile: &DifficultyProfile, rng: &mut R) -> Built {
    ExpressionBuilder::new(profile, rng).build()
}

/// Check a tree against the profile it was built for
pub fn check_grammar(
    node: &ExpressionNode,
    profile: &DifficultyProfile,
) -> Result<(), GenerationError> {
    let depth = node.nesting_depth();
    if depth > profile.max_nesting_depth {
        return Err(GenerationError::GrammarViolation(format!(
            "nesting depth {} exceeds {} in '{}'",
            depth, profile.max_nesting_depth, node
        )));
    }
    let terms = node.max_chain_terms();
    if terms > profile.max_terms {
        return Err(GenerationError::GrammarViolation(format!(
            "{} terms exceed {} in '{}'",
            terms, profile.max_terms, node
        )));
    }
    let stray: Vec<Operator> = node
        .used_operators()
        .into_iter()
        .filter(|op| !profile.allows(*op))
        .collect();
    if !stray.is_empty() {
        return Err(GenerationError::GrammarViolation(format!(
            "operators {:?} not allowed at level {} in '{}'",
            stray, profile.level, node
        )));
    }
    Ok(())
}
