//! Random leaf values for the expression builder.
//!
//! Every draw comes from the caller's generator, never from a global one, so a seeded
//! `StdRng` reproduces the same terms.
use crate::arithmetic::difficulty::DifficultyProfile;
use crate::arithmetic::expression::ExpressionNode;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Chance that a term is drawn as a one-decimal number when decimals are allowed
pub const DECIMAL_PROBABILITY: f64 = 0.3;
/// Chance that a term's sign is flipped when negatives are allowed
pub const NEGATIVE_PROBABILITY: f64 = 0.25;
/// Replacement divisors that keep a division exact
pub const SMALL_DIVISORS: [i64; 5] = [2, 3, 4, 5, 10];

/// Integer or one-decimal literal in [1, max_magnitude], possibly negated. Never zero.
pub fn next_term<R: Rng + ?Sized>(profile: &DifficultyProfile, rng: &mut R) -> ExpressionNode {
    let max = profile.max_magnitude.max(1) as i64;
    let (magnitude, places) = if profile.can_use_decimals && rng.random_bool(DECIMAL_PROBABILITY) {
        let tenths = rng.random_range(10..=max * 10);
        (tenths as f64 / 10.0, if tenths % 10 == 0 { 0 } else { 1 })
    } else {
        (rng.random_range(1..=max) as f64, 0)
    };
    let value = if profile.can_use_negatives && rng.random_bool(NEGATIVE_PROBABILITY) {
        -magnitude
    } else {
        magnitude
    };
    ExpressionNode::decimal(value, places)
}

/// Positive integer literal in [low, high]
pub fn whole_term<R: Rng + ?Sized>(rng: &mut R, low: i64, high: i64) -> ExpressionNode {
    let high = high.max(low);
    ExpressionNode::integer(rng.random_range(low..=high))
}

/// Perfect square r² with r in [1, max_root]
pub fn perfect_square_term<R: Rng + ?Sized>(rng: &mut R, max_root: i64) -> ExpressionNode {
    let root = rng.random_range(1..=max_root.max(1));
    ExpressionNode::integer(root * root)
}

/// A divisor from `SMALL_DIVISORS` that divides `dividend` exactly, if one exists
pub fn exact_small_divisor<R: Rng + ?Sized>(rng: &mut R, dividend: f64) -> Option<i64> {
    let candidates: Vec<i64> = SMALL_DIVISORS
        .iter()
        .copied()
        .filter(|d| divides_evenly(dividend, *d as f64))
        .collect();
    candidates.choose(rng).copied()
}

/// Whether `dividend ÷ divisor` needs no more decimal places than the dividend itself
pub fn divides_evenly(dividend: f64, divisor: f64) -> bool {
    if divisor == 0.0 || !dividend.is_finite() {
        return false;
    }
    let places = crate::arithmetic::expression::decimal_places_of(dividend);
    let scale = 10f64.powi(places as i32);
    let quotient = dividend / divisor * scale;
    (quotient - quotient.round()).abs() < 1e-9
}
