//! # Step tracer
//!
//! Reduces a copy of the tree one elementary operation at a time and writes down each reduction
//! for the learner, in strict PEMDAS order:
//!
//! 1. parentheses: innermost group first, left to right; everything inside a group (including its
//!    own powers and products) is reduced as part of this tier
//! 2. `^` and `√`, left to right
//! 3. `×` and `÷`, left to right
//! 4. `+` and `-`, left to right
//!
//! A tier never starts before the previous one is exhausted. Each reduction produces an
//! "Evaluate … = …" line followed by the rewritten expression; the trace ends with the final answer.
//! Reductions are tree rewrites: the reduced node is replaced by a literal holding its exact value.
use crate::arithmetic::evaluator::{DomainFallback, apply_binary, apply_unary};
use crate::arithmetic::expression::{ExpressionNode, format_number, render, round_to};
use crate::arithmetic::operators::{BinaryOperator, Language};
use log::warn;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum Tier {
    Parentheses,
    ExponentsRoots,
    MultiplicationDivision,
    AdditionSubtraction,
}

const OPERATOR_TIERS: [Tier; 3] = [
    Tier::ExponentsRoots,
    Tier::MultiplicationDivision,
    Tier::AdditionSubtraction,
];

fn tier_of(node: &ExpressionNode) -> Option<Tier> {
    match node {
        ExpressionNode::Literal { .. } => None,
        ExpressionNode::UnaryOp { .. } => Some(Tier::ExponentsRoots),
        ExpressionNode::BinaryOp { op, .. } => Some(match op {
            BinaryOperator::Pow => Tier::ExponentsRoots,
            BinaryOperator::Mul | BinaryOperator::Div => Tier::MultiplicationDivision,
            BinaryOperator::Add | BinaryOperator::Sub => Tier::AdditionSubtraction,
        }),
    }
}

/// One elementary reduction
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub tier: Tier,
    /// the reduced sub-expression as it read before the step
    pub sub_expression: String,
    pub value: f64,
    pub fallback: Option<DomainFallback>,
    /// the whole expression after the step
    pub expression_after: String,
}

struct Reduction {
    sub_expression: String,
    value: f64,
    fallback: Option<DomainFallback>,
}

/// Replace `node` by its value if all its operands are already literals
fn reduce_here(node: &mut ExpressionNode) -> Option<Reduction> {
    let (value, fallback) = match node {
        ExpressionNode::BinaryOp {
            op, left, right, ..
        } => match (left.literal_value(), right.literal_value()) {
            (Some(a), Some(b)) => apply_binary(*op, a, b),
            _ => return None,
        },
        ExpressionNode::UnaryOp { op, operand } => match operand.literal_value() {
            Some(a) => apply_unary(*op, a),
            None => return None,
        },
        ExpressionNode::Literal { .. } => return None,
    };
    let sub_expression = render(node);
    *node = ExpressionNode::from_value(value);
    Some(Reduction {
        sub_expression,
        value,
        fallback,
    })
}

/// Leftmost, innermost reducible node of `tier` (any tier when `None`)
fn reduce_leftmost(node: &mut ExpressionNode, tier: Option<Tier>) -> Option<Reduction> {
    let found = match node {
        ExpressionNode::Literal { .. } => return None,
        ExpressionNode::BinaryOp { left, right, .. } => {
            reduce_leftmost(left, tier).or_else(|| reduce_leftmost(right, tier))
        }
        ExpressionNode::UnaryOp { operand, .. } => reduce_leftmost(operand, tier),
    };
    if found.is_some() {
        return found;
    }
    if tier.is_none() || tier_of(node) == tier {
        reduce_here(node)
    } else {
        None
    }
}

/// One step inside a group that has no groups left in it
fn reduce_by_precedence(node: &mut ExpressionNode) -> Option<Reduction> {
    for tier in OPERATOR_TIERS {
        if let Some(reduction) = reduce_leftmost(node, Some(tier)) {
            return Some(reduction);
        }
    }
    reduce_leftmost(node, None)
}

/// One step in the innermost, leftmost group
fn reduce_innermost_group(node: &mut ExpressionNode) -> Option<Reduction> {
    let found = match node {
        ExpressionNode::Literal { .. } => return None,
        ExpressionNode::BinaryOp { left, right, .. } => {
            reduce_innermost_group(left).or_else(|| reduce_innermost_group(right))
        }
        ExpressionNode::UnaryOp { operand, .. } => reduce_innermost_group(operand),
    };
    if found.is_some() {
        return found;
    }
    if node.is_parenthesized() {
        return reduce_by_precedence(node);
    }
    // a root's bracketed operand is a group of its own
    if let ExpressionNode::UnaryOp { operand, .. } = node {
        if !operand.is_literal() {
            return reduce_by_precedence(operand);
        }
    }
    None
}

struct Phrases {
    language: Language,
}

impl Phrases {
    fn evaluate(&self, sub: &str, value: f64) -> String {
        match self.language {
            Language::English => format!("Evaluate {} = {}", sub, format_number(value)),
            Language::Spanish => format!("Evaluar {} = {}", sub, format_number(value)),
        }
    }

    fn fallback(&self, sub: &str, fallback: DomainFallback) -> String {
        match (self.language, fallback) {
            (Language::English, DomainFallback::DivisionByZero) => {
                format!("Evaluate {}: cannot divide by zero, using 0", sub)
            }
            (Language::English, DomainFallback::NegativeRoot) => format!(
                "Evaluate {}: cannot take the square root of a negative number, using 0",
                sub
            ),
            (Language::Spanish, DomainFallback::DivisionByZero) => {
                format!("Evaluar {}: no se puede dividir entre cero, se usa 0", sub)
            }
            (Language::Spanish, DomainFallback::NegativeRoot) => format!(
                "Evaluar {}: no se puede sacar la raíz cuadrada de un número negativo, se usa 0",
                sub
            ),
        }
    }

    fn expression_now(&self, text: &str) -> String {
        match self.language {
            Language::English => format!("Expression is now: {}", text),
            Language::Spanish => format!("La expresión ahora es: {}", text),
        }
    }

    fn final_answer(&self, value: f64) -> String {
        match self.language {
            Language::English => format!("Final answer: {}", format_number(value)),
            Language::Spanish => format!("Respuesta final: {}", format_number(value)),
        }
    }
}

/// Every reduction of `node`, in the order a learner should perform them
pub fn trace_steps(node: &ExpressionNode) -> Vec<TraceStep> {
    let mut working = node.clone().with_explicit_groups();
    let mut steps = Vec::new();

    let mut record = |working: &ExpressionNode, tier: Tier, reduction: Reduction| {
        if let Some(fallback) = reduction.fallback {
            warn!("{:?} in '{}', using 0", fallback, reduction.sub_expression);
        }
        steps.push(TraceStep {
            tier,
            sub_expression: reduction.sub_expression,
            value: reduction.value,
            fallback: reduction.fallback,
            expression_after: render(working),
        });
    };

    while let Some(reduction) = reduce_innermost_group(&mut working) {
        record(&working, Tier::Parentheses, reduction);
    }
    for tier in OPERATOR_TIERS {
        while let Some(reduction) = reduce_leftmost(&mut working, Some(tier)) {
            record(&working, tier, reduction);
        }
    }
    // unreachable for trees whose groups are explicit, kept so the trace always terminates
    while !working.is_literal() {
        let tier = tier_of(&working).unwrap_or(Tier::AdditionSubtraction);
        match reduce_leftmost(&mut working, None) {
            Some(reduction) => record(&working, tier, reduction),
            None => break,
        }
    }
    steps
}

/// Value the trace ends on, rounded the same way as a problem's solution
pub fn traced_solution(node: &ExpressionNode, steps: &[TraceStep]) -> f64 {
    let raw = match (steps.last(), node.literal_value()) {
        (Some(last), _) => last.value,
        (None, Some(value)) => value,
        (None, None) => 0.0,
    };
    round_to(raw, node.implied_decimal_places())
}

/// Human-readable derivation of `node`, ending in a final-answer line
pub fn trace(node: &ExpressionNode, language: Language) -> Vec<String> {
    let phrases = Phrases { language };
    let steps = trace_steps(node);
    let mut lines = Vec::with_capacity(steps.len() * 2 + 1);
    for (i, step) in steps.iter().enumerate() {
        let line = match step.fallback {
            Some(fallback) => phrases.fallback(&step.sub_expression, fallback),
            None => phrases.evaluate(&step.sub_expression, step.value),
        };
        lines.push(line);
        if i + 1 < steps.len() {
            lines.push(phrases.expression_now(&step.expression_after));
        }
    }
    lines.push(phrases.final_answer(traced_solution(node, &steps)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::difficulty::profile_for;
    use crate::arithmetic::evaluator::{evaluate, parse_expression};
    use crate::arithmetic::expression_builder::build;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn lines(text: &str) -> Vec<String> {
        trace(&parse_expression(text).unwrap(), Language::English)
    }

    #[test]
    fn test_level_one_trace() {
        assert_eq!(
            lines("5 + 3 - 2"),
            vec![
                "Evaluate 5 + 3 = 8",
                "Expression is now: 8 - 2",
                "Evaluate 8 - 2 = 6",
                "Final answer: 6",
            ]
        );
    }

    #[test]
    fn test_parentheses_before_multiplication() {
        assert_eq!(
            lines("(5 + 3) × 2"),
            vec![
                "Evaluate (5 + 3) = 8",
                "Expression is now: 8 × 2",
                "Evaluate 8 × 2 = 16",
                "Final answer: 16",
            ]
        );
    }

    #[test]
    fn test_root_then_exponent_then_addition() {
        let node = parse_expression("√(16) + 3^2").unwrap();
        let steps = trace_steps(&node);
        let subs: Vec<&str> = steps.iter().map(|s| s.sub_expression.as_str()).collect();
        assert_eq!(subs, vec!["√16", "3^2", "4 + 9"]);
        let tiers: Vec<Tier> = steps.iter().map(|s| s.tier).collect();
        assert_eq!(
            tiers,
            vec![
                Tier::ExponentsRoots,
                Tier::ExponentsRoots,
                Tier::AdditionSubtraction
            ]
        );
        assert_eq!(
            trace(&node, Language::English).last().unwrap(),
            "Final answer: 13"
        );
    }

    #[test]
    fn test_division_by_zero_fallback() {
        let out = lines("8 ÷ 0 + 3");
        assert!(out.iter().any(|l| l.contains("cannot divide by zero, using 0")));
        assert_eq!(out.last().unwrap(), "Final answer: 3");

        let out = lines("√(2 - 6) + 1");
        assert!(
            out.iter()
                .any(|l| l.contains("cannot take the square root of a negative number, using 0"))
        );
        assert_eq!(out.last().unwrap(), "Final answer: 1");
    }

    #[test]
    fn test_spanish_phrases() {
        let out = trace(&parse_expression("(5 + 3) × 2").unwrap(), Language::Spanish);
        assert_eq!(
            out,
            vec![
                "Evaluar (5 + 3) = 8",
                "La expresión ahora es: 8 × 2",
                "Evaluar 8 × 2 = 16",
                "Respuesta final: 16",
            ]
        );
        let out = trace(&parse_expression("4 ÷ 0").unwrap(), Language::Spanish);
        assert_eq!(out[0], "Evaluar 4 ÷ 0: no se puede dividir entre cero, se usa 0");
    }

    #[test]
    fn test_group_contents_follow_precedence() {
        let node = parse_expression("10 - (2 + 3 × 4) ÷ 7").unwrap();
        let subs: Vec<String> = trace_steps(&node)
            .into_iter()
            .map(|s| s.sub_expression)
            .collect();
        assert_eq!(subs, vec!["3 × 4", "(2 + 12)", "14 ÷ 7", "10 - 2"]);
    }

    #[test]
    fn test_innermost_group_first() {
        let node = parse_expression("((1 + 2) × 3 + 1) × 2 + (4 - 1)").unwrap();
        let steps = trace_steps(&node);
        let subs: Vec<&str> = steps.iter().map(|s| s.sub_expression.as_str()).collect();
        assert_eq!(
            subs,
            vec!["(1 + 2)", "3 × 3", "(9 + 1)", "(4 - 1)", "10 × 2", "20 + 3"]
        );
        assert_eq!(steps[0].expression_after, "(3 × 3 + 1) × 2 + (4 - 1)");
    }

    #[test]
    fn test_literal_only_expression() {
        let node = ExpressionNode::integer(7);
        assert_eq!(trace(&node, Language::English), vec!["Final answer: 7"]);
    }

    #[test]
    fn test_generated_traces_are_sound() {
        for level in 1..=5 {
            let profile = profile_for(level);
            for seed in 0..300 {
                let built = build(profile, &mut StdRng::seed_from_u64(seed));
                let steps = trace_steps(&built.node);
                let tiers: Vec<Tier> = steps.iter().map(|s| s.tier).collect();
                assert!(
                    tiers.windows(2).all(|w| w[0] <= w[1]),
                    "tiers out of order for '{}': {:?}",
                    built.node,
                    tiers
                );
                let expected = round_to(evaluate(&built.node), built.node.implied_decimal_places());
                assert_relative_eq!(traced_solution(&built.node, &steps), expected);
                let out = trace(&built.node, Language::English);
                assert_eq!(
                    out.last().unwrap(),
                    &format!("Final answer: {}", format_number(expected))
                );
            }
        }
    }
}
