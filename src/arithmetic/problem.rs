//! # Problem generation and grading
//!
//! The quiz-facing surface of the engine:
//! - [`generate_problem`] builds, renders, cross-checks and traces one expression
//! - [`check_answer`] grades a learner's typed answer
//! - [`evaluate_expression`] evaluates arbitrary expression text (re-exported from the evaluator)
//!
//! Every generated problem satisfies the golden invariant: the value tracked by the builder and the
//! value obtained by re-evaluating the rendered text agree within 1e-2. A problem that fails it (or
//! breaks the grammar of its profile) is a bug; debug builds stop on it, release builds log it and
//! generate again.
use crate::arithmetic::difficulty::{DifficultyProfile, profile_for};
use crate::arithmetic::errors::GenerationError;
use crate::arithmetic::expression::{ExpressionNode, format_number, render, round_to};
use crate::arithmetic::expression_builder::{build, check_grammar};
use crate::arithmetic::operators::{BinaryOperator, Language, Operator};
use crate::arithmetic::settings::QuizSettings;
use crate::arithmetic::step_tracer::trace;
use crate::arithmetic::term_generator::whole_term;
use itertools::Itertools;
use log::{error, info};
use rand::Rng;
use std::collections::BTreeSet;

pub use crate::arithmetic::evaluator::evaluate_expression;

/// |re-evaluated − solution| must stay below this
pub const GOLDEN_TOLERANCE: f64 = 1e-2;
/// Absolute tolerance when grading a typed answer
pub const ANSWER_TOLERANCE: f64 = 1e-3;
const MAX_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub expression: ExpressionNode,
    pub expression_text: String,
    pub solution: f64,
    pub steps: Vec<String>,
    pub used_operators: BTreeSet<Operator>,
    pub has_parentheses: bool,
    pub has_exponents: bool,
    pub difficulty_level: u8,
}

impl Problem {
    /// Cells for a one-line tabular summary: level, expression, solution, operators, step count
    pub fn summary_row(&self) -> Vec<String> {
        vec![
            self.difficulty_level.to_string(),
            self.expression_text.clone(),
            format_number(self.solution),
            self.used_operators.iter().map(|op| op.to_string()).join(" "),
            self.steps.len().to_string(),
        ]
    }

    pub fn check(&self, user_answer: &str) -> bool {
        check_answer(user_answer, self.solution)
    }
}

/// Exact solution of a tree: its value rounded to the decimal places its operands imply
pub fn solution_for(node: &ExpressionNode) -> f64 {
    round_to(
        crate::arithmetic::evaluator::evaluate(node),
        node.implied_decimal_places(),
    )
}

fn assemble(
    node: ExpressionNode,
    tracked_value: f64,
    level: u8,
    language: Language,
) -> Result<Problem, GenerationError> {
    let expression_text = render(&node);
    let solution = round_to(tracked_value, node.implied_decimal_places());
    let reevaluated = evaluate_expression(&expression_text)?;
    if (reevaluated - solution).abs() >= GOLDEN_TOLERANCE {
        return Err(GenerationError::GoldenInvariant {
            tracked: solution,
            reevaluated,
            text: expression_text,
        });
    }
    let used_operators = node.used_operators();
    Ok(Problem {
        steps: trace(&node, language),
        has_parentheses: used_operators.contains(&Operator::Parentheses),
        has_exponents: used_operators.contains(&Operator::Exponent),
        used_operators,
        difficulty_level: level,
        expression_text,
        solution,
        expression: node,
    })
}

/// One generation attempt; any error is a violated invariant
pub fn try_generate_problem<R: Rng + ?Sized>(
    settings: &QuizSettings,
    rng: &mut R,
) -> Result<Problem, GenerationError> {
    let profile: DifficultyProfile = profile_for(settings.difficulty as i64).narrowed_by(settings);
    let built = build(&profile, rng);
    check_grammar(&built.node, &profile)?;
    assemble(built.node, built.value, profile.level, settings.language)
}

/// `a + b` with small whole numbers; valid at every level
fn fallback_problem<R: Rng + ?Sized>(settings: &QuizSettings, rng: &mut R) -> Problem {
    let profile = profile_for(settings.difficulty as i64);
    let high = profile.max_magnitude as i64;
    let (a, b) = (whole_term(rng, 1, high), whole_term(rng, 1, high));
    let value = a.literal_value().unwrap_or(0.0) + b.literal_value().unwrap_or(0.0);
    let node = ExpressionNode::binary(BinaryOperator::Add, a, b);
    let expression_text = render(&node);
    let used_operators = node.used_operators();
    Problem {
        steps: trace(&node, settings.language),
        expression: node,
        expression_text,
        solution: value,
        used_operators,
        has_parentheses: false,
        has_exponents: false,
        difficulty_level: profile.level,
    }
}

/// A fresh problem for one quiz round
pub fn generate_problem<R: Rng + ?Sized>(settings: &QuizSettings, rng: &mut R) -> Problem {
    for attempt in 1..=MAX_ATTEMPTS {
        match try_generate_problem(settings, rng) {
            Ok(problem) => {
                info!(
                    "level {} problem: {} = {}",
                    problem.difficulty_level,
                    problem.expression_text,
                    format_number(problem.solution)
                );
                return problem;
            }
            Err(err) => {
                error!("generation attempt {} failed: {}", attempt, err);
                debug_assert!(false, "generation invariant violated: {}", err);
            }
        }
    }
    fallback_problem(settings, rng)
}

/// Several problems from one random stream
pub fn generate_problems<R: Rng + ?Sized>(
    settings: &QuizSettings,
    count: usize,
    rng: &mut R,
) -> Vec<Problem> {
    (0..count).map(|_| generate_problem(settings, rng)).collect()
}

/// `6,5` read as `6.5`. A comma is only a decimal separator when it is the sole separator and
/// is followed by one or two digits; `1,000` or `1.000,5` are not numbers.
fn normalize_decimal_comma(text: &str) -> Option<String> {
    if !text.contains(',') {
        return Some(text.to_string());
    }
    let (whole, fraction) = text.split_once(',')?;
    let plain_fraction = (1..=2).contains(&fraction.len())
        && fraction.chars().all(|c| c.is_ascii_digit());
    if whole.contains('.') || !plain_fraction {
        return None;
    }
    Some(format!("{}.{}", whole, fraction))
}

/// Grade a typed answer. Unparsable or non-finite input is simply wrong.
/// A decimal comma is accepted as well as a decimal point.
pub fn check_answer(user_answer: &str, solution: f64) -> bool {
    let Some(normalized) = normalize_decimal_comma(user_answer.trim()) else {
        return false;
    };
    match normalized.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => (parsed - solution).abs() < ANSWER_TOLERANCE,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::evaluator::parse_expression;
    use crate::arithmetic::settings::OperatorToggles;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_check_answer_tolerance() {
        assert!(check_answer("6.0001", 6.0));
        assert!(check_answer("6", 6.0));
        assert!(check_answer("  6  ", 6.0));
        assert!(!check_answer("6", 6.004));
        assert!(!check_answer("6.01", 6.0));
        assert!(check_answer("-12.25", -12.25));
        assert!(check_answer("2,5", 2.5));
    }

    #[test]
    fn test_check_answer_decimal_comma() {
        assert!(check_answer("6,5", 6.5));
        assert!(check_answer("-3,25", -3.25));
        assert!(!check_answer("1,000", 1.0));
        assert!(!check_answer("1,000", 1000.0));
        assert!(!check_answer("1.000,5", 1000.5));
        assert!(!check_answer("1,2,3", 1.2));
        assert!(!check_answer("6,", 6.0));
    }

    #[test]
    fn test_check_answer_rejects_garbage() {
        assert!(!check_answer("", 0.0));
        assert!(!check_answer("six", 6.0));
        assert!(!check_answer("6 apples", 6.0));
        assert!(!check_answer("NaN", 0.0));
        assert!(!check_answer("inf", f64::INFINITY));
    }

    #[test]
    fn test_golden_invariant_all_levels() {
        for level in 1..=5 {
            let settings = QuizSettings {
                difficulty: level,
                use_decimals: true,
                ..QuizSettings::default()
            };
            for seed in 0..200 {
                let mut rng = StdRng::seed_from_u64(seed);
                let p = generate_problem(&settings, &mut rng);
                let reevaluated = evaluate_expression(&p.expression_text).unwrap();
                assert!((reevaluated - p.solution).abs() < GOLDEN_TOLERANCE);
                assert_eq!(p.difficulty_level, level);
                assert!(p.check(&format_number(p.solution)));
            }
        }
    }

    #[test]
    fn test_grammar_conformance_through_settings() {
        for level in 1..=5u8 {
            let settings = QuizSettings::with_difficulty(level as i64);
            let profile = profile_for(level as i64);
            for seed in 0..200 {
                let p = generate_problem(&settings, &mut StdRng::seed_from_u64(seed));
                assert!(p.used_operators.is_subset(&profile.allowed_operators));
                assert!(p.expression.nesting_depth() <= profile.max_nesting_depth);
                assert!(p.expression.max_chain_terms() <= profile.max_terms);
                assert_eq!(p.has_parentheses, p.used_operators.contains(&Operator::Parentheses));
                assert_eq!(p.has_exponents, p.used_operators.contains(&Operator::Exponent));
            }
        }
    }

    #[test]
    fn test_trace_ends_on_solution() {
        let settings = QuizSettings::with_difficulty(5);
        for seed in 0..200 {
            let p = generate_problem(&settings, &mut StdRng::seed_from_u64(seed));
            let last = p.steps.last().unwrap();
            let stated = last.trim_start_matches("Final answer: ").parse::<f64>().unwrap();
            assert!((stated - p.solution).abs() < GOLDEN_TOLERANCE, "{}", last);
        }
    }

    #[test]
    fn test_problem_is_reproducible() {
        let settings = QuizSettings::with_difficulty(4);
        let a = generate_problems(&settings, 5, &mut StdRng::seed_from_u64(77));
        let b = generate_problems(&settings, 5, &mut StdRng::seed_from_u64(77));
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_settings_language_and_toggles() {
        let settings = QuizSettings {
            difficulty: 3,
            language: Language::Spanish,
            operators_to_include: OperatorToggles {
                parentheses: false,
                exponents: false,
                ..OperatorToggles::default()
            },
            ..QuizSettings::default()
        };
        for seed in 0..100 {
            let p = generate_problem(&settings, &mut StdRng::seed_from_u64(seed));
            assert!(!p.has_parentheses);
            assert!(!p.has_exponents);
            assert!(p.steps.last().unwrap().starts_with("Respuesta final: "));
        }
    }

    #[test]
    fn test_no_brackets_when_parentheses_are_off() {
        for level in 1..=5u8 {
            let settings = QuizSettings {
                difficulty: level,
                use_decimals: true,
                operators_to_include: OperatorToggles {
                    parentheses: false,
                    ..OperatorToggles::default()
                },
                ..QuizSettings::default()
            };
            let profile = profile_for(level as i64).narrowed_by(&settings);
            assert!(!profile.allows(Operator::Parentheses));
            for seed in 0..200 {
                let p = generate_problem(&settings, &mut StdRng::seed_from_u64(seed));
                assert!(!p.expression_text.contains('('), "{}", p.expression_text);
                assert!(!p.has_parentheses);
            }
        }
    }

    #[test]
    fn test_solution_for_scenarios() {
        assert_relative_eq!(solution_for(&parse_expression("5 + 3 - 2").unwrap()), 6.0);
        assert_relative_eq!(solution_for(&parse_expression("(5 + 3) × 2").unwrap()), 16.0);
        assert_relative_eq!(solution_for(&parse_expression("√(16) + 3^2").unwrap()), 13.0);
        assert_relative_eq!(solution_for(&parse_expression("9 ÷ 0 + 2").unwrap()), 2.0);
        assert_relative_eq!(solution_for(&parse_expression("0.1 + 0.2").unwrap()), 0.3);
        assert_relative_eq!(solution_for(&parse_expression("10 ÷ 3").unwrap()), 3.33);
    }

    #[test]
    fn test_summary_row() {
        let settings = QuizSettings::with_difficulty(1);
        let p = generate_problem(&settings, &mut StdRng::seed_from_u64(1));
        let row = p.summary_row();
        assert_eq!(row.len(), 5);
        assert_eq!(row[0], "1");
        assert_eq!(row[1], p.expression_text);
        assert_eq!(row[4], p.steps.len().to_string());
    }
}
