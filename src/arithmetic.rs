#![allow(non_snake_case)]
/// the operator vocabulary: `+ - × ÷ ^ () √`, the binary and unary operators of the tree and the
/// language of step messages
pub mod operators;
/// errors of evaluation, generation and settings loading
pub mod errors;
/// the fixed table of five difficulty levels and its narrowing by quiz settings
pub mod difficulty;
/// quiz settings: difficulty, operator toggles, decimals, language. Loaded from TOML
pub mod settings;
///____________________________________________________________________________________________________________________________
/// # Expression tree
/// a module
/// 1) holds the single expression tree used by the builder, the evaluator and the step tracer
/// 2) renders a tree to its canonical text
/// 3) measures a tree: nesting depth, terms per chain, used operators, implied decimal places
///# Example#
/// ```
/// use RustedPEMDAS::arithmetic::evaluator::parse_expression;
/// use RustedPEMDAS::arithmetic::expression::render;
/// let tree = parse_expression("(5+3)*2").unwrap();
/// assert_eq!(render(&tree), "(5 + 3) × 2");
/// assert_eq!(tree.nesting_depth(), 1);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod expression;
/// parses and evaluates expression text with the usual precedence: roots and powers, then × ÷, then + −.
/// Division by zero and roots of negative numbers give 0
///# Example
/// ```
/// use RustedPEMDAS::arithmetic::evaluator::evaluate_expression;
/// assert_eq!(evaluate_expression("√16 + 3^2").unwrap(), 13.0);
/// assert_eq!(evaluate_expression("9 ÷ 0 + 2").unwrap(), 2.0);
/// ```
pub mod evaluator;
/// random literals: integers, one-decimal numbers, negatives, perfect squares, exact small divisors
pub mod term_generator;
/// random expression trees that obey a difficulty profile and keep every intermediate value exact
pub mod expression_builder;
/// order-of-operations walkthrough of a tree, one reduction per step
pub mod step_tracer;
///____________________________________________________________________________________________________________________________
/// # Problems
/// generate a problem, check an answer
///# Example#
/// ```
/// use RustedPEMDAS::arithmetic::problem::{check_answer, generate_problem};
/// use RustedPEMDAS::arithmetic::settings::QuizSettings;
/// use rand::SeedableRng;
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let problem = generate_problem(&QuizSettings::with_difficulty(3), &mut rng);
/// println!("{} = ?", problem.expression_text);
/// for step in &problem.steps {
///     println!("{}", step);
/// }
/// assert!(check_answer(&problem.solution.to_string(), problem.solution));
/// ```
pub mod problem;
