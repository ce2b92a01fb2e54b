//! Five immutable difficulty profiles bounding what the expression builder may produce.
//!
//! Level 1 is addition/subtraction only; every later level keeps what the previous one had and
//! adds to it. Levels outside 1..=5 are clamped, never rejected.
use crate::arithmetic::operators::Operator;
use crate::arithmetic::settings::QuizSettings;
use log::warn;
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyProfile {
    pub level: u8,
    pub allowed_operators: BTreeSet<Operator>,
    pub max_terms: usize,
    pub max_nesting_depth: usize,
    pub can_use_decimals: bool,
    pub can_use_negatives: bool,
    pub can_use_exponents: bool,
    pub can_use_roots: bool,
    pub max_magnitude: u32,
}

static PROFILES: OnceLock<Vec<DifficultyProfile>> = OnceLock::new();

fn build_table() -> Vec<DifficultyProfile> {
    use Operator::*;
    let ops = |list: &[Operator]| list.iter().copied().collect::<BTreeSet<Operator>>();
    vec![
        DifficultyProfile {
            level: 1,
            allowed_operators: ops(&[Addition, Subtraction]),
            max_terms: 3,
            max_nesting_depth: 0,
            can_use_decimals: false,
            can_use_negatives: false,
            can_use_exponents: false,
            can_use_roots: false,
            max_magnitude: 10,
        },
        DifficultyProfile {
            level: 2,
            allowed_operators: ops(&[Addition, Subtraction, Multiplication, Division]),
            max_terms: 4,
            max_nesting_depth: 0,
            can_use_decimals: false,
            can_use_negatives: false,
            can_use_exponents: false,
            can_use_roots: false,
            max_magnitude: 12,
        },
        DifficultyProfile {
            level: 3,
            allowed_operators: ops(&[
                Addition,
                Subtraction,
                Multiplication,
                Division,
                Exponent,
                Parentheses,
            ]),
            max_terms: 5,
            max_nesting_depth: 1,
            can_use_decimals: false,
            can_use_negatives: false,
            can_use_exponents: true,
            can_use_roots: false,
            max_magnitude: 15,
        },
        DifficultyProfile {
            level: 4,
            allowed_operators: ops(&[
                Addition,
                Subtraction,
                Multiplication,
                Division,
                Exponent,
                Parentheses,
            ]),
            max_terms: 6,
            max_nesting_depth: 2,
            can_use_decimals: true,
            can_use_negatives: true,
            can_use_exponents: true,
            can_use_roots: false,
            max_magnitude: 20,
        },
        DifficultyProfile {
            level: 5,
            allowed_operators: ops(&[
                Addition,
                Subtraction,
                Multiplication,
                Division,
                Exponent,
                Parentheses,
                Root,
            ]),
            max_terms: 7,
            max_nesting_depth: 3,
            can_use_decimals: true,
            can_use_negatives: true,
            can_use_exponents: true,
            can_use_roots: true,
            max_magnitude: 25,
        },
    ]
}

/// Profile for a level; out-of-range levels are clamped to 1..=5
pub fn profile_for(level: i64) -> &'static DifficultyProfile {
    let table = PROFILES.get_or_init(build_table);
    let clamped = level.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as usize;
    &table[clamped - 1]
}

impl DifficultyProfile {
    pub fn allows(&self, op: Operator) -> bool {
        self.allowed_operators.contains(&op)
    }

    /// `^` is level gated from 3 on
    pub fn exponents_enabled(&self) -> bool {
        self.can_use_exponents && self.level >= 3 && self.allows(Operator::Exponent)
    }

    /// `√` only exists at level 5
    pub fn roots_enabled(&self) -> bool {
        self.can_use_roots && self.level >= 5 && self.allows(Operator::Root)
    }

    pub fn parentheses_enabled(&self) -> bool {
        self.allows(Operator::Parentheses) && self.max_nesting_depth > 0
    }

    /// The profile with the settings' operator toggles and decimal switch applied.
    /// Settings can only take permissions away, never add them. Without parentheses there is
    /// no nesting and no negative literal.
    pub fn narrowed_by(&self, settings: &QuizSettings) -> DifficultyProfile {
        let toggles = &settings.operators_to_include;
        let mut allowed: BTreeSet<Operator> = self
            .allowed_operators
            .iter()
            .copied()
            .filter(|op| toggles.includes(*op))
            .collect();

        let has_chain_operator = allowed.iter().any(|op| {
            matches!(
                op,
                Operator::Addition
                    | Operator::Subtraction
                    | Operator::Multiplication
                    | Operator::Division
            )
        });
        if !has_chain_operator {
            warn!(
                "settings leave level {} without arithmetic operators, falling back to + and -",
                self.level
            );
            allowed.insert(Operator::Addition);
            allowed.insert(Operator::Subtraction);
        }

        let parentheses = allowed.contains(&Operator::Parentheses);
        DifficultyProfile {
            level: self.level,
            max_terms: self.max_terms,
            max_nesting_depth: if parentheses { self.max_nesting_depth } else { 0 },
            can_use_decimals: self.can_use_decimals && settings.use_decimals,
            // a negative literal is always written as `(-n)`
            can_use_negatives: self.can_use_negatives && parentheses,
            can_use_exponents: self.can_use_exponents && allowed.contains(&Operator::Exponent),
            can_use_roots: self.can_use_roots && allowed.contains(&Operator::Root),
            max_magnitude: self.max_magnitude,
            allowed_operators: allowed,
        }
    }
}
