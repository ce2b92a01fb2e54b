//! Operator vocabulary shared by the profile table, the tree and the settings.
//!
//! `Operator` is what a difficulty profile allows and what a `Problem` reports as used.
//! `BinaryOperator` and `UnaryOperator` are what the tree actually stores, so a node can never
//! hold "parentheses" as if it were an arithmetic operation.
use strum_macros::{Display, EnumIter, EnumString};

/// What a difficulty level allows and what a problem reports as used
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Operator {
    #[strum(to_string = "+")]
    Addition,
    #[strum(to_string = "-")]
    Subtraction,
    #[strum(to_string = "×")]
    Multiplication,
    #[strum(to_string = "÷")]
    Division,
    #[strum(to_string = "^")]
    Exponent,
    #[strum(to_string = "()")]
    Parentheses,
    #[strum(to_string = "√")]
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum BinaryOperator {
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "×")]
    Mul,
    #[strum(to_string = "÷")]
    Div,
    #[strum(to_string = "^")]
    Pow,
}

impl BinaryOperator {
    pub fn as_operator(&self) -> Operator {
        match self {
            BinaryOperator::Add => Operator::Addition,
            BinaryOperator::Sub => Operator::Subtraction,
            BinaryOperator::Mul => Operator::Multiplication,
            BinaryOperator::Div => Operator::Division,
            BinaryOperator::Pow => Operator::Exponent,
        }
    }

    /// `None` for the two operators that are not binary arithmetic
    pub fn from_operator(op: Operator) -> Option<BinaryOperator> {
        match op {
            Operator::Addition => Some(BinaryOperator::Add),
            Operator::Subtraction => Some(BinaryOperator::Sub),
            Operator::Multiplication => Some(BinaryOperator::Mul),
            Operator::Division => Some(BinaryOperator::Div),
            Operator::Exponent => Some(BinaryOperator::Pow),
            Operator::Parentheses | Operator::Root => None,
        }
    }

    pub fn is_additive(&self) -> bool {
        matches!(self, BinaryOperator::Add | BinaryOperator::Sub)
    }

    pub fn is_multiplicative(&self) -> bool {
        matches!(self, BinaryOperator::Mul | BinaryOperator::Div)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum UnaryOperator {
    #[strum(to_string = "√")]
    Sqrt,
}

impl UnaryOperator {
    pub fn as_operator(&self) -> Operator {
        match self {
            UnaryOperator::Sqrt => Operator::Root,
        }
    }
}

/// Language of the step trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Language {
    #[default]
    #[strum(to_string = "english", serialize = "en")]
    English,
    #[strum(to_string = "spanish", serialize = "es")]
    Spanish,
}
