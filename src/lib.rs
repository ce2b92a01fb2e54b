// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
pub mod Utils;
pub mod arithmetic;

pub use arithmetic::difficulty::{DifficultyProfile, profile_for};
pub use arithmetic::operators::{Language, Operator};
pub use arithmetic::problem::{
    Problem, check_answer, evaluate_expression, generate_problem, generate_problems,
};
pub use arithmetic::settings::{OperatorToggles, QuizSettings};
