#![allow(non_snake_case)]
use RustedPEMDAS::Utils::logger::init_logger;
use RustedPEMDAS::arithmetic::evaluator::evaluate_expression;
use RustedPEMDAS::arithmetic::operators::Language;
use RustedPEMDAS::arithmetic::problem::{check_answer, generate_problems};
use RustedPEMDAS::arithmetic::settings::QuizSettings;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::env;
use std::str::FromStr;
use tabled::builder::Builder;
use tabled::settings::Style;

// cargo run -- [level] [count] [seed] [language] [loglevel]
fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let level = args.first().and_then(|a| a.parse::<i64>().ok()).unwrap_or(3);
    let count = args.get(1).and_then(|a| a.parse::<usize>().ok()).unwrap_or(5);
    let seed = args.get(2).and_then(|a| a.parse::<u64>().ok()).unwrap_or(42);
    let language = args
        .get(3)
        .and_then(|a| Language::from_str(a).ok())
        .unwrap_or_default();
    let loglevel = args.get(4).map(|a| a.as_str());
    if let Err(err) = init_logger(loglevel) {
        eprintln!("{}", err);
        return;
    }

    let settings = QuizSettings {
        language,
        use_decimals: true,
        ..QuizSettings::with_difficulty(level)
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let problems = generate_problems(&settings, count, &mut rng);

    let mut builder = Builder::default();
    builder.push_record(["level", "expression", "solution", "operators", "steps"]);
    for problem in &problems {
        builder.push_record(problem.summary_row());
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    println!("{}", table);

    if let Some(problem) = problems.first() {
        println!("\n{} = ?", problem.expression_text);
        for step in &problem.steps {
            println!("  {}", step);
        }
        let typed = problem.solution.to_string();
        println!(
            "answer {} is {}",
            typed,
            if check_answer(&typed, problem.solution) { "correct" } else { "wrong" }
        );
    }

    for text in ["(5 + 3) × 2", "√16 + 3^2", "9 ÷ 0 + 2", "2 + + 3"] {
        match evaluate_expression(text) {
            Ok(value) => println!("{} = {}", text, value),
            Err(err) => println!("{}: {}", text, err),
        }
    }
}
