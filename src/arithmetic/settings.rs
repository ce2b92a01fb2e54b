//! Quiz settings supplied by the surrounding application.
//!
//! A settings document is plain TOML:
//! ```toml
//! difficulty = 3
//! use_decimals = false
//! language = "spanish"
//!
//! [operators]
//! addition = true
//! division = false
//! roots = false
//! ```
//! Missing keys keep their defaults, unknown keys are an error.
use crate::arithmetic::difficulty::{MAX_LEVEL, MIN_LEVEL};
use crate::arithmetic::errors::SettingsError;
use crate::arithmetic::operators::{Language, Operator};
use std::path::Path;
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorToggles {
    pub addition: bool,
    pub subtraction: bool,
    pub multiplication: bool,
    pub division: bool,
    pub exponents: bool,
    pub parentheses: bool,
    pub roots: bool,
}

impl Default for OperatorToggles {
    fn default() -> Self {
        OperatorToggles {
            addition: true,
            subtraction: true,
            multiplication: true,
            division: true,
            exponents: true,
            parentheses: true,
            roots: true,
        }
    }
}

impl OperatorToggles {
    pub fn includes(&self, op: Operator) -> bool {
        match op {
            Operator::Addition => self.addition,
            Operator::Subtraction => self.subtraction,
            Operator::Multiplication => self.multiplication,
            Operator::Division => self.division,
            Operator::Exponent => self.exponents,
            Operator::Parentheses => self.parentheses,
            Operator::Root => self.roots,
        }
    }

    fn toggle_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "addition" => Some(&mut self.addition),
            "subtraction" => Some(&mut self.subtraction),
            "multiplication" => Some(&mut self.multiplication),
            "division" => Some(&mut self.division),
            "exponents" => Some(&mut self.exponents),
            "parentheses" => Some(&mut self.parentheses),
            "roots" => Some(&mut self.roots),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizSettings {
    /// 1..=5
    pub difficulty: u8,
    pub operators_to_include: OperatorToggles,
    pub use_decimals: bool,
    pub language: Language,
}

impl Default for QuizSettings {
    fn default() -> Self {
        QuizSettings {
            difficulty: MIN_LEVEL,
            operators_to_include: OperatorToggles::default(),
            use_decimals: false,
            language: Language::English,
        }
    }
}

fn invalid(key: &str, value: &Value) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool, SettingsError> {
    value.as_bool().ok_or_else(|| invalid(key, value))
}

impl QuizSettings {
    pub fn with_difficulty(difficulty: i64) -> Self {
        QuizSettings {
            difficulty: difficulty.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8,
            ..QuizSettings::default()
        }
    }

    pub fn from_toml_str(document: &str) -> Result<Self, SettingsError> {
        let table: Table = document.parse::<Table>()?;
        let mut settings = QuizSettings::default();
        for (key, value) in table.iter() {
            match key.as_str() {
                "difficulty" => {
                    let level = value.as_integer().ok_or_else(|| invalid(key, value))?;
                    settings.difficulty = level.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8;
                }
                "use_decimals" => settings.use_decimals = expect_bool(key, value)?,
                "language" => {
                    let name = value.as_str().ok_or_else(|| invalid(key, value))?;
                    settings.language =
                        Language::from_str(name.trim()).map_err(|_| invalid(key, value))?;
                }
                "operators" => {
                    let operators = value.as_table().ok_or_else(|| invalid(key, value))?;
                    for (op_key, op_value) in operators.iter() {
                        let toggle = settings
                            .operators_to_include
                            .toggle_mut(op_key)
                            .ok_or_else(|| SettingsError::UnknownKey(format!("operators.{}", op_key)))?;
                        *toggle = expect_bool(op_key, op_value)?;
                    }
                }
                other => return Err(SettingsError::UnknownKey(other.to_string())),
            }
        }
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let document = std::fs::read_to_string(path)?;
        Self::from_toml_str(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = QuizSettings::default();
        assert_eq!(settings.difficulty, 1);
        assert_eq!(settings.language, Language::English);
        assert!(!settings.use_decimals);
        assert!(settings.operators_to_include.includes(Operator::Root));
    }

    #[test]
    fn test_parse_full_document() {
        let doc = r#"
            difficulty = 4
            use_decimals = true
            language = "Spanish"

            [operators]
            division = false
            roots = false
        "#;
        let settings = QuizSettings::from_toml_str(doc).unwrap();
        assert_eq!(settings.difficulty, 4);
        assert!(settings.use_decimals);
        assert_eq!(settings.language, Language::Spanish);
        assert!(!settings.operators_to_include.division);
        assert!(!settings.operators_to_include.roots);
        assert!(settings.operators_to_include.addition);
    }

    #[test]
    fn test_difficulty_is_clamped() {
        let settings = QuizSettings::from_toml_str("difficulty = 42").unwrap();
        assert_eq!(settings.difficulty, 5);
        let settings = QuizSettings::from_toml_str("difficulty = -1").unwrap();
        assert_eq!(settings.difficulty, 1);
        assert_eq!(QuizSettings::with_difficulty(9).difficulty, 5);
    }

    #[test]
    fn test_rejects_unknown_and_invalid() {
        assert_eq!(
            QuizSettings::from_toml_str("colour = \"red\""),
            Err(SettingsError::UnknownKey("colour".to_string()))
        );
        assert!(matches!(
            QuizSettings::from_toml_str("[operators]\nmodulo = true"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            QuizSettings::from_toml_str("language = \"latin\""),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            QuizSettings::from_toml_str("use_decimals = 3"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            QuizSettings::from_toml_str("difficulty = "),
            Err(SettingsError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "difficulty = 2\nlanguage = \"es\"").unwrap();
        let settings = QuizSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.difficulty, 2);
        assert_eq!(settings.language, Language::Spanish);

        let missing = QuizSettings::from_file("/definitely/not/here.toml");
        assert!(matches!(missing, Err(SettingsError::Io(_))));
    }
}
