use std::fmt;

/// Malformed expression text handed to the evaluator from outside the builder/renderer pair
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    Empty,
    UnexpectedCharacter { position: usize, found: char },
    UnbalancedParentheses,
    TrailingInput(String),
    InvalidNumber(String),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvaluationError::Empty => write!(f, "Empty expression"),
            EvaluationError::UnexpectedCharacter { position, found } => {
                write!(f, "Unexpected character '{}' at position {}", found, position)
            }
            EvaluationError::UnbalancedParentheses => write!(f, "Unbalanced parentheses"),
            EvaluationError::TrailingInput(rest) => {
                write!(f, "Cannot compute: unexpected trailing input '{}'", rest)
            }
            EvaluationError::InvalidNumber(s) => write!(f, "Invalid number: {}", s),
        }
    }
}

impl std::error::Error for EvaluationError {}

/// Grammar invariant violated while generating a problem. A bug, not a user error.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    GoldenInvariant {
        tracked: f64,
        reevaluated: f64,
        text: String,
    },
    GrammarViolation(String),
    Unparseable(EvaluationError),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GenerationError::GoldenInvariant {
                tracked,
                reevaluated,
                text,
            } => write!(
                f,
                "Tracked value {} disagrees with re-evaluated value {} for '{}'",
                tracked, reevaluated, text
            ),
            GenerationError::GrammarViolation(msg) => write!(f, "Grammar violation: {}", msg),
            GenerationError::Unparseable(err) => {
                write!(f, "Rendered expression does not parse back: {}", err)
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<EvaluationError> for GenerationError {
    fn from(err: EvaluationError) -> Self {
        GenerationError::Unparseable(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    Toml(String),
    UnknownKey(String),
    InvalidValue { key: String, value: String },
    Io(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SettingsError::Toml(msg) => write!(f, "Settings are not valid TOML: {}", msg),
            SettingsError::UnknownKey(key) => write!(f, "Unknown settings key: {}", key),
            SettingsError::InvalidValue { key, value } => {
                write!(f, "Invalid value '{}' for settings key '{}'", value, key)
            }
            SettingsError::Io(msg) => write!(f, "Cannot read settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for SettingsError {
    fn from(err: toml::de::Error) -> Self {
        SettingsError::Toml(err.to_string())
    }
}
