use query_structure::InputError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryLanguageError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryLanguageError {
    #[error("Failed to tokenize '{input}'.\n\n{}", .errors.join("\n"))]
    Lexical { input: String, errors: Vec<String> },

    #[error("Failed to parse '{input}'.\n\n{}", .errors.join("\n"))]
    Syntax { input: String, errors: Vec<String> },

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("{0}")]
    Binding(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Failed to serialize reference constraints: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for QueryLanguageError {
    fn from(err: serde_json::Error) -> Self {
        QueryLanguageError::Serialization(err.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Undefined variable ${0}.")]
    UndefinedVariable(String),

    #[error(
        "The variable ${name} resolved to a dimension which exists but contains {count} values. It has to contain \
         exactly one. Perhaps you forgot to set the 'maxItems' prop of your DimensionsSwitcher?"
    )]
    AmbiguousDimension { name: String, count: usize },

    #[error("Undefined dimension '{0}'")]
    UndefinedDimension(String),
}
