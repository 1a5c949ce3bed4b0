use crate::diagnostic::Diagnostic;
use thiserror::Error;

/// Failure reported by the expression builder.
///
/// Carries a message but no reliable span: by the time text reaches the
/// builder it has been normalized, so offsets no longer match the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    Syntax(String),
    #[error("Unconsumed input: {0}")]
    UnconsumedInput(String),
    #[error("Empty expression")]
    EmptyExpression,
    #[error("Undeclared name '{0}'")]
    UndeclaredName(String),
    #[error("'{0}' must be called with arguments")]
    BareFunction(String),
    #[error("'{0}' is not a function")]
    NotCallable(String),
    #[error("{name} expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("Invalid argument to {name}: {reason}")]
    InvalidArgument { name: String, reason: String },
    #[error("Expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

impl ParseError {
    /// True for rejections caused by a resource bound rather than bad syntax.
    pub fn is_resource_limit(&self) -> bool {
        matches!(self, ParseError::TooDeep { .. })
    }
}

/// Failure of the whole text → tree pipeline, keeping the two channels apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    /// Structural defect found before building; the span points into the input.
    #[error("Invalid formula: {0}")]
    Invalid(#[from] Diagnostic),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
