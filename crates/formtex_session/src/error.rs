use formtex_formatter::HighlightError;
use formtex_parser::{Diagnostic, FormulaError, ParseError};
use thiserror::Error;

/// Why a conversion produced no LaTeX.
///
/// Structural diagnostics and builder errors stay separate variants; a
/// caller can always tell which stage rejected the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Invalid formula: {0}")]
    Invalid(Diagnostic),

    #[error("Could not parse formula: {0}")]
    Parse(ParseError),

    #[error(transparent)]
    Highlight(#[from] HighlightError),

    #[error("Cannot highlight '{key}': {reason}")]
    InvalidSubexpression { key: String, reason: String },
}

impl ConversionError {
    /// Span-carrying diagnostic, for validation failures.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ConversionError::Invalid(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_resource_limit(&self) -> bool {
        match self {
            ConversionError::Invalid(d) => d.kind.is_resource_limit(),
            ConversionError::Parse(e) => e.is_resource_limit(),
            _ => false,
        }
    }
}

impl From<FormulaError> for ConversionError {
    fn from(err: FormulaError) -> Self {
        match err {
            FormulaError::Invalid(d) => ConversionError::Invalid(d),
            FormulaError::Parse(e) => ConversionError::Parse(e),
        }
    }
}

impl From<Diagnostic> for ConversionError {
    fn from(d: Diagnostic) -> Self {
        ConversionError::Invalid(d)
    }
}
