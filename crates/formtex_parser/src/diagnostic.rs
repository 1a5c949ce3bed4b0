//! Structural diagnostics produced by the validator.

use formtex_ast::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of a delimiter pair is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Imbalance {
    ExtraClosing,
    Unclosed,
}

/// Defect class of a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    EmptyFormula,
    InputTooLong { limit: usize },
    TrailingOperator,
    IncompleteFunctionCall { name: String },
    BracesNotAllowed,
    UnbalancedParentheses { imbalance: Imbalance },
    UnbalancedBrackets { imbalance: Imbalance },
    UnbalancedBraces { imbalance: Imbalance },
    NestingTooDeep { limit: usize },
    ConsecutiveCommas,
    EmptyArgument,
    MissingCalculusArgument { construct: String },
    InvalidSubscript,
}

impl DiagnosticKind {
    /// Input too long or nested too deep, as opposed to malformed.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::InputTooLong { .. } | DiagnosticKind::NestingTooDeep { .. }
        )
    }
}

/// A structural defect with the exact input range to highlight.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (at {span})")]
pub struct Diagnostic {
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// The highlighted part of `text`, the string the diagnostic was made for.
    pub fn highlighted<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.span.slice(text)
    }
}
