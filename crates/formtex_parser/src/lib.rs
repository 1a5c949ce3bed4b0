//! Formula text → expression tree.
//!
//! The pipeline runs in a fixed order: [`validate`] the raw text, then
//! [`normalize`] it, [`resolve`] its free symbols and [`build`] the tree.
//! [`parse_formula`] runs all four stages.

pub mod dialect;
pub mod diagnostic;
pub mod error;
pub mod latex_sync;
pub mod normalize;
pub mod parser;
pub mod resolve;
pub mod validate;

pub use dialect::{Dialect, EmptyBodyPolicy};
pub use diagnostic::{Diagnostic, DiagnosticKind, Imbalance};
pub use error::{FormulaError, ParseError};
pub use latex_sync::latex_to_formula;
pub use normalize::{normalize, NormalizedText};
pub use parser::{build, build_with_limit, ParsedFormula, DEFAULT_MAX_DEPTH};
pub use resolve::resolve;
pub use validate::{validate, validate_latex};

/// Validate, normalize, resolve and build `text`.
///
/// Validation failures stop the pipeline before anything is built.
pub fn parse_formula(text: &str, dialect: &Dialect) -> Result<ParsedFormula, FormulaError> {
    validate(text, dialect)?;
    let normalized = normalize(text, dialect);
    let symbols = resolve(&normalized);
    Ok(build_with_limit(&normalized, symbols, dialect.max_tree_depth)?)
}
