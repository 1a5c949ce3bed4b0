//! JSON output types for `convert --format json`.
//!
//! Field names are part of the CLI contract; bump `SCHEMA_VERSION` when
//! they change.

use formtex_session::{ConversionError, Diagnostic, LatexString};
use serde::Serialize;

pub const SCHEMA_VERSION: u32 = 1;

/// A successful conversion
#[derive(Serialize, Debug)]
pub struct ConvertJsonOutput {
    pub schema_version: u32,
    pub ok: bool,
    pub input: String,
    pub latex: String,
    /// Packages the LaTeX needs, e.g. `xcolor` for hex colors
    pub packages: Vec<String>,
    pub preview_font_size: usize,
}

impl ConvertJsonOutput {
    pub fn new(input: &str, latex: &LatexString, preview_font_size: usize) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ok: true,
            input: input.to_string(),
            latex: latex.body().to_string(),
            packages: latex.packages().to_vec(),
            preview_font_size,
        }
    }
}

/// A failed conversion
#[derive(Serialize, Debug)]
pub struct ErrorJsonOutput {
    pub schema_version: u32,
    pub ok: bool,
    pub input: String,
    pub error: ErrorJson,
}

#[derive(Serialize, Debug)]
pub struct ErrorJson {
    /// Stage that rejected the input: validation, parse, highlight
    pub stage: &'static str,
    pub message: String,
    pub resource_limit: bool,
    /// Present for validation failures; the span indexes `input` in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl ErrorJsonOutput {
    pub fn new(input: &str, err: &ConversionError) -> Self {
        let stage = match err {
            ConversionError::Invalid(_) => "validation",
            ConversionError::Parse(_) => "parse",
            ConversionError::Highlight(_) | ConversionError::InvalidSubexpression { .. } => {
                "highlight"
            }
        };
        Self {
            schema_version: SCHEMA_VERSION,
            ok: false,
            input: input.to_string(),
            error: ErrorJson {
                stage,
                message: err.to_string(),
                resource_limit: err.is_resource_limit(),
                diagnostic: err.diagnostic().cloned(),
            },
        }
    }
}
