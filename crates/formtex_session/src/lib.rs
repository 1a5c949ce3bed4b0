//! Conversion facade for formtex.
//!
//! [`convert`] is the whole pipeline behind one call: validate, normalize,
//! resolve, build and render, with optional subexpression coloring. A
//! [`Converter`] fixes the [`ConvertOptions`] and memoizes results in a
//! concurrent map.

pub mod convert;
pub mod edit;
pub mod error;
pub mod options;

pub use convert::{convert, convert_with, ColorMap, ConversionResult, Converter};
pub use edit::{attach_subscript, EditError};
pub use error::ConversionError;
pub use options::{ConfigError, ConvertOptions, InputMode, DEFAULT_CACHE_CAPACITY};

pub use formtex_formatter::{preview_font_size, strip_preamble, LatexString};
pub use formtex_parser::{latex_to_formula, Diagnostic, DiagnosticKind, ParseError};
