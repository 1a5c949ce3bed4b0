//! Conversion options.
//!
//! Every switch that changes how text is read lives here and is passed in
//! explicitly. Options can be written as TOML:
//!
//! ```toml
//! mode = "formula"
//! cache = true
//! cache_capacity = 100
//!
//! [dialect]
//! allow_braces = false
//! brackets_as_parens = true
//! empty_body = "default_to_one"
//! max_input_len = 1000
//! max_nesting = 32
//! ```

use formtex_parser::Dialect;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How input text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Formula syntax, run through the full pipeline.
    #[default]
    Formula,
    /// Already LaTeX; returned as is once it passes the basic checks.
    Latex,
}

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid options: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Could not write options: {0}")]
    Write(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub mode: InputMode,
    /// Memoize results per converter.
    pub cache: bool,
    /// Most results one converter keeps; the least recently used go first.
    pub cache_capacity: usize,
    pub dialect: Dialect,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            mode: InputMode::Formula,
            cache: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            dialect: Dialect::default(),
        }
    }
}

impl ConvertOptions {
    /// Parse options from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn latex_mode() -> Self {
        Self {
            mode: InputMode::Latex,
            ..Self::default()
        }
    }
}
