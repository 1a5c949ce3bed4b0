//! Highlight colors accepted in a color map.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Colors available without any package.
const BASE_COLORS: [&str; 8] = [
    "black", "blue", "cyan", "green", "magenta", "red", "white", "yellow",
];

/// Additional names that need `xcolor`.
const XCOLOR_NAMES: [&str; 11] = [
    "brown",
    "darkgray",
    "gray",
    "lightgray",
    "lime",
    "olive",
    "orange",
    "pink",
    "purple",
    "teal",
    "violet",
];

pub const XCOLOR_PACKAGE: &str = "xcolor";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a LaTeX color name or #rrggbb value")]
pub struct InvalidColor(pub String);

/// A color a subexpression can be wrapped in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// A LaTeX color name, lowercase.
    Named(String),
    /// Six uppercase hex digits, without `#`.
    Html(String),
}

impl Color {
    /// Parse `red`, `Orange` or `#ff0000`.
    pub fn parse(text: &str) -> Result<Self, InvalidColor> {
        let trimmed = text.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Ok(Color::Html(hex.to_ascii_uppercase()));
            }
            return Err(InvalidColor(text.to_string()));
        }

        let name = trimmed.to_ascii_lowercase();
        if BASE_COLORS.contains(&name.as_str()) || XCOLOR_NAMES.contains(&name.as_str()) {
            Ok(Color::Named(name))
        } else {
            Err(InvalidColor(text.to_string()))
        }
    }

    /// Package the color directive depends on, if any.
    pub fn package(&self) -> Option<&'static str> {
        match self {
            Color::Named(name) if BASE_COLORS.contains(&name.as_str()) => None,
            Color::Named(_) | Color::Html(_) => Some(XCOLOR_PACKAGE),
        }
    }

    /// Wrap already-rendered LaTeX in this color.
    pub fn wrap(&self, inner: &str) -> String {
        format!("{{{self}{{{inner}}}}}")
    }
}

impl fmt::Display for Color {
    /// The `\color` directive without its argument.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(name) => write!(f, "\\color{{{name}}}"),
            Color::Html(hex) => write!(f, "\\color[HTML]{{{hex}}}"),
        }
    }
}
