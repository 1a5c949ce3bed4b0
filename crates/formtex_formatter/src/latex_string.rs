//! Rendered output with its package side channel.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_PREAMBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\\usepackage\{[^{}]*\}\s*)+").expect("valid regex literal")
});

/// Math-mode LaTeX (no `$` delimiters) plus the packages it needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatexString {
    body: String,
    packages: Vec<String>,
}

impl LatexString {
    /// Packages are sorted and deduplicated.
    pub fn new<I, S>(body: impl Into<String>, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut packages: Vec<String> = packages.into_iter().map(Into::into).collect();
        packages.sort();
        packages.dedup();
        Self {
            body: body.into(),
            packages,
        }
    }

    /// A string that needs no packages.
    pub fn plain(body: impl Into<String>) -> Self {
        Self::new(body, Vec::<String>::new())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn needs_packages(&self) -> bool {
        !self.packages.is_empty()
    }

    /// `\usepackage{..}` lines, one per package, each ending in a newline.
    pub fn preamble(&self) -> String {
        self.packages
            .iter()
            .map(|p| format!("\\usepackage{{{p}}}\n"))
            .collect()
    }

    /// The body with its preamble in front, for full-LaTeX export.
    pub fn to_prefixed(&self) -> String {
        format!("{}{}", self.preamble(), self.body)
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

/// Drop leading `\usepackage{..}` directives, for previews that only
/// accept math-mode content.
pub fn strip_preamble(text: &str) -> &str {
    match RE_PREAMBLE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

impl fmt::Display for LatexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}
