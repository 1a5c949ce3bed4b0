//! Input dialect switches shared by the validator and the normalizer.

use serde::{Deserialize, Serialize};

/// What to do with a calculus construct whose body argument is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBodyPolicy {
    /// `Integral(, x)` integrates the constant 1.
    #[default]
    DefaultToOne,
    /// `Integral(, x)` is a `MissingCalculusArgument` diagnostic.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    /// Accept `{ }` (LaTeX-style grouping and `x_{12}` subscripts).
    pub allow_braces: bool,
    /// Treat `[ ]` as parentheses.
    pub brackets_as_parens: bool,
    pub empty_body: EmptyBodyPolicy,
    /// When set, only these names may carry a subscript.
    pub subscript_bases: Option<Vec<String>>,
    /// Maximum input length in characters.
    pub max_input_len: usize,
    /// Maximum delimiter nesting depth accepted by the validator.
    pub max_nesting: usize,
    /// Maximum expression-tree depth accepted by the builder.
    pub max_tree_depth: usize,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            allow_braces: false,
            brackets_as_parens: true,
            empty_body: EmptyBodyPolicy::DefaultToOne,
            subscript_bases: None,
            max_input_len: 1000,
            max_nesting: 32,
            max_tree_depth: 256,
        }
    }
}

impl Dialect {
    /// Dialect for LaTeX-flavoured input: braces allowed.
    pub fn with_braces() -> Self {
        Self {
            allow_braces: true,
            ..Self::default()
        }
    }
}
