//! Subexpression highlighting.
//!
//! A [`HighlightConfig`] maps node ids of one parsed formula to colors. It is
//! filled by matching separately parsed subexpressions against the formula
//! structurally; the renderer only consults it.

use std::collections::BTreeSet;

use formtex_ast::traversal::find_structural_matches;
use formtex_ast::{Context, ExprId};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::color::Color;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    #[error("Subexpression '{0}' does not occur in the formula")]
    UnknownSubexpression(String),

    #[error("Invalid color '{color}' for subexpression '{key}'")]
    InvalidColor { key: String, color: String },
}

/// Colors to apply to specific nodes while rendering.
#[derive(Debug, Clone, Default)]
pub struct HighlightConfig {
    highlights: FxHashMap<ExprId, Color>,
}

impl HighlightConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color one node. A later call for the same node wins.
    pub fn add(&mut self, id: ExprId, color: Color) -> &mut Self {
        self.highlights.insert(id, color);
        self
    }

    /// Color every subtree under `roots` structurally equal to `pattern`.
    ///
    /// `key` is the subexpression text, used for the error when nothing
    /// matches. Returns the number of nodes colored.
    pub fn add_matches(
        &mut self,
        ctx: &Context,
        roots: &[ExprId],
        key: &str,
        pattern_ctx: &Context,
        pattern: ExprId,
        color: &Color,
    ) -> Result<usize, HighlightError> {
        let matches: Vec<ExprId> = roots
            .iter()
            .flat_map(|&root| find_structural_matches(ctx, root, pattern_ctx, pattern))
            .collect();

        if matches.is_empty() {
            return Err(HighlightError::UnknownSubexpression(key.to_string()));
        }

        for &id in &matches {
            self.add(id, color.clone());
        }
        Ok(matches.len())
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> Option<&Color> {
        self.highlights.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    /// Packages the configured colors depend on, sorted.
    pub fn packages(&self) -> BTreeSet<&'static str> {
        self.highlights.values().filter_map(Color::package).collect()
    }
}
