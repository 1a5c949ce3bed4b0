//! Symbol resolver: declares every non-reserved identifier of a normalized
//! formula as a free symbol.

use std::sync::LazyLock;

use formtex_ast::catalog;
use formtex_ast::SymbolTable;
use regex::Regex;

use crate::normalize::NormalizedText;

/// A letter, then letters or digits, then an optional `_` subscript.
static RE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z0-9]*(?:_[A-Za-z0-9]+)?").expect("valid regex literal")
});

/// Build a fresh symbol table for `text`.
///
/// Names are keyed by the full matched text, so `x` and `x_1` are distinct.
/// Declaration order follows first appearance, `lhs` before `rhs`.
pub fn resolve(text: &NormalizedText) -> SymbolTable {
    let mut table = SymbolTable::new();
    for side in text.sides() {
        for m in RE_IDENTIFIER.find_iter(side) {
            let name = m.as_str();
            if !catalog::is_reserved(name) && name != "ln" {
                table.declare(name);
            }
        }
    }
    table
}

/// Identifiers of `text` in order of appearance, duplicates included.
pub fn identifiers(text: &str) -> impl Iterator<Item = &str> {
    RE_IDENTIFIER.find_iter(text).map(|m| m.as_str())
}
