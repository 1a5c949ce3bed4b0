//! Per-parse symbol table.
//!
//! The dynamic tier of name resolution: every identifier the resolver finds
//! that is not in the reserved [`catalog`](crate::catalog) is interned here
//! once and referenced by [`SymbolId`]. A fresh table is built for every
//! formula, so `x` in one formula shares nothing with `x` in the next.

use rustc_hash::FxHashMap;

use crate::catalog::{self, Reserved};

/// Index of a free symbol in its [`SymbolTable`].
pub type SymbolId = usize;

/// What a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Reserved(Reserved),
    Free(SymbolId),
}

/// Free symbols declared while resolving one formula.
///
/// - `names`: canonical storage, indexed by SymbolId
/// - `lookup`: reverse map for O(1) intern check
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    lookup: FxHashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a free symbol, returning the existing id if already declared.
    ///
    /// Reserved names are never interned; callers check the catalog first.
    pub fn declare(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }

        let id = self.names.len();
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    /// Name of a declared symbol.
    ///
    /// # Panics
    /// Panics if id did not come from this table.
    #[inline]
    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id]
    }

    #[inline]
    pub fn get_id(&self, name: &str) -> Option<SymbolId> {
        self.lookup.get(name).copied()
    }

    /// Resolve a name: reserved catalog first, then declared free symbols.
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        catalog::lookup(name)
            .map(Resolved::Reserved)
            .or_else(|| self.get_id(name).map(Resolved::Free))
    }

    /// Declared names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A free symbol name split at its first `_` into base and subscript.
///
/// `x_1` → (`x`, Some(`1`)), `theta` → (`theta`, None).
pub fn split_subscript(name: &str) -> (&str, Option<&str>) {
    match name.split_once('_') {
        Some((base, sub)) if !base.is_empty() && !sub.is_empty() => (base, Some(sub)),
        _ => (name, None),
    }
}
