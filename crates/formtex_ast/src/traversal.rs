//! Tree traversal utilities.
//!
//! Stack-safe, iterative walks over expression trees: metrics, free-symbol
//! discovery, and structural equality across two contexts (used to locate a
//! separately parsed subexpression inside a formula).

use std::collections::BTreeSet;

use crate::expression::{Context, Expr, ExprId, Symbol};

/// Count nodes and compute maximum depth (root has depth 0).
pub fn count_nodes_and_max_depth(ctx: &Context, root: ExprId) -> (usize, usize) {
    let mut count = 0;
    let mut max_depth = 0;
    let mut stack: Vec<(ExprId, usize)> = vec![(root, 0)];

    while let Some((id, depth)) = stack.pop() {
        count += 1;
        max_depth = max_depth.max(depth);
        for child in ctx.get(id).children() {
            stack.push((child, depth + 1));
        }
    }

    (count, max_depth)
}

/// Names of all free symbols and Greek-letter leaves under `root`, sorted.
pub fn collect_symbol_names(ctx: &Context, root: ExprId) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        let node = ctx.get(id);
        if let Expr::Symbol(sym) = node {
            names.insert(ctx.symbol_name(sym).to_string());
        }
        stack.extend(node.children());
    }

    names
}

/// Same variant and same non-child payload.
fn same_shape(a_ctx: &Context, a: &Expr, b_ctx: &Context, b: &Expr) -> bool {
    match (a, b) {
        (Expr::Number(x), Expr::Number(y)) => x == y,
        (Expr::Constant(x), Expr::Constant(y)) => x == y,
        (Expr::Symbol(x), Expr::Symbol(y)) => symbol_eq(a_ctx, x, b_ctx, y),
        (Expr::Add(..), Expr::Add(..))
        | (Expr::Sub(..), Expr::Sub(..))
        | (Expr::Mul(..), Expr::Mul(..))
        | (Expr::Div(..), Expr::Div(..))
        | (Expr::Pow(..), Expr::Pow(..))
        | (Expr::Neg(_), Expr::Neg(_)) => true,
        (Expr::Function(f, xs), Expr::Function(g, ys)) => f == g && xs.len() == ys.len(),
        (Expr::Integral { limits: xs, .. }, Expr::Integral { limits: ys, .. }) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|(x, y)| x.bounds.is_some() == y.bounds.is_some())
        }
        (Expr::Derivative { wrt: xs, .. }, Expr::Derivative { wrt: ys, .. }) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|((_, m), (_, n))| m == n)
        }
        (Expr::Sum { .. }, Expr::Sum { .. }) => true,
        (Expr::Limit { direction: d1, .. }, Expr::Limit { direction: d2, .. }) => d1 == d2,
        _ => false,
    }
}

fn symbol_eq(a_ctx: &Context, a: &Symbol, b_ctx: &Context, b: &Symbol) -> bool {
    match (a, b) {
        (Symbol::Greek(x), Symbol::Greek(y)) => x == y,
        (Symbol::Free(_), Symbol::Free(_)) => a_ctx.symbol_name(a) == b_ctx.symbol_name(b),
        _ => false,
    }
}

/// Structural equality of two subtrees that may live in different contexts.
///
/// Node kinds and every descendant must match; free symbols compare by name,
/// since each context has its own symbol table.
pub fn structurally_equal(a_ctx: &Context, a: ExprId, b_ctx: &Context, b: ExprId) -> bool {
    let mut stack = vec![(a, b)];

    while let Some((x, y)) = stack.pop() {
        let (ex, ey) = (a_ctx.get(x), b_ctx.get(y));
        if !same_shape(a_ctx, ex, b_ctx, ey) {
            return false;
        }
        let (cx, cy) = (ex.children(), ey.children());
        if cx.len() != cy.len() {
            return false;
        }
        stack.extend(cx.into_iter().zip(cy));
    }

    true
}

/// All subtrees under `root` structurally equal to `pattern`, in pre-order.
pub fn find_structural_matches(
    ctx: &Context,
    root: ExprId,
    pattern_ctx: &Context,
    pattern: ExprId,
) -> Vec<ExprId> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if structurally_equal(ctx, id, pattern_ctx, pattern) {
            found.push(id);
            continue;
        }
        let mut children = ctx.get(id).children();
        children.reverse();
        stack.extend(children);
    }

    found
}
