//! Expression tree, reserved-name catalog and symbol table shared by the
//! formtex parser and formatter.

pub mod catalog;
pub mod expression;
pub mod span;
pub mod symbol;
pub mod traversal;

pub use catalog::{BuiltinFn, Construct, GreekLetter, Reserved};
pub use expression::{
    Constant, Context, Equation, Expr, ExprId, IntegrationLimit, LimitDirection, Statement, Symbol,
};
pub use span::Span;
pub use symbol::{Resolved, SymbolId, SymbolTable};
