use num_bigint::BigInt;
use num_rational::BigRational;

use crate::catalog::{BuiltinFn, GreekLetter};
use crate::symbol::{SymbolId, SymbolTable};

/// Handle to a node stored in a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    Infinity,
}

impl Constant {
    pub const ALL: [Constant; 3] = [Constant::Pi, Constant::E, Constant::Infinity];

    /// Name as typed in a formula.
    pub const fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
            Constant::Infinity => "oo",
        }
    }
}

/// A symbol leaf: either a declared free symbol or a reserved Greek letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Free(SymbolId),
    Greek(GreekLetter),
}

/// Side from which a limit is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LimitDirection {
    #[default]
    Both,
    Plus,
    Minus,
}

/// One integration variable, with bounds for a definite integral.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegrationLimit {
    pub var: ExprId,
    pub bounds: Option<(ExprId, ExprId)>,
}

/// Expression node. Children are stored in input order; nothing reorders them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Symbol(Symbol),
    Add(ExprId, ExprId),
    Sub(ExprId, ExprId),
    Mul(ExprId, ExprId),
    Div(ExprId, ExprId),
    Pow(ExprId, ExprId),
    Neg(ExprId),
    Function(BuiltinFn, Vec<ExprId>),
    Integral {
        body: ExprId,
        limits: Vec<IntegrationLimit>,
    },
    /// `wrt` pairs each differentiation variable with its order.
    Derivative {
        body: ExprId,
        wrt: Vec<(ExprId, u32)>,
    },
    Sum {
        body: ExprId,
        var: ExprId,
        lower: ExprId,
        upper: ExprId,
    },
    Limit {
        body: ExprId,
        var: ExprId,
        point: ExprId,
        direction: LimitDirection,
    },
}

impl Expr {
    /// Children in input order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) => Vec::new(),
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => vec![*l, *r],
            Expr::Neg(e) => vec![*e],
            Expr::Function(_, args) => args.clone(),
            Expr::Integral { body, limits } => {
                let mut out = vec![*body];
                for limit in limits {
                    out.push(limit.var);
                    if let Some((lo, hi)) = limit.bounds {
                        out.push(lo);
                        out.push(hi);
                    }
                }
                out
            }
            Expr::Derivative { body, wrt } => {
                std::iter::once(*body).chain(wrt.iter().map(|(v, _)| *v)).collect()
            }
            Expr::Sum {
                body,
                var,
                lower,
                upper,
            } => vec![*body, *var, *lower, *upper],
            Expr::Limit {
                body, var, point, ..
            } => vec![*body, *var, *point],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_))
    }
}

/// An equation `lhs = rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equation {
    pub lhs: ExprId,
    pub rhs: ExprId,
}

/// A parsed formula: a single expression or an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Expression(ExprId),
    Equation(Equation),
}

impl Statement {
    /// Root expressions, `lhs` before `rhs`.
    pub fn roots(&self) -> Vec<ExprId> {
        match self {
            Statement::Expression(id) => vec![*id],
            Statement::Equation(eq) => vec![eq.lhs, eq.rhs],
        }
    }
}

/// Arena owning the nodes of one parse plus its symbol table.
#[derive(Debug, Clone, Default)]
pub struct Context {
    nodes: Vec<Expr>,
    symbols: SymbolTable,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbols(symbols: SymbolTable) -> Self {
        Self {
            nodes: Vec::new(),
            symbols,
        }
    }

    pub fn add(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    /// # Panics
    /// Panics if id did not come from this context.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    pub fn num(&mut self, n: i64) -> ExprId {
        self.add(Expr::Number(BigRational::from_integer(BigInt::from(n))))
    }

    /// Declare (or reuse) a free symbol and add a leaf for it.
    pub fn free_symbol(&mut self, name: &str) -> ExprId {
        let id = self.symbols.declare(name);
        self.add(Expr::Symbol(Symbol::Free(id)))
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Name of a symbol leaf as typed in the formula.
    pub fn symbol_name(&self, symbol: &Symbol) -> &str {
        match symbol {
            Symbol::Free(id) => self.symbols.name(*id),
            Symbol::Greek(letter) => letter.name,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
