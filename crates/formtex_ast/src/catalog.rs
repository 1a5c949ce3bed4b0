//! Reserved-name catalog.
//!
//! One immutable table of every name the resolver recognizes without
//! auto-declaring it: builtin functions, constants, Greek letters and the
//! calculus constructs. The variant lists are `const` arrays; the lookup
//! map over them is built once on first use and shared read-only by every
//! parse, on any thread.
//!
//! # Adding a reserved name
//!
//! 1. Add the variant to the relevant enum
//! 2. Give it a case in `name()` (and `latex()` where it renders as a command)
//! 3. Append it to the enum's `ALL` array
//!
//! The lookup map picks it up automatically.

use rustc_hash::FxHashMap;
use std::sync::LazyLock;

use crate::expression::Constant;

/// Builtin functions the builder turns into `Expr::Function` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BuiltinFn {
    // Trigonometric
    Sin = 0,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,

    // Inverse trigonometric
    Asin,
    Acos,
    Atan,
    Acot,
    Asec,
    Acsc,

    // Hyperbolic
    Sinh,
    Cosh,
    Tanh,

    // Inverse hyperbolic
    Asinh,
    Acosh,
    Atanh,

    // Logarithmic / Exponential
    Log,
    Exp,

    // Other
    Sqrt,
    Abs,
}

impl BuiltinFn {
    pub const ALL: [BuiltinFn; 22] = [
        BuiltinFn::Sin,
        BuiltinFn::Cos,
        BuiltinFn::Tan,
        BuiltinFn::Cot,
        BuiltinFn::Sec,
        BuiltinFn::Csc,
        BuiltinFn::Asin,
        BuiltinFn::Acos,
        BuiltinFn::Atan,
        BuiltinFn::Acot,
        BuiltinFn::Asec,
        BuiltinFn::Acsc,
        BuiltinFn::Sinh,
        BuiltinFn::Cosh,
        BuiltinFn::Tanh,
        BuiltinFn::Asinh,
        BuiltinFn::Acosh,
        BuiltinFn::Atanh,
        BuiltinFn::Log,
        BuiltinFn::Exp,
        BuiltinFn::Sqrt,
        BuiltinFn::Abs,
    ];

    /// Name as typed in a formula.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            BuiltinFn::Sin => "sin",
            BuiltinFn::Cos => "cos",
            BuiltinFn::Tan => "tan",
            BuiltinFn::Cot => "cot",
            BuiltinFn::Sec => "sec",
            BuiltinFn::Csc => "csc",
            BuiltinFn::Asin => "asin",
            BuiltinFn::Acos => "acos",
            BuiltinFn::Atan => "atan",
            BuiltinFn::Acot => "acot",
            BuiltinFn::Asec => "asec",
            BuiltinFn::Acsc => "acsc",
            BuiltinFn::Sinh => "sinh",
            BuiltinFn::Cosh => "cosh",
            BuiltinFn::Tanh => "tanh",
            BuiltinFn::Asinh => "asinh",
            BuiltinFn::Acosh => "acosh",
            BuiltinFn::Atanh => "atanh",
            BuiltinFn::Log => "log",
            BuiltinFn::Exp => "exp",
            BuiltinFn::Sqrt => "sqrt",
            BuiltinFn::Abs => "abs",
        }
    }

    /// LaTeX operator for functions rendered as `\op{\left(arg\right)}`.
    ///
    /// `None` for builtins with their own layout (`sqrt`, `exp`, `abs`).
    pub const fn latex(self) -> Option<&'static str> {
        match self {
            BuiltinFn::Sin => Some("\\sin"),
            BuiltinFn::Cos => Some("\\cos"),
            BuiltinFn::Tan => Some("\\tan"),
            BuiltinFn::Cot => Some("\\cot"),
            BuiltinFn::Sec => Some("\\sec"),
            BuiltinFn::Csc => Some("\\csc"),
            BuiltinFn::Asin => Some("\\operatorname{asin}"),
            BuiltinFn::Acos => Some("\\operatorname{acos}"),
            BuiltinFn::Atan => Some("\\operatorname{atan}"),
            BuiltinFn::Acot => Some("\\operatorname{acot}"),
            BuiltinFn::Asec => Some("\\operatorname{asec}"),
            BuiltinFn::Acsc => Some("\\operatorname{acsc}"),
            BuiltinFn::Sinh => Some("\\sinh"),
            BuiltinFn::Cosh => Some("\\cosh"),
            BuiltinFn::Tanh => Some("\\tanh"),
            BuiltinFn::Asinh => Some("\\operatorname{asinh}"),
            BuiltinFn::Acosh => Some("\\operatorname{acosh}"),
            BuiltinFn::Atanh => Some("\\operatorname{atanh}"),
            BuiltinFn::Log => Some("\\log"),
            BuiltinFn::Exp | BuiltinFn::Sqrt | BuiltinFn::Abs => None,
        }
    }

    /// Accepted argument counts, inclusive. `log(x, b)` takes an optional base.
    pub const fn arity(self) -> (usize, usize) {
        match self {
            BuiltinFn::Log => (1, 2),
            _ => (1, 1),
        }
    }
}

/// Calculus constructs with structured arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    Integral,
    Derivative,
    Sum,
    Limit,
}

impl Construct {
    pub const ALL: [Construct; 4] = [
        Construct::Integral,
        Construct::Derivative,
        Construct::Sum,
        Construct::Limit,
    ];

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Construct::Integral => "Integral",
            Construct::Derivative => "Derivative",
            Construct::Sum => "Sum",
            Construct::Limit => "Limit",
        }
    }
}

/// A Greek letter name and the command it renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GreekLetter {
    pub name: &'static str,
    pub latex: &'static str,
}

const fn greek(name: &'static str, latex: &'static str) -> GreekLetter {
    GreekLetter { name, latex }
}

/// Curated Greek letters. `pi` is absent on purpose: it is the constant.
pub const GREEK_LETTERS: [GreekLetter; 31] = [
    greek("alpha", "\\alpha"),
    greek("beta", "\\beta"),
    greek("gamma", "\\gamma"),
    greek("Gamma", "\\Gamma"),
    greek("delta", "\\delta"),
    greek("Delta", "\\Delta"),
    greek("epsilon", "\\epsilon"),
    greek("zeta", "\\zeta"),
    greek("eta", "\\eta"),
    greek("theta", "\\theta"),
    greek("Theta", "\\Theta"),
    greek("iota", "\\iota"),
    greek("kappa", "\\kappa"),
    greek("lambda", "\\lambda"),
    greek("Lambda", "\\Lambda"),
    greek("mu", "\\mu"),
    greek("nu", "\\nu"),
    greek("xi", "\\xi"),
    greek("Xi", "\\Xi"),
    greek("rho", "\\rho"),
    greek("sigma", "\\sigma"),
    greek("Sigma", "\\Sigma"),
    greek("tau", "\\tau"),
    greek("upsilon", "\\upsilon"),
    greek("phi", "\\phi"),
    greek("Phi", "\\Phi"),
    greek("chi", "\\chi"),
    greek("psi", "\\psi"),
    greek("Psi", "\\Psi"),
    greek("omega", "\\omega"),
    greek("Omega", "\\Omega"),
];

/// Find a Greek letter by name.
pub fn greek_letter(name: &str) -> Option<GreekLetter> {
    match lookup(name) {
        Some(Reserved::GreekLetter(letter)) => Some(letter),
        _ => None,
    }
}

/// A catalog entry, tagged by what the name means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    Function(BuiltinFn),
    Constant(Constant),
    GreekLetter(GreekLetter),
    Construct(Construct),
}

static CATALOG: LazyLock<FxHashMap<&'static str, Reserved>> = LazyLock::new(|| {
    let mut map = FxHashMap::default();
    for f in BuiltinFn::ALL {
        map.insert(f.name(), Reserved::Function(f));
    }
    for c in Constant::ALL {
        map.insert(c.name(), Reserved::Constant(c));
    }
    for letter in GREEK_LETTERS {
        map.insert(letter.name, Reserved::GreekLetter(letter));
    }
    for c in Construct::ALL {
        map.insert(c.name(), Reserved::Construct(c));
    }
    map
});

/// Look a name up in the reserved catalog.
#[inline]
pub fn lookup(name: &str) -> Option<Reserved> {
    CATALOG.get(name).copied()
}

#[inline]
pub fn is_reserved(name: &str) -> bool {
    CATALOG.contains_key(name)
}

/// Names that open a call: builtin functions and calculus constructs.
pub fn callable_names() -> impl Iterator<Item = &'static str> {
    BuiltinFn::ALL
        .iter()
        .map(|f| f.name())
        .chain(Construct::ALL.iter().map(|c| c.name()))
}
