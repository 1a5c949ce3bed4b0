//! Syntax normalizer: rewrites validated formula text into the grammar the
//! builder accepts.
//!
//! Total and pure. Rules run in a fixed order because they interact:
//!
//! 1. Equation split on exactly one top-level `=`
//! 2. Unicode palette symbols to ASCII names/operators
//! 3. Brace subscripts `x_{12}` to `x_12`, remaining braces to parentheses
//! 4. `^` to `**`
//! 5. `[ ]` to `( )`
//! 6. `ln(` to `log(`
//! 7. `evaluate=True|False` keyword arguments dropped
//! 8. Empty calculus bodies default to `1`
//!
//! Rules 2-8 run on each equation side independently.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::Dialect;

static RE_BRACE_SUBSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\{\s*([\p{L}\p{N}]+)\s*\}").expect("valid regex literal"));

static RE_LN_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bln\s*\(").expect("valid regex literal"));

static RE_EVALUATE_KWARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*,\s*evaluate\s*=\s*(?:True|False)\b").expect("valid regex literal")
});

static RE_EMPTY_CONSTRUCT_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Integral|Derivative|Sum|Limit)\s*\(\s*,").expect("valid regex literal")
});

/// Normalized formula text, split into sides when it is an equation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedText {
    Expression(String),
    Equation { lhs: String, rhs: String },
}

impl NormalizedText {
    /// Text of each side, `lhs` first.
    pub fn sides(&self) -> Vec<&str> {
        match self {
            NormalizedText::Expression(text) => vec![text.as_str()],
            NormalizedText::Equation { lhs, rhs } => vec![lhs.as_str(), rhs.as_str()],
        }
    }

    pub fn is_equation(&self) -> bool {
        matches!(self, NormalizedText::Equation { .. })
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedText::Expression(text) => write!(f, "{text}"),
            NormalizedText::Equation { lhs, rhs } => write!(f, "{lhs} = {rhs}"),
        }
    }
}

/// Normalize `text` for the builder. Never fails.
pub fn normalize(text: &str, dialect: &Dialect) -> NormalizedText {
    match split_equation(text) {
        Some((lhs, rhs)) => NormalizedText::Equation {
            lhs: normalize_side(lhs, dialect),
            rhs: normalize_side(rhs, dialect),
        },
        None => NormalizedText::Expression(normalize_side(text, dialect)),
    }
}

/// Byte offsets of `=` signs at delimiter depth 0 that are not part of
/// `==`, `<=`, `>=` or `!=`.
fn top_level_equals(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut found = Vec::new();

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 => {
                let prev = i.checked_sub(1).map(|p| bytes[p]);
                let next = bytes.get(i + 1).copied();
                let compound = matches!(prev, Some(b'=' | b'<' | b'>' | b'!'))
                    || matches!(next, Some(b'='));
                if !compound {
                    found.push(i);
                }
            }
            _ => {}
        }
    }

    found
}

fn split_equation(text: &str) -> Option<(&str, &str)> {
    match top_level_equals(text).as_slice() {
        [at] => Some((&text[..*at], &text[at + 1..])),
        _ => None,
    }
}

fn normalize_side(text: &str, dialect: &Dialect) -> String {
    let mut out = map_palette(text);

    if dialect.allow_braces {
        out = RE_BRACE_SUBSCRIPT.replace_all(&out, "_$1").into_owned();
        out = out.replace('{', "(").replace('}', ")");
    }

    out = out.replace('^', "**");

    if dialect.brackets_as_parens {
        out = out.replace('[', "(").replace(']', ")");
    }

    out = RE_LN_CALL.replace_all(&out, "log(").into_owned();
    out = RE_EVALUATE_KWARG.replace_all(&out, "").into_owned();
    out = RE_EMPTY_CONSTRUCT_BODY
        .replace_all(&out, "${1}(1,")
        .into_owned();

    out.trim().to_string()
}

enum PaletteSymbol {
    Operator(&'static str),
    Name(&'static str),
}

fn palette_symbol(c: char) -> Option<PaletteSymbol> {
    use PaletteSymbol::{Name, Operator};
    let symbol = match c {
        '×' | '·' | '⋅' => Operator("*"),
        '÷' => Operator("/"),
        '−' => Operator("-"),
        '√' => Name("sqrt"),
        'π' => Name("pi"),
        '∞' => Name("oo"),
        'α' => Name("alpha"),
        'β' => Name("beta"),
        'γ' => Name("gamma"),
        'Γ' => Name("Gamma"),
        'δ' => Name("delta"),
        'Δ' => Name("Delta"),
        'ε' => Name("epsilon"),
        'ζ' => Name("zeta"),
        'η' => Name("eta"),
        'θ' => Name("theta"),
        'Θ' => Name("Theta"),
        'ι' => Name("iota"),
        'κ' => Name("kappa"),
        'λ' => Name("lambda"),
        'Λ' => Name("Lambda"),
        'μ' => Name("mu"),
        'ν' => Name("nu"),
        'ξ' => Name("xi"),
        'Ξ' => Name("Xi"),
        'ρ' => Name("rho"),
        'σ' => Name("sigma"),
        'Σ' => Name("Sigma"),
        'τ' => Name("tau"),
        'υ' => Name("upsilon"),
        'φ' => Name("phi"),
        'Φ' => Name("Phi"),
        'χ' => Name("chi"),
        'ψ' => Name("psi"),
        'Ψ' => Name("Psi"),
        'ω' => Name("omega"),
        'Ω' => Name("Omega"),
        _ => return None,
    };
    Some(symbol)
}

/// Replace palette symbols. Names get a separating space where they would
/// otherwise fuse with a neighbouring identifier (`πr` → `pi r`).
fn map_palette(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match palette_symbol(c) {
            Some(PaletteSymbol::Operator(op)) => out.push_str(op),
            Some(PaletteSymbol::Name(name)) => {
                if out.chars().next_back().is_some_and(char::is_alphanumeric) {
                    out.push(' ');
                }
                out.push_str(name);
                if chars.peek().is_some_and(|n| n.is_alphanumeric()) {
                    out.push(' ');
                }
            }
            None => out.push(c),
        }
    }

    out
}
