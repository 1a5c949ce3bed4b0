//! Best-effort LaTeX → formula rewriting.
//!
//! A heuristic for turning rendered (or hand-typed) LaTeX back into editable
//! formula text. It is lossy and not an inverse of the renderer: unknown
//! commands pass through untouched and the result may not validate. The only
//! guarantees are that it is total and never panics.

use std::sync::LazyLock;

use formtex_ast::catalog;
use regex::{Captures, Regex};

static RE_LEFT_RIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:left|right|bigl|bigr|Bigl|Bigr)\s*([()\[\]|])").expect("valid regex literal")
});

static RE_OPERATORNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\operatorname\{([A-Za-z]+)\}").expect("valid regex literal"));

static RE_SUM_BOUNDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\sum(?:\\limits)?_\{([^{}]+)\}\^\{([^{}]+)\}").expect("valid regex literal")
});

static RE_FRAC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[dt]?frac\{([^{}]*)\}\{([^{}]*)\}").expect("valid regex literal"));

static RE_SQRT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\sqrt\{([^{}]*)\}").expect("valid regex literal"));

static RE_FUNCTION_BRACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(sinh|cosh|tanh|sin|cos|tan|cot|sec|csc|log|ln|exp)\s*\{([^{}]*)\}")
        .expect("valid regex literal")
});

static RE_FUNCTION_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(sinh|cosh|tanh|sin|cos|tan|cot|sec|csc|log|ln|exp)\b").expect("valid regex literal")
});

static RE_SUBSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9])_\{([^{}]+)\}").expect("valid regex literal"));

static RE_SUPERSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^\{([^{}]*)\}").expect("valid regex literal"));

static RE_PRODUCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(?:cdot|times)\b").expect("valid regex literal"));

static RE_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[,;:! ]|\\q?quad\b").expect("valid regex literal"));

static RE_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([A-Za-z]+)").expect("valid regex literal"));

static RE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex literal"));

/// Rewrite `re` until the text stops changing. Every rule used here shrinks
/// the text, so this terminates.
fn replace_to_fixpoint(text: String, re: &Regex, rep: &str) -> String {
    let mut current = text;
    while re.is_match(&current) {
        current = re.replace_all(&current, rep).into_owned();
    }
    current
}

fn superscript(caps: &Captures) -> String {
    let inner = caps[1].trim();
    if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_alphanumeric()) {
        format!("^{inner}")
    } else {
        format!("^({inner})")
    }
}

fn command_name(caps: &Captures) -> String {
    let name = &caps[1];
    match name {
        "infty" => "oo".to_string(),
        "pi" => "pi".to_string(),
        _ if catalog::greek_letter(name).is_some() => name.to_string(),
        _ => caps[0].to_string(),
    }
}

/// Best-effort formula text for `latex`.
///
/// `x_{1}` → `x_1`, `x^{2}` → `x^2`, `\frac{a}{b}` → `(a)/(b)`,
/// `\sqrt{a}` → `sqrt(a)`, `\sin{a}` → `sin(a)`, `\sum_{a}^{b}` → `sum(a,b)`,
/// `\cdot` → `*`, `\left(`/`\right)` → parentheses, Greek commands → names.
pub fn latex_to_formula(latex: &str) -> String {
    let mut text = RE_LEFT_RIGHT.replace_all(latex, "$1").into_owned();
    text = RE_OPERATORNAME.replace_all(&text, "$1").into_owned();
    text = RE_SUM_BOUNDS.replace_all(&text, "sum($1,$2)").into_owned();

    // Innermost first; repeat for nested groups. Each rewrite removes a
    // brace pair, so the loop ends.
    loop {
        let before = text.clone();
        text = replace_to_fixpoint(text, &RE_FRAC, "($1)/($2)");
        text = replace_to_fixpoint(text, &RE_SQRT, "sqrt($1)");
        text = replace_to_fixpoint(text, &RE_FUNCTION_BRACES, "$1($2)");
        text = replace_to_fixpoint(text, &RE_SUBSCRIPT, "${1}_$2");
        text = RE_SUPERSCRIPT.replace_all(&text, superscript).into_owned();
        if text == before {
            break;
        }
    }

    text = RE_FUNCTION_BARE.replace_all(&text, "$1").into_owned();
    text = RE_PRODUCT.replace_all(&text, "*").into_owned();
    text = RE_SPACING.replace_all(&text, " ").into_owned();
    text = RE_COMMAND.replace_all(&text, command_name).into_owned();
    text = text.replace("\\{", "(").replace("\\}", ")");
    RE_SPACES.replace_all(text.trim(), " ").into_owned()
}
