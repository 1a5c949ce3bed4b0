//! Text passes applied to rendered LaTeX.
//!
//! Run in order by [`postprocess`]:
//!
//! 1. `\frac{d}{d x} y` → `\frac{dy}{dx}` when the body is a bare symbol
//! 2. `\frac{d}{d x} \left(E\right)` → `\frac{d(E)}{dx}`
//! 3. Dotted placeholders `gammadot` / `xddot` → `\dot{\gamma}` / `\ddot{x}`

use std::sync::LazyLock;

use formtex_ast::catalog;
use regex::{Captures, Regex};

static RE_DERIVATIVE_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\frac\{d\}\{d ([A-Za-z]|\\[A-Za-z]+)\}\s*([A-Za-z](?:_\{[A-Za-z0-9]+\})?|\\[A-Za-z]+)",
    )
    .expect("valid regex literal")
});

static RE_DERIVATIVE_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\frac\{d\}\{d ([A-Za-z]|\\[A-Za-z]+)\}\s*\\left\(").expect("valid regex literal")
});

static RE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\?[A-Za-z]+").expect("valid regex literal"));

const LEFT: &str = "\\left(";
const RIGHT: &str = "\\right)";

/// Apply every pass, in order.
pub fn postprocess(latex: &str) -> String {
    let text = fold_symbol_bodies(latex);
    let text = fold_group_bodies(&text);
    spell_dotted(&text)
}

/// Greek commands and `\pi` can stand as a derivative body.
fn is_symbol_command(cmd: &str) -> bool {
    let name = cmd.trim_start_matches('\\');
    name == "pi" || catalog::greek_letter(name).is_some()
}

fn fold_symbol_bodies(latex: &str) -> String {
    let mut out = String::with_capacity(latex.len());
    let mut last = 0;

    for caps in RE_DERIVATIVE_SYMBOL.captures_iter(latex) {
        let Some(m) = caps.get(0) else { continue };
        let (var, body) = (&caps[1], &caps[2]);

        let continues = latex[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '^' | '_' | '{' | '('));
        if continues || (body.starts_with('\\') && !is_symbol_command(body)) {
            continue;
        }

        out.push_str(&latex[last..m.start()]);
        out.push_str(&format!("\\frac{{d{body}}}{{d{var}}}"));
        last = m.end();
    }

    out.push_str(&latex[last..]);
    out
}

/// Byte length of the text before the `\right)` closing an already opened
/// `\left(`.
fn group_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = 0;

    while i < text.len() {
        let tail = &text[i..];
        if tail.starts_with(LEFT) {
            depth += 1;
            i += LEFT.len();
        } else if tail.starts_with(RIGHT) {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
            i += RIGHT.len();
        } else {
            i += tail.chars().next().map_or(1, char::len_utf8);
        }
    }

    None
}

fn fold_group_bodies(latex: &str) -> String {
    let mut out = String::with_capacity(latex.len());
    let mut rest = latex;

    while let Some(caps) = RE_DERIVATIVE_GROUP.captures(rest) {
        let Some(m) = caps.get(0) else { break };
        let body_start = m.end();

        match group_len(&rest[body_start..]) {
            Some(len) => {
                let body = &rest[body_start..body_start + len];
                out.push_str(&rest[..m.start()]);
                out.push_str(&format!("\\frac{{d({body})}}{{d{}}}", &caps[1]));
                rest = &rest[body_start + len + RIGHT.len()..];
            }
            None => {
                out.push_str(&rest[..m.end()]);
                rest = &rest[m.end()..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn dotted(caps: &Captures) -> String {
    let word = &caps[0];
    if word.starts_with('\\') {
        return word.to_string();
    }

    let (base, accent) = match word.strip_suffix("ddot") {
        Some(base) if !base.is_empty() => (base, "ddot"),
        _ => match word.strip_suffix("dot") {
            Some(base) if !base.is_empty() && word != "ddot" => (base, "dot"),
            _ => return word.to_string(),
        },
    };

    let base = match catalog::greek_letter(base) {
        Some(letter) => letter.latex.to_string(),
        None => base.to_string(),
    };
    format!("\\{accent}{{{base}}}")
}

fn spell_dotted(latex: &str) -> String {
    RE_WORD.replace_all(latex, dotted).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_symbol_derivative() {
        assert_eq!(postprocess("\\frac{d}{d x} y"), "\\frac{dy}{dx}");
        assert_eq!(postprocess("\\frac{d}{d t} x_{1} + 1"), "\\frac{dx_{1}}{dt} + 1");
        assert_eq!(
            postprocess("\\frac{d}{d \\theta} \\phi"),
            "\\frac{d\\phi}{d\\theta}"
        );
    }

    #[test]
    fn test_non_symbol_bodies_left_alone() {
        assert_eq!(postprocess("\\frac{d}{d x} y^{2}"), "\\frac{d}{d x} y^{2}");
        assert_eq!(
            postprocess("\\frac{d}{d x} \\sin{\\left(x \\right)}"),
            "\\frac{d}{d x} \\sin{\\left(x \\right)}"
        );
        assert_eq!(
            postprocess("\\frac{d}{d x} \\int x\\, dx"),
            "\\frac{d}{d x} \\int x\\, dx"
        );
        assert_eq!(postprocess("\\frac{d}{d x} speed"), "\\frac{d}{d x} speed");
    }

    #[test]
    fn test_group_body_derivative() {
        assert_eq!(
            postprocess("\\frac{d}{d x} \\left(x^{2} + 1\\right)"),
            "\\frac{d(x^{2} + 1)}{dx}"
        );
        assert_eq!(
            postprocess("\\frac{d}{d x} \\left(\\sin{\\left(x \\right)} + x\\right) + 2"),
            "\\frac{d(\\sin{\\left(x \\right)} + x)}{dx} + 2"
        );
    }

    #[test]
    fn test_unclosed_group_kept() {
        assert_eq!(
            postprocess("\\frac{d}{d x} \\left(x"),
            "\\frac{d}{d x} \\left(x"
        );
    }

    #[test]
    fn test_dotted_placeholders() {
        assert_eq!(postprocess("gammadot"), "\\dot{\\gamma}");
        assert_eq!(postprocess("xddot + ydot"), "\\ddot{x} + \\dot{y}");
        assert_eq!(postprocess("thetadot_{1}"), "\\dot{\\theta}_{1}");
    }

    #[test]
    fn test_dotted_ignores_commands_and_plain_words() {
        assert_eq!(postprocess("\\cdot x"), "\\cdot x");
        assert_eq!(postprocess("dot + ddot"), "dot + ddot");
        assert_eq!(postprocess("\\left(x\\right)"), "\\left(x\\right)");
    }

    #[test]
    fn test_derivative_of_dotted_symbol() {
        assert_eq!(postprocess("\\frac{d}{d t} xdot"), "\\frac{d}{d t} \\dot{x}");
    }
}
