//! Structural validation of raw formula text.
//!
//! Runs before any rewriting or parsing and reports the first defect found,
//! with a span into the text exactly as the user typed it. Checks run in a
//! fixed order and short-circuit. Text that passes is guaranteed balanced,
//! non-empty and free of trailing operators, which the normalizer relies on.

use std::sync::LazyLock;

use formtex_ast::catalog::{self, Reserved};
use formtex_ast::Span;
use regex::Regex;
use smallvec::SmallVec;

use crate::dialect::{Dialect, EmptyBodyPolicy};
use crate::diagnostic::{Diagnostic, DiagnosticKind, Imbalance};

const TRAILING_OPERATORS: [char; 10] = ['+', '-', '*', '/', '^', '_', '×', '·', '÷', '−'];

/// Call openers accepted by the normalizer that are not catalog names.
const ALIAS_OPENERS: [&str; 1] = ["ln"];

static RE_CONSECUTIVE_COMMAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*,").expect("valid regex literal"));

static RE_EMPTY_ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:([A-Za-z][A-Za-z0-9_]*)\s*)?([(\[{])\s*,").expect("valid regex literal")
});

static RE_CONSTRUCT_EMPTY_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Integral|Derivative|Sum|Limit)\s*\(\s*,").expect("valid regex literal")
});

static RE_CONSTRUCT_NO_ARGUMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Integral|Derivative|Sum|Limit)\s*\(\s*,\s*\)").expect("valid regex literal")
});

static RE_SUBSCRIPTED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{L}[\p{L}\p{N}]*)_(\{[^{}]*\}|[\p{L}\p{N}]+)").expect("valid regex literal")
});

/// Check `text` for structural defects.
///
/// Order: empty, length, trailing operator, incomplete call, delimiters
/// (braces, parentheses, brackets, nesting), consecutive commas, empty
/// argument, calculus arguments, subscripts. The first failure is returned.
pub fn validate(text: &str, dialect: &Dialect) -> Result<(), Diagnostic> {
    check_empty(text)?;
    check_length(text, dialect.max_input_len)?;
    check_trailing_operator(text)?;
    check_incomplete_call(text)?;
    check_delimiters(text, dialect)?;
    check_consecutive_commas(text)?;
    check_empty_argument(text)?;
    check_calculus_arguments(text, dialect.empty_body)?;
    check_subscripts(text, dialect)?;
    Ok(())
}

/// Checks for text that is already LaTeX: non-empty, within the length
/// limit, and with balanced braces. Escaped `\{` and `\}` are literal.
pub fn validate_latex(text: &str, dialect: &Dialect) -> Result<(), Diagnostic> {
    check_empty(text)?;
    check_length(text, dialect.max_input_len)?;

    // Same byte length, so offsets still index `text`.
    let unescaped = text.replace("\\{", "  ").replace("\\}", "  ");
    if let Some((imbalance, pos)) = find_imbalance(&unescaped, '{', '}') {
        return Err(Diagnostic::new(
            DiagnosticKind::UnbalancedBraces { imbalance },
            "Unbalanced LaTeX braces.",
            Span::char_at(text, pos),
        ));
    }
    Ok(())
}

fn check_empty(text: &str) -> Result<(), Diagnostic> {
    if text.trim().is_empty() {
        return Err(Diagnostic::new(
            DiagnosticKind::EmptyFormula,
            "Formula is empty.",
            Span::whole(text),
        ));
    }
    Ok(())
}

fn check_length(text: &str, limit: usize) -> Result<(), Diagnostic> {
    if let Some((offset, _)) = text.char_indices().nth(limit) {
        return Err(Diagnostic::new(
            DiagnosticKind::InputTooLong { limit },
            format!("Formula is longer than {limit} characters."),
            Span::new(offset, text.len()),
        ));
    }
    Ok(())
}

fn check_trailing_operator(text: &str) -> Result<(), Diagnostic> {
    let trimmed = text.trim_end();
    if let Some(last) = trimmed.chars().next_back() {
        if TRAILING_OPERATORS.contains(&last) {
            let index = trimmed.len() - last.len_utf8();
            return Err(Diagnostic::new(
                DiagnosticKind::TrailingOperator,
                "Formula ends with an incomplete operator.",
                Span::char_at(text, index),
            ));
        }
    }
    Ok(())
}

fn is_call_opener(name: &str) -> bool {
    matches!(
        catalog::lookup(name),
        Some(Reserved::Function(_)) | Some(Reserved::Construct(_))
    ) || ALIAS_OPENERS.contains(&name)
}

fn check_incomplete_call(text: &str) -> Result<(), Diagnostic> {
    let trimmed = text.trim_end();
    let Some(before_paren) = trimmed.strip_suffix('(') else {
        return Ok(());
    };
    let head = before_paren.trim_end();
    let name_len: usize = head
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum();
    let start = head.len() - name_len;
    let name = &head[start..];

    if is_call_opener(name) {
        return Err(Diagnostic::new(
            DiagnosticKind::IncompleteFunctionCall {
                name: name.to_string(),
            },
            format!("Incomplete function call: '{name}(' is missing arguments."),
            Span::new(start, trimmed.len()),
        ));
    }
    Ok(())
}

/// First imbalance of one delimiter pair, with the offending byte offset.
fn find_imbalance(text: &str, open: char, close: char) -> Option<(Imbalance, usize)> {
    let mut stack: SmallVec<[usize; 16]> = SmallVec::new();
    for (i, c) in text.char_indices() {
        if c == open {
            stack.push(i);
        } else if c == close && stack.pop().is_none() {
            return Some((Imbalance::ExtraClosing, i));
        }
    }
    stack.first().map(|&pos| (Imbalance::Unclosed, pos))
}

fn check_delimiters(text: &str, dialect: &Dialect) -> Result<(), Diagnostic> {
    if !dialect.allow_braces {
        if let Some(pos) = text.find(['{', '}']) {
            return Err(Diagnostic::new(
                DiagnosticKind::BracesNotAllowed,
                "LaTeX braces {} are not allowed in formula mode. Use _sub (e.g., x_1).",
                Span::char_at(text, pos),
            ));
        }
    }

    if let Some((imbalance, pos)) = find_imbalance(text, '(', ')') {
        return Err(Diagnostic::new(
            DiagnosticKind::UnbalancedParentheses { imbalance },
            "Unbalanced parentheses in formula.",
            Span::char_at(text, pos),
        ));
    }
    if let Some((imbalance, pos)) = find_imbalance(text, '[', ']') {
        return Err(Diagnostic::new(
            DiagnosticKind::UnbalancedBrackets { imbalance },
            "Unbalanced brackets in formula.",
            Span::char_at(text, pos),
        ));
    }
    if dialect.allow_braces {
        if let Some((imbalance, pos)) = find_imbalance(text, '{', '}') {
            return Err(Diagnostic::new(
                DiagnosticKind::UnbalancedBraces { imbalance },
                "Unbalanced LaTeX braces.",
                Span::char_at(text, pos),
            ));
        }
    }

    check_nesting(text, dialect.max_nesting)
}

fn check_nesting(text: &str, limit: usize) -> Result<(), Diagnostic> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                if depth > limit {
                    return Err(Diagnostic::new(
                        DiagnosticKind::NestingTooDeep { limit },
                        format!("Formula is nested deeper than {limit} levels."),
                        Span::char_at(text, i),
                    ));
                }
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn check_consecutive_commas(text: &str) -> Result<(), Diagnostic> {
    if let Some(m) = RE_CONSECUTIVE_COMMAS.find(text) {
        return Err(Diagnostic::new(
            DiagnosticKind::ConsecutiveCommas,
            "Invalid function arguments: consecutive commas detected.",
            Span::new(m.start(), m.end()),
        ));
    }
    Ok(())
}

fn is_construct(name: &str) -> bool {
    matches!(catalog::lookup(name), Some(Reserved::Construct(_)))
}

fn check_empty_argument(text: &str) -> Result<(), Diagnostic> {
    for caps in RE_EMPTY_ARGUMENT.captures_iter(text) {
        let (Some(whole), Some(delim)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        // An empty body is the calculus constructs' business, not this check's.
        let opens_construct = delim.as_str() == "("
            && caps.get(1).is_some_and(|name| is_construct(name.as_str()));
        if opens_construct {
            continue;
        }
        return Err(Diagnostic::new(
            DiagnosticKind::EmptyArgument,
            "Invalid function arguments: empty argument detected.",
            Span::new(delim.start(), whole.end()),
        ));
    }
    Ok(())
}

fn missing_body_message(construct: &str) -> String {
    let verb = match construct {
        "Integral" => "integrate",
        "Derivative" => "differentiate",
        "Sum" => "sum",
        _ => "take the limit of",
    };
    format!("{construct} is missing the function to {verb}.")
}

fn check_calculus_arguments(text: &str, policy: EmptyBodyPolicy) -> Result<(), Diagnostic> {
    let (pattern, strict) = match policy {
        EmptyBodyPolicy::Reject => (&*RE_CONSTRUCT_EMPTY_BODY, true),
        EmptyBodyPolicy::DefaultToOne => (&*RE_CONSTRUCT_NO_ARGUMENTS, false),
    };
    let Some(caps) = pattern.captures(text) else {
        return Ok(());
    };
    let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
        return Ok(());
    };
    let construct = name.as_str();
    let message = if strict {
        missing_body_message(construct)
    } else {
        format!("{construct} is missing its variable argument.")
    };
    Err(Diagnostic::new(
        DiagnosticKind::MissingCalculusArgument {
            construct: construct.to_string(),
        },
        message,
        Span::new(whole.start(), whole.end()),
    ))
}

fn check_subscripts(text: &str, dialect: &Dialect) -> Result<(), Diagnostic> {
    for (i, _) in text.match_indices('_') {
        let base_run: Vec<char> = text[..i]
            .chars()
            .rev()
            .take_while(|c| c.is_alphanumeric())
            .collect();
        let follows_name = base_run.last().is_some_and(|c| c.is_alphabetic());
        let next = text[i + 1..].chars().next();
        let has_subscript = next.is_some_and(|c| {
            c.is_alphanumeric() || (dialect.allow_braces && c == '{')
        });
        if !follows_name || !has_subscript {
            return Err(Diagnostic::new(
                DiagnosticKind::InvalidSubscript,
                "Subscript must be alphanumeric and follow a name (e.g., x_1).",
                Span::char_at(text, i),
            ));
        }
    }

    let Some(bases) = &dialect.subscript_bases else {
        return Ok(());
    };
    for caps in RE_SUBSCRIPTED_NAME.captures_iter(text) {
        let (Some(whole), Some(base)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !bases.iter().any(|b| b == base.as_str()) {
            return Err(Diagnostic::new(
                DiagnosticKind::InvalidSubscript,
                format!("'{}' cannot take a subscript.", base.as_str()),
                Span::new(whole.start(), whole.end()),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Result<(), Diagnostic> {
        validate(text, &Dialect::default())
    }

    fn kind(text: &str) -> DiagnosticKind {
        check(text).expect_err("expected a diagnostic").kind
    }

    #[test]
    fn test_empty_formula() {
        let d = check("").unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::EmptyFormula);
        assert_eq!(d.span, Span::new(0, 0));

        let d = check("   ").unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::EmptyFormula);
        assert_eq!(d.span, Span::new(0, 3));
    }

    #[test]
    fn test_trailing_operator_span() {
        let d = check("x+").unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::TrailingOperator);
        assert_eq!(d.span, Span::new(1, 2));

        let d = check("a_1 ^  ").unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::TrailingOperator);
        assert_eq!(d.highlighted("a_1 ^  "), Some("^"));
    }

    #[test]
    fn test_trailing_subscript_mark() {
        assert_eq!(kind("x_"), DiagnosticKind::TrailingOperator);
    }

    #[test]
    fn test_incomplete_function_call() {
        let d = check("sqrt(").unwrap_err();
        assert_eq!(
            d.kind,
            DiagnosticKind::IncompleteFunctionCall {
                name: "sqrt".into()
            }
        );
        assert_eq!(d.span, Span::new(0, 5));

        let d = check("1 + Integral(").unwrap_err();
        assert_eq!(d.highlighted("1 + Integral("), Some("Integral("));

        assert!(matches!(kind("x*ln("), DiagnosticKind::IncompleteFunctionCall { .. }));
        assert!(matches!(kind("tanh("), DiagnosticKind::IncompleteFunctionCall { .. }));
    }

    #[test]
    fn test_unknown_call_prefix_is_unbalanced_instead() {
        assert_eq!(
            kind("f("),
            DiagnosticKind::UnbalancedParentheses {
                imbalance: Imbalance::Unclosed
            }
        );
    }

    #[test]
    fn test_unclosed_paren_reports_earliest() {
        let d = check("(x+1").unwrap_err();
        assert_eq!(
            d.kind,
            DiagnosticKind::UnbalancedParentheses {
                imbalance: Imbalance::Unclosed
            }
        );
        assert_eq!(d.span, Span::new(0, 1));

        let d = check("2*((x+1)").unwrap_err();
        assert_eq!(d.span.start, 2);
    }

    #[test]
    fn test_extra_closing_paren() {
        let d = check("x+1)*2").unwrap_err();
        assert_eq!(
            d.kind,
            DiagnosticKind::UnbalancedParentheses {
                imbalance: Imbalance::ExtraClosing
            }
        );
        assert_eq!(d.span, Span::new(3, 4));
    }

    #[test]
    fn test_brackets_checked_independently() {
        assert_eq!(
            kind("[x+1"),
            DiagnosticKind::UnbalancedBrackets {
                imbalance: Imbalance::Unclosed
            }
        );
    }

    #[test]
    fn test_braces_rejected_in_formula_mode() {
        let d = check("x_{1}").unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::BracesNotAllowed);
        assert_eq!(d.span, Span::new(2, 3));
    }

    #[test]
    fn test_braces_balanced_when_allowed() {
        let dialect = Dialect::with_braces();
        assert!(validate("x_{1} + y^{2}", &dialect).is_ok());
        let d = validate("x^{2", &dialect).unwrap_err();
        assert_eq!(
            d.kind,
            DiagnosticKind::UnbalancedBraces {
                imbalance: Imbalance::Unclosed
            }
        );
        assert_eq!(d.span, Span::new(2, 3));
    }

    #[test]
    fn test_nesting_limit() {
        let dialect = Dialect {
            max_nesting: 2,
            ..Dialect::default()
        };
        assert!(validate("((x))", &dialect).is_ok());
        let d = validate("(((x)))", &dialect).unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::NestingTooDeep { limit: 2 });
        assert_eq!(d.span, Span::new(2, 3));
    }

    #[test]
    fn test_input_too_long() {
        let dialect = Dialect {
            max_input_len: 5,
            ..Dialect::default()
        };
        assert!(validate("x+y+z", &dialect).is_ok());
        let d = validate("x+y+z+w", &dialect).unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::InputTooLong { limit: 5 });
        assert_eq!(d.span, Span::new(5, 7));
    }

    #[test]
    fn test_consecutive_commas() {
        let d = check("f(x,,y)").unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::ConsecutiveCommas);
        assert_eq!(d.span, Span::new(3, 5));
        assert_eq!(kind("log(x, , 2)"), DiagnosticKind::ConsecutiveCommas);
    }

    #[test]
    fn test_empty_argument() {
        let d = check("f(,y)").unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::EmptyArgument);
        assert_eq!(d.span, Span::new(1, 3));
        assert_eq!(kind("log( , 2)"), DiagnosticKind::EmptyArgument);
    }

    #[test]
    fn test_calculus_empty_body_is_allowed_by_default() {
        assert!(check("Integral(, x)").is_ok());
        assert!(check("Derivative(, x)").is_ok());
        assert!(check("Sum(, (n, 0, oo))").is_ok());
        assert!(check("Limit(, x, 0)").is_ok());
    }

    #[test]
    fn test_calculus_without_variable() {
        let d = check("Integral(,)").unwrap_err();
        assert_eq!(
            d.kind,
            DiagnosticKind::MissingCalculusArgument {
                construct: "Integral".into()
            }
        );
        assert!(d.message.contains("Integral"));
    }

    #[test]
    fn test_calculus_empty_body_rejected_when_strict() {
        let dialect = Dialect {
            empty_body: EmptyBodyPolicy::Reject,
            ..Dialect::default()
        };
        let d = validate("Derivative(, x)", &dialect).unwrap_err();
        assert_eq!(
            d.kind,
            DiagnosticKind::MissingCalculusArgument {
                construct: "Derivative".into()
            }
        );
        assert_eq!(d.message, "Derivative is missing the function to differentiate.");
        assert_eq!(d.span, Span::new(0, 12));
    }

    #[test]
    fn test_malformed_subscripts() {
        assert_eq!(kind("x_ + 1"), DiagnosticKind::InvalidSubscript);
        assert_eq!(kind("2_3"), DiagnosticKind::InvalidSubscript);
        assert_eq!(kind("(x)_1"), DiagnosticKind::InvalidSubscript);
        assert!(check("x_1 + alpha_max").is_ok());
        assert!(check("α_1").is_ok());
    }

    #[test]
    fn test_subscript_allow_list() {
        let dialect = Dialect {
            subscript_bases: Some(vec!["x".into(), "P".into()]),
            ..Dialect::default()
        };
        assert!(validate("x_1 + P_wf", &dialect).is_ok());
        let d = validate("x_1 + y_2", &dialect).unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::InvalidSubscript);
        assert_eq!(d.highlighted("x_1 + y_2"), Some("y_2"));
    }

    #[test]
    fn test_valid_formulas_pass() {
        for text in [
            "x^2 + sqrt(y)",
            "b + a",
            "a_1 + a_2",
            "(x+2)*(y+3)",
            "Integral(x**2, (x, 0, 1))",
            "Derivative(, x, evaluate=False)",
            "y = 2x + 1",
            "[a + b]*c",
        ] {
            assert!(check(text).is_ok(), "{text} should validate");
        }
    }

    #[test]
    fn test_latex_passthrough_checks() {
        let dialect = Dialect::default();
        assert!(validate_latex("\\frac{a}{b}", &dialect).is_ok());
        assert!(validate_latex("\\left\\{ x \\right\\}", &dialect).is_ok());
        assert_eq!(
            validate_latex("  ", &dialect).unwrap_err().kind,
            DiagnosticKind::EmptyFormula
        );

        let d = validate_latex("\\sqrt{x", &dialect).unwrap_err();
        assert_eq!(
            d.kind,
            DiagnosticKind::UnbalancedBraces {
                imbalance: Imbalance::Unclosed
            }
        );
        assert_eq!(d.highlighted("\\sqrt{x"), Some("{"));
    }

    #[test]
    fn test_check_order_first_failure_wins() {
        // Both trailing operator and unbalanced parens; trailing runs first.
        assert_eq!(kind("(x+"), DiagnosticKind::TrailingOperator);
        // Unbalanced parens run before comma checks.
        assert!(matches!(kind("f(x,,y"), DiagnosticKind::UnbalancedParentheses { .. }));
    }
}
