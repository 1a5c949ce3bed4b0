//! Formula text editing helpers.

use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Subscript cannot be empty.")]
    EmptySubscript,
    #[error("Subscript must be alphanumeric.")]
    InvalidSubscript(String),
    #[error("Formula is empty. Enter a parameter to subscript.")]
    EmptyFormula,
    #[error("Invalid parameter '{0}'.")]
    InvalidParameter(String),
    #[error("Selected parameter '{0}' not found in formula.")]
    ParameterNotFound(String),
}

/// Give the last whole-word occurrence of `param` the subscript `sub`.
///
/// `attach_subscript("x + x*y", "x", "0")` is `"x + x_0*y"`. Occurrences
/// inside longer names (`xy`, `x_1`) do not count.
pub fn attach_subscript(formula: &str, param: &str, sub: &str) -> Result<String, EditError> {
    let sub = sub.trim();
    if sub.is_empty() {
        return Err(EditError::EmptySubscript);
    }
    if !sub.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(EditError::InvalidSubscript(sub.to_string()));
    }
    if formula.trim().is_empty() {
        return Err(EditError::EmptyFormula);
    }

    let param = param.trim();
    if param.is_empty() {
        return Err(EditError::InvalidParameter(param.to_string()));
    }
    let word = Regex::new(&format!(r"\b{}\b", regex::escape(param)))
        .map_err(|_| EditError::InvalidParameter(param.to_string()))?;

    let Some(last) = word.find_iter(formula).last() else {
        return Err(EditError::ParameterNotFound(param.to_string()));
    };

    let edited = format!(
        "{}{}_{}{}",
        &formula[..last.start()],
        param,
        sub,
        &formula[last.end()..]
    );
    debug!(param, sub, "subscript attached");
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_occurrence_only() {
        assert_eq!(attach_subscript("x + x*y", "x", "0").unwrap(), "x + x_0*y");
    }

    #[test]
    fn test_whole_words_only() {
        assert_eq!(attach_subscript("x + xy", "x", "1").unwrap(), "x_1 + xy");
        assert_eq!(attach_subscript("v + v_0", "v", "f").unwrap(), "v_f + v_0");
    }

    #[test]
    fn test_rejects_bad_subscripts() {
        assert_eq!(attach_subscript("x", "x", "  "), Err(EditError::EmptySubscript));
        assert_eq!(
            attach_subscript("x", "x", "a+b"),
            Err(EditError::InvalidSubscript("a+b".into()))
        );
    }

    #[test]
    fn test_rejects_empty_formula_and_missing_param() {
        assert_eq!(attach_subscript(" ", "x", "1"), Err(EditError::EmptyFormula));
        assert_eq!(
            attach_subscript("y + z", "x", "1"),
            Err(EditError::ParameterNotFound("x".into()))
        );
        assert_eq!(
            attach_subscript("y", "", "1"),
            Err(EditError::InvalidParameter("".into()))
        );
    }
}
