use formtex_parser::{latex_to_formula, normalize, parse_formula, resolve, validate, Dialect};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_pipeline_never_panics(text in "[a-z0-9_+*/^(),=. \\-\\[\\]]{0,40}") {
        let _ = parse_formula(&text, &Dialect::default());
    }

    #[test]
    fn test_validated_text_is_balanced(text in "[ax1+*()\\-]{0,24}") {
        if validate(&text, &Dialect::default()).is_ok() {
            let mut depth = 0i32;
            for c in text.chars() {
                match c {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                prop_assert!(depth >= 0);
            }
            prop_assert_eq!(depth, 0);
        }
    }

    #[test]
    fn test_resolution_is_deterministic(text in "[a-d_0-9+ ]{1,30}") {
        let normalized = normalize(&text, &Dialect::default());
        let first: Vec<String> = resolve(&normalized).names().map(str::to_string).collect();
        let second: Vec<String> = resolve(&normalized).names().map(str::to_string).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_latex_sync_never_panics(latex in "\\PC{0,60}") {
        let _ = latex_to_formula(&latex);
    }

    #[test]
    fn test_latex_sync_on_latex_alphabet(latex in "[\\\\{}_^a-z0-9() ]{0,60}") {
        let _ = latex_to_formula(&latex);
    }
}
