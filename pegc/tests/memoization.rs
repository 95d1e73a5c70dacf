use pegc::compiler::{compile, CompileOptions, Optimize};
use proptest::prelude::*;

static GRAMMAR: &str = r#"
expr = term "+" expr / term "-" expr / term
term = atom "*" term / atom
atom = $[0-9]+ / "(" inner:expr ")" { return inner; }
"#;

/// Some rules run both with failure recording disabled (lookaheads, display names) and enabled
static LOOKAHEAD_GRAMMAR: &str = r#"
start = item*
item = !digit word "!" / &digit number / &word "?" letter / letter / "(" start ")"
word "word" = $letter+
number = $digit+
letter = [a-z]
digit = [0-9]
"#;

proptest! {
    #[test]
    fn cache_does_not_change_results(input in "[0-9+*()-]{0,16}") {
        let plain = compile(GRAMMAR, &CompileOptions::new()).unwrap();
        let cached = compile(GRAMMAR, &CompileOptions::new().with_cache(true)).unwrap();

        prop_assert_eq!(plain.parse(&input), cached.parse(&input));
    }

    #[test]
    fn cache_does_not_change_errors_after_lookaheads(input in "[a-c0-2!?()]{0,12}") {
        let plain = compile(LOOKAHEAD_GRAMMAR, &CompileOptions::new()).unwrap();
        let cached = compile(LOOKAHEAD_GRAMMAR, &CompileOptions::new().with_cache(true)).unwrap();

        prop_assert_eq!(plain.parse(&input), cached.parse(&input));
    }

    #[test]
    fn optimization_does_not_change_results(input in "[0-9a-fA-F_ ]{0,12}") {
        let grammar = "start = (word / ' ')*\nword = $[a-f_0-9]i+ / 'AbC'i";

        let speed = compile(grammar, &CompileOptions::new().with_optimize(Optimize::Speed)).unwrap();
        let size = compile(grammar, &CompileOptions::new().with_optimize(Optimize::Size)).unwrap();

        prop_assert_eq!(speed.parse(&input), size.parse(&input));
    }
}
